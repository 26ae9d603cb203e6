//! # Content Paths
//!
//! String addresses into a content tree.
//!
//! ## Grammar
//!
//! ```text
//! path    = segment ("." segment)*
//! segment = key ("[" index "]")?
//! key     = one or more chars other than '.', '[' and ']'
//! index   = non-negative decimal integer
//! ```
//!
//! Examples: `site.name`, `blog[0].title`, `programs[2].schedule[1].time`.
//!
//! ## Resolution
//!
//! Every step but the last must land on an existing object or array. Missing
//! intermediates are never fabricated: the write fails and nothing changes.
//! The final step names the slot being written:
//!
//! - object key: inserted or replaced
//! - array index `< len`: replaced
//! - array index `== len`: appended
//! - array index `> len`: [`PathError::IndexOutOfBounds`]

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One dot-separated piece of a path, optionally indexed (`blog[3]`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub key: String,
    pub index: Option<usize>,
}

/// A parsed, validated content path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
    segments: Vec<Segment>,
}

/// A single navigation step: object key or array index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'a> {
    Key(&'a str),
    Index(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Malformed path {path:?}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Path {path:?} does not resolve: {at} is missing")]
    Unresolved { path: String, at: String },

    #[error("Path {path:?} does not resolve: {at} is not an object or array")]
    NotAContainer { path: String, at: String },

    #[error("Path {path:?}: index {index} is out of bounds at {at} (length {len})")]
    IndexOutOfBounds {
        path: String,
        at: String,
        index: usize,
        len: usize,
    },
}

impl PathError {
    /// The path text could not be parsed at all
    pub fn is_malformed(&self) -> bool {
        matches!(self, PathError::Malformed { .. })
    }

    /// The path parsed but does not fit the shape of the tree
    pub fn is_resolution(&self) -> bool {
        !self.is_malformed()
    }
}

impl Path {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let malformed = |reason: String| PathError::Malformed {
            path: raw.to_string(),
            reason,
        };

        if raw.is_empty() {
            return Err(malformed("path is empty".to_string()));
        }

        let segments = raw
            .split('.')
            .map(parse_segment)
            .collect::<Result<Vec<_>, _>>()
            .map_err(malformed)?;

        Ok(Self { segments })
    }

    /// Build a path from already-validated segments
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self, PathError> {
        let path = Self { segments };
        // Re-parse the rendering so keys smuggling '.', '[' or ']' are rejected
        let rendered = path.to_string();
        if Self::parse(&rendered)? != path {
            return Err(PathError::Malformed {
                path: rendered,
                reason: "segment key contains path syntax".to_string(),
            });
        }
        Ok(path)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Flatten segments into key/index steps
    pub fn steps(&self) -> impl Iterator<Item = Step<'_>> + '_ {
        self.segments.iter().flat_map(|segment| {
            std::iter::once(Step::Key(segment.key.as_str()))
                .chain(segment.index.map(Step::Index))
        })
    }

    /// Number of navigation steps, an indexed segment counts twice
    pub(crate) fn depth(&self) -> usize {
        self.steps().count()
    }

    /// Render the first `count` steps, used to locate resolution failures
    pub(crate) fn describe(&self, count: usize) -> String {
        if count == 0 {
            return "<root>".to_string();
        }

        let mut out = String::new();
        for step in self.steps().take(count) {
            match step {
                Step::Key(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(key);
                }
                Step::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

fn parse_segment(part: &str) -> Result<Segment, String> {
    if part.is_empty() {
        return Err("empty segment (leading, trailing or doubled '.')".to_string());
    }

    let (key, index) = match part.find('[') {
        None => (part, None),
        Some(open) => {
            let rest = &part[open + 1..];
            let close = rest
                .find(']')
                .ok_or_else(|| format!("unclosed '[' in segment {part:?}"))?;
            if close + 1 != rest.len() {
                return Err(format!(
                    "segment {part:?} may carry only one trailing index"
                ));
            }
            (&part[..open], Some(parse_index(&rest[..close])?))
        }
    };

    if key.is_empty() {
        return Err(format!("segment {part:?} has no key before its index"));
    }
    if key.contains(']') {
        return Err(format!("stray ']' in segment {part:?}"));
    }

    Ok(Segment {
        key: key.to_string(),
        index,
    })
}

fn parse_index(digits: &str) -> Result<usize, String> {
    if digits.is_empty() {
        return Err("empty array index".to_string());
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("index {digits:?} is not a non-negative integer"));
    }
    digits
        .parse::<usize>()
        .map_err(|_| format!("index {digits:?} is too large"))
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.key)?;
            if let Some(index) = segment.index {
                write!(f, "[{index}]")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Path {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Path {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

/// Read the value at `path`, `None` when any step is missing
pub fn get<'a>(tree: &'a Value, path: &Path) -> Option<&'a Value> {
    path.steps().try_fold(tree, |node, step| match (step, node) {
        (Step::Key(key), Value::Object(map)) => map.get(key),
        (Step::Index(index), Value::Array(items)) => items.get(index),
        _ => None,
    })
}

/// Return a copy of `tree` with `value` written at `path`
///
/// The input is never touched; the result shares nothing with it.
pub fn set(tree: &Value, path: &Path, value: Value) -> Result<Value, PathError> {
    let mut copy = tree.clone();
    set_in_place(&mut copy, path, value)?;
    Ok(copy)
}

/// Write `value` at `path` inside `tree`
///
/// Resolution happens before the write, so on error `tree` is unchanged.
pub fn set_in_place(tree: &mut Value, path: &Path, value: Value) -> Result<(), PathError> {
    let steps: Vec<Step<'_>> = path.steps().collect();
    let Some((last, parents)) = steps.split_last() else {
        return Err(PathError::Malformed {
            path: String::new(),
            reason: "path is empty".to_string(),
        });
    };

    let parent = walk_mut(tree, path, parents)?;
    let at = parents.len();

    match (*last, parent) {
        (Step::Key(key), Value::Object(map)) => {
            map.insert(key.to_string(), value);
            Ok(())
        }
        (Step::Index(index), Value::Array(items)) => {
            let len = items.len();
            if index < len {
                items[index] = value;
                Ok(())
            } else if index == len {
                items.push(value);
                Ok(())
            } else {
                Err(PathError::IndexOutOfBounds {
                    path: path.to_string(),
                    at: path.describe(at),
                    index,
                    len,
                })
            }
        }
        _ => Err(PathError::NotAContainer {
            path: path.to_string(),
            at: path.describe(at),
        }),
    }
}

/// Resolve every step of `path` to a mutable node
pub fn resolve_mut<'a>(tree: &'a mut Value, path: &Path) -> Result<&'a mut Value, PathError> {
    let steps: Vec<Step<'_>> = path.steps().collect();
    walk_mut(tree, path, &steps)
}

fn walk_mut<'a>(
    tree: &'a mut Value,
    path: &Path,
    steps: &[Step<'_>],
) -> Result<&'a mut Value, PathError> {
    let mut node = tree;

    for (n, step) in steps.iter().enumerate() {
        node = match (*step, node) {
            (Step::Key(key), Value::Object(map)) => {
                map.get_mut(key).ok_or_else(|| PathError::Unresolved {
                    path: path.to_string(),
                    at: path.describe(n + 1),
                })?
            }
            (Step::Index(index), Value::Array(items)) => {
                let len = items.len();
                items
                    .get_mut(index)
                    .ok_or_else(|| PathError::IndexOutOfBounds {
                        path: path.to_string(),
                        at: path.describe(n),
                        index,
                        len,
                    })?
            }
            _ => {
                return Err(PathError::NotAContainer {
                    path: path.to_string(),
                    at: path.describe(n),
                })
            }
        };
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(raw: &str) -> Path {
        Path::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        for raw in ["site.name", "blog[0].title", "programs[2].schedule[1].time", "hero"] {
            assert_eq!(p(raw).to_string(), raw);
        }

        let path = p("blog[3].title");
        assert_eq!(
            path.segments(),
            &[
                Segment { key: "blog".into(), index: Some(3) },
                Segment { key: "title".into(), index: None },
            ]
        );
        assert_eq!(
            path.steps().collect::<Vec<_>>(),
            vec![Step::Key("blog"), Step::Index(3), Step::Key("title")]
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in [
            "", ".", "a.", ".a", "a..b", "[0]", "a[", "a[]", "a[-1]", "a[x]", "a[1]b",
            "a[1][2]", "a]b", "a[1.5]", "a[99999999999999999999999]",
        ] {
            let err = Path::parse(raw).unwrap_err();
            assert!(err.is_malformed(), "{raw:?} should be malformed, got {err:?}");
        }
    }

    #[test]
    fn test_get() {
        let tree = json!({"site": {"name": "Acme"}, "blog": [{"title": "A"}]});
        assert_eq!(get(&tree, &p("site.name")), Some(&json!("Acme")));
        assert_eq!(get(&tree, &p("blog[0].title")), Some(&json!("A")));
        assert_eq!(get(&tree, &p("blog[1].title")), None);
        assert_eq!(get(&tree, &p("site.name.first")), None);
        assert_eq!(get(&tree, &p("missing")), None);
    }

    #[test]
    fn test_bracket_path_write() {
        let tree = json!({"blog": [{"title": "A"}]});
        let updated = set(&tree, &p("blog[0].title"), json!("B")).unwrap();

        assert_eq!(updated, json!({"blog": [{"title": "B"}]}));
        assert_eq!(tree, json!({"blog": [{"title": "A"}]}));
    }

    #[test]
    fn test_final_index_writes() {
        let tree = json!({"tags": ["a", "b"]});

        let replaced = set(&tree, &p("tags[1]"), json!("z")).unwrap();
        assert_eq!(replaced, json!({"tags": ["a", "z"]}));

        let appended = set(&tree, &p("tags[2]"), json!("c")).unwrap();
        assert_eq!(appended, json!({"tags": ["a", "b", "c"]}));

        let err = set(&tree, &p("tags[5]"), json!("c")).unwrap_err();
        assert_eq!(
            err,
            PathError::IndexOutOfBounds {
                path: "tags[5]".into(),
                at: "tags".into(),
                index: 5,
                len: 2,
            }
        );
    }

    #[test]
    fn test_missing_intermediate_is_an_error() {
        let mut tree = json!({"site": {}});
        let before = tree.clone();

        let err = set_in_place(&mut tree, &p("site.contact.email"), json!("a@b.c")).unwrap_err();
        assert_eq!(
            err,
            PathError::Unresolved {
                path: "site.contact.email".into(),
                at: "site.contact".into(),
            }
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn test_scalar_intermediate_is_not_a_container() {
        let tree = json!({"site": {"name": "Acme"}, "blog": [1]});

        let err = set(&tree, &p("site.name.first"), json!("x")).unwrap_err();
        assert!(matches!(err, PathError::NotAContainer { ref at, .. } if at == "site.name"));

        let err = set(&tree, &p("site[0]"), json!("x")).unwrap_err();
        assert!(matches!(err, PathError::NotAContainer { ref at, .. } if at == "site"));

        let err = set(&tree, &p("blog[0].title"), json!("x")).unwrap_err();
        assert!(matches!(err, PathError::NotAContainer { ref at, .. } if at == "blog[0]"));
        assert!(err.is_resolution());
    }

    #[test]
    fn test_intermediate_index_out_of_bounds() {
        let tree = json!({"blog": []});
        let err = set(&tree, &p("blog[0].title"), json!("x")).unwrap_err();
        assert!(matches!(err, PathError::IndexOutOfBounds { index: 0, len: 0, .. }));
    }

    #[test]
    fn test_resolve_mut() {
        let mut tree = json!({"programs": [{"schedule": [{"time": "9am"}]}]});
        let node = resolve_mut(&mut tree, &p("programs[0].schedule")).unwrap();
        node.as_array_mut().unwrap().push(json!({"time": "5pm"}));
        assert_eq!(
            get(&tree, &p("programs[0].schedule[1].time")),
            Some(&json!("5pm"))
        );
    }

    #[test]
    fn test_serde_as_string() {
        let path: Path = serde_json::from_str("\"blog[2].title\"").unwrap();
        assert_eq!(path, p("blog[2].title"));
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"blog[2].title\"");
        assert!(serde_json::from_str::<Path>("\"blog[-2]\"").is_err());
    }

    #[test]
    fn test_from_segments_rejects_smuggled_separators() {
        assert!(Path::from_segments(vec![Segment { key: "a.b".into(), index: None }]).is_err());
        assert!(Path::from_segments(vec![]).is_err());
        let ok = Path::from_segments(vec![Segment { key: "a".into(), index: Some(1) }]).unwrap();
        assert_eq!(ok.to_string(), "a[1]");
    }
}
