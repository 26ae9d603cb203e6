//! # Content Edits
//!
//! Typed operations on the draft tree.
//!
//! `Set` covers every form field. The item operations back the array
//! editors (programs, blog posts, reviews, locations), which add, delete
//! and reorder entries rather than writing single fields.
//!
//! ## Semantics
//!
//! - Every edit resolves its target before touching anything, so a failed
//!   edit leaves the tree exactly as it was.
//! - `InsertItem` without an index appends.
//! - `MoveItem` removes then re-inserts; `to` is an index into the list
//!   after removal.

use crate::path::{self, Path, PathError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentEdit {
    /// Write a value at a path
    Set { path: Path, value: Value },

    /// Insert an entry into the array at `path`
    #[serde(rename_all = "camelCase")]
    InsertItem {
        path: Path,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        value: Value,
    },

    /// Remove the entry at `index` from the array at `path`
    RemoveItem { path: Path, index: usize },

    /// Move an entry within the array at `path`
    MoveItem { path: Path, from: usize, to: usize },
}

impl ContentEdit {
    pub fn set(path: Path, value: Value) -> Self {
        ContentEdit::Set { path, value }
    }

    pub fn path(&self) -> &Path {
        match self {
            ContentEdit::Set { path, .. }
            | ContentEdit::InsertItem { path, .. }
            | ContentEdit::RemoveItem { path, .. }
            | ContentEdit::MoveItem { path, .. } => path,
        }
    }

    /// Debug name for logging
    pub fn name(&self) -> &'static str {
        match self {
            ContentEdit::Set { .. } => "set",
            ContentEdit::InsertItem { .. } => "insertItem",
            ContentEdit::RemoveItem { .. } => "removeItem",
            ContentEdit::MoveItem { .. } => "moveItem",
        }
    }

    /// Apply this edit to `tree` in place
    pub fn apply(&self, tree: &mut Value) -> Result<(), PathError> {
        match self {
            ContentEdit::Set { path, value } => path::set_in_place(tree, path, value.clone()),

            ContentEdit::InsertItem { path, index, value } => {
                let items = array_at(tree, path)?;
                let len = items.len();
                let index = index.unwrap_or(len);
                if index > len {
                    return Err(out_of_bounds(path, index, len));
                }
                items.insert(index, value.clone());
                Ok(())
            }

            ContentEdit::RemoveItem { path, index } => {
                let items = array_at(tree, path)?;
                let len = items.len();
                if *index >= len {
                    return Err(out_of_bounds(path, *index, len));
                }
                items.remove(*index);
                Ok(())
            }

            ContentEdit::MoveItem { path, from, to } => {
                let items = array_at(tree, path)?;
                let len = items.len();
                if *from >= len {
                    return Err(out_of_bounds(path, *from, len));
                }
                if *to >= len {
                    return Err(out_of_bounds(path, *to, len));
                }
                let item = items.remove(*from);
                items.insert(*to, item);
                Ok(())
            }
        }
    }
}

fn array_at<'a>(tree: &'a mut Value, path: &Path) -> Result<&'a mut Vec<Value>, PathError> {
    match path::resolve_mut(tree, path)? {
        Value::Array(items) => Ok(items),
        _ => Err(PathError::NotAContainer {
            path: path.to_string(),
            at: path.describe(path.depth()),
        }),
    }
}

fn out_of_bounds(path: &Path, index: usize, len: usize) -> PathError {
    PathError::IndexOutOfBounds {
        path: path.to_string(),
        at: path.describe(path.depth()),
        index,
        len,
    }
}
