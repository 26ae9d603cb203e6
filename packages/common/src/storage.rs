use crate::{CommonError, CommonResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Key/value persistence for serialized authoring state
///
/// Every key holds one opaque string (a JSON document in practice).
/// Implementations only need single-process atomicity.
pub trait StateStorage {
    /// Read the value stored under `key`, `None` if nothing was stored yet
    fn load(&self, key: &str) -> CommonResult<Option<String>>;

    /// Replace the value stored under `key`
    fn store(&self, key: &str, value: &str) -> CommonResult<()>;

    /// Delete the value stored under `key` (no-op if absent)
    fn remove(&self, key: &str) -> CommonResult<()>;
}

/// Storage keys become file names, so keep them to a safe alphabet.
pub fn validate_key(key: &str) -> CommonResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(CommonError::InvalidKey(key.to_string()))
    }
}

/// File-backed storage: one `<key>.json` file per key inside `root`
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> CommonResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl StateStorage for FileStorage {
    fn load(&self, key: &str) -> CommonResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, key: &str, value: &str) -> CommonResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)?;

        // Write-then-rename so a crash never leaves a half-written state file
        let tmp = self.root.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;

        tracing::debug!(key, bytes = value.len(), "stored state");
        Ok(())
    }

    fn remove(&self, key: &str) -> CommonResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage for testing and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.into());
        storage
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> CommonResult<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> CommonResult<()> {
        validate_key(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CommonResult<()> {
        validate_key(key)?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

impl<T: StateStorage + ?Sized> StateStorage for &T {
    fn load(&self, key: &str) -> CommonResult<Option<String>> {
        (**self).load(key)
    }

    fn store(&self, key: &str, value: &str) -> CommonResult<()> {
        (**self).store(key, value)
    }

    fn remove(&self, key: &str) -> CommonResult<()> {
        (**self).remove(key)
    }
}
