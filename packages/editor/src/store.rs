//! # Content Store
//!
//! Owns the draft and published content trees.
//!
//! ## Lifecycle
//!
//! ```text
//!            update_draft / apply
//!   Clean ─────────────────────────→ Dirty ─┐
//!     ↑                                ↑    │ update_draft / apply
//!     │        publish / revert        └────┘
//!     └──────────────────────────────────┘
//! ```
//!
//! Both trees live behind `Arc`s and are written through `Arc::make_mut`.
//! Publishing shares the draft's allocation, and the next draft edit
//! detaches it, so snapshots handed out earlier never observe later edits.

use crate::mutations::ContentEdit;
use crate::path::{self, Path};
use crate::EditorError;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Whether the draft differs from the last publish/revert point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentState {
    Clean,
    Dirty,
}

#[derive(Debug, Clone)]
pub struct ContentStore {
    draft: Arc<Value>,
    published: Arc<Value>,
    has_unsaved_changes: bool,

    /// Increments on every successful draft change
    version: u64,
}

impl ContentStore {
    /// Start clean with `draft == published == content`
    pub fn new(content: Value) -> Self {
        let content = Arc::new(content);
        Self {
            draft: Arc::clone(&content),
            published: content,
            has_unsaved_changes: false,
            version: 0,
        }
    }

    /// Rebuild a store from persisted parts
    pub fn from_parts(draft: Value, published: Value, has_unsaved_changes: bool) -> Self {
        Self {
            draft: Arc::new(draft),
            published: Arc::new(published),
            has_unsaved_changes,
            version: 0,
        }
    }

    pub fn draft(&self) -> &Value {
        &self.draft
    }

    pub fn published(&self) -> &Value {
        &self.published
    }

    /// Shared handle to the current draft; later edits never reach it
    pub fn snapshot(&self) -> Arc<Value> {
        Arc::clone(&self.draft)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn state(&self) -> ContentState {
        if self.has_unsaved_changes {
            ContentState::Dirty
        } else {
            ContentState::Clean
        }
    }

    /// Read a draft value by path text
    pub fn read(&self, path: &str) -> Result<Option<&Value>, EditorError> {
        let path = Path::parse(path)?;
        Ok(path::get(&self.draft, &path))
    }

    /// Write `value` at `path` in the draft and mark the store dirty
    pub fn update_draft<T: Serialize>(&mut self, path: &str, value: T) -> Result<(), EditorError> {
        let path = Path::parse(path)?;
        let value = serde_json::to_value(value)?;
        self.apply(&ContentEdit::Set { path, value })
    }

    /// Apply a typed edit to the draft and mark the store dirty
    ///
    /// On error neither the draft nor the dirty flag changes.
    pub fn apply(&mut self, edit: &ContentEdit) -> Result<(), EditorError> {
        // Work on a scratch copy when the draft is shared so a failing edit
        // does not detach it from the published snapshot for nothing.
        if Arc::strong_count(&self.draft) > 1 {
            let mut scratch = Value::clone(&self.draft);
            edit.apply(&mut scratch)?;
            self.draft = Arc::new(scratch);
        } else {
            edit.apply(Arc::make_mut(&mut self.draft))?;
        }

        self.has_unsaved_changes = true;
        self.version += 1;
        tracing::debug!(edit = edit.name(), path = %edit.path(), version = self.version, "draft updated");
        Ok(())
    }

    /// Make the draft the published snapshot
    pub fn publish(&mut self) {
        self.published = Arc::clone(&self.draft);
        self.has_unsaved_changes = false;
        tracing::debug!(version = self.version, "draft published");
    }

    /// Throw away draft edits, restoring the published snapshot
    pub fn revert(&mut self) {
        if !Arc::ptr_eq(&self.draft, &self.published) {
            self.draft = Arc::clone(&self.published);
            self.version += 1;
        }
        self.has_unsaved_changes = false;
        tracing::debug!(version = self.version, "draft reverted");
    }

    /// Install `content` as both draft and published, leaving the store clean
    pub fn replace_baseline(&mut self, content: Value) {
        let content = Arc::new(content);
        self.draft = Arc::clone(&content);
        self.published = content;
        self.has_unsaved_changes = false;
        self.version += 1;
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new(crate::site::default_content())
    }
}
