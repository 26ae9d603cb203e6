//! # Sitedraft Editor
//!
//! Content state engine for the site authoring backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ path: "blog[0].title" → navigation steps    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: draft / published lifecycle          │
//! │  - typed edits applied to the draft         │
//! │  - publish / revert between snapshots       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ state: store + sections + assets + site     │
//! │  records, exported / imported as one unit   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Snapshots never alias**: a value read before an edit never
//!    changes afterwards
//! 2. **Edits are atomic**: a failed edit or import leaves state untouched
//! 3. **Shape belongs to callers**: the content tree has no fixed schema
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sitedraft_editor::AuthoringState;
//!
//! let mut state = AuthoringState::new();
//! state.content.update_draft("site.name", "Acme")?;
//! state.content.publish();
//!
//! let envelope = state.export();
//! std::fs::write(envelope.file_name(), envelope.to_json_pretty()?)?;
//! ```

pub mod assets;
mod errors;
pub mod mutations;
pub mod path;
pub mod sections;
pub mod site;
mod state;
mod store;
pub mod transfer;

pub use assets::{Asset, AssetError, AssetKind, AssetLibrary, AssetPatch};
pub use errors::EditorError;
pub use mutations::ContentEdit;
pub use path::{Path, PathError};
pub use sections::{SectionConfig, SectionConfigs, SectionError};
pub use site::{default_content, LlmProfile, SeoMap, SeoRecord, TechnicalSeo, TemplateId};
pub use state::AuthoringState;
pub use store::{ContentState, ContentStore};
pub use transfer::{ExportEnvelope, ImportError, EXPORT_VERSION};

// Content trees are plain JSON values
pub use serde_json::Value as ContentTree;
