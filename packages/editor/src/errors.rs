//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Path error: {0}")]
    Path(#[from] crate::path::PathError),

    #[error("Section error: {0}")]
    Section(#[from] crate::sections::SectionError),

    #[error("Asset error: {0}")]
    Asset(#[from] crate::assets::AssetError),

    #[error("Import failed: {0}")]
    Import(#[from] crate::transfer::ImportError),

    #[error("Value could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}
