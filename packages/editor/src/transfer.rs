//! # Import / Export
//!
//! The export envelope is the only durable, portable form of a site.
//!
//! ## Import pipeline
//!
//! ```text
//! raw text ─→ JSON ─→ object? ─→ has content? ─→ content is object?
//!              │         │            │                 │
//!         InvalidJson  NotAnObject  MissingContent  InvalidContentShape
//! ```
//!
//! After the checks, the optional sub-states (`seo`, `llm`, `technicalSEO`,
//! `assetLibrary`, `template`) are taken when present and well-typed,
//! otherwise reset to their defaults. Everything is validated into a
//! staging value first, so a failed import never changes the session.
//! A successful import becomes the new baseline: draft and published both
//! hold the imported content.

use crate::assets::AssetLibrary;
use crate::site::{LlmProfile, SeoMap, TechnicalSeo, TemplateId};
use crate::state::AuthoringState;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub version: String,
    pub content: Value,
    pub seo: SeoMap,
    pub llm: LlmProfile,
    #[serde(rename = "technicalSEO")]
    pub technical_seo: TechnicalSeo,
    pub asset_library: AssetLibrary,
    pub template: TemplateId,
    pub exported_at: DateTime<Utc>,
}

impl ExportEnvelope {
    /// `site-content-<yyyy-mm-dd>.json`
    pub fn file_name(&self) -> String {
        format!("site-content-{}.json", self.exported_at.format("%Y-%m-%d"))
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("The file is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("The file must contain a JSON object at the top level")]
    NotAnObject,

    #[error("The file has no \"content\" section")]
    MissingContent,

    #[error("The \"content\" section must be an object")]
    InvalidContentShape,
}

/// A fully validated import, ready to be swapped in
#[derive(Debug, Clone)]
struct StagedImport {
    content: Value,
    seo: SeoMap,
    llm: LlmProfile,
    technical_seo: TechnicalSeo,
    assets: AssetLibrary,
    template: TemplateId,
}

impl StagedImport {
    fn parse(raw: &str) -> Result<Self, ImportError> {
        let root: Value =
            serde_json::from_str(raw).map_err(|e| ImportError::InvalidJson(e.to_string()))?;

        let Value::Object(mut root) = root else {
            return Err(ImportError::NotAnObject);
        };

        let content = match root.remove("content") {
            None | Some(Value::Null) => return Err(ImportError::MissingContent),
            Some(content @ Value::Object(_)) => content,
            Some(_) => return Err(ImportError::InvalidContentShape),
        };

        Ok(Self {
            content,
            seo: optional_field(&mut root, "seo"),
            llm: optional_field(&mut root, "llm"),
            technical_seo: optional_field(&mut root, "technicalSEO"),
            assets: optional_field(&mut root, "assetLibrary"),
            template: optional_field(&mut root, "template"),
        })
    }
}

fn optional_field<T: DeserializeOwned + Default>(root: &mut Map<String, Value>, field: &str) -> T {
    match root.remove(field) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
            tracing::warn!(field, %err, "imported field is ill-typed, using default");
            T::default()
        }),
    }
}

impl AuthoringState {
    /// Snapshot the draft and every sibling record
    pub fn export(&self) -> ExportEnvelope {
        self.export_at(Utc::now())
    }

    /// Pretty-printed export, ready to be written to [`ExportEnvelope::file_name`]
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        self.export().to_json_pretty()
    }

    pub fn export_at(&self, exported_at: DateTime<Utc>) -> ExportEnvelope {
        ExportEnvelope {
            version: EXPORT_VERSION.to_string(),
            content: self.content.draft().clone(),
            seo: self.seo.clone(),
            llm: self.llm.clone(),
            technical_seo: self.technical_seo.clone(),
            asset_library: self.assets.clone(),
            template: self.template,
            exported_at,
        }
    }

    /// Replace the session from an export file; all or nothing
    pub fn import(&mut self, raw: &str) -> Result<(), ImportError> {
        let staged = StagedImport::parse(raw)?;

        self.content.replace_baseline(staged.content);
        self.seo = staged.seo;
        self.llm = staged.llm;
        self.technical_seo = staged.technical_seo;
        self.assets = staged.assets;
        self.template = staged.template;

        tracing::debug!(assets = self.assets.len(), template = %self.template, "import applied");
        Ok(())
    }
}
