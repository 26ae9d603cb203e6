//! Durable snapshot of an authoring session, stored as one JSON document
//! under the session namespace.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitedraft_common::{CommonResult, StateStorage};
use sitedraft_editor::{
    AssetLibrary, AuthoringState, ContentStore, LlmProfile, SectionConfigs, SeoMap, TechnicalSeo,
    TemplateId,
};

pub const PERSIST_VERSION: u32 = 1;

fn persist_version() -> u32 {
    PERSIST_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default = "persist_version")]
    pub version: u32,
    pub draft_content: Value,
    pub published_content: Value,
    #[serde(default)]
    pub has_unsaved_changes: bool,
    #[serde(default)]
    pub section_configs: SectionConfigs,
    #[serde(default)]
    pub asset_library: AssetLibrary,
    #[serde(default)]
    pub seo: SeoMap,
    #[serde(default)]
    pub llm: LlmProfile,
    #[serde(default, rename = "technicalSEO")]
    pub technical_seo: TechnicalSeo,
    #[serde(default)]
    pub template: TemplateId,
    #[serde(default)]
    pub is_authenticated: bool,
}

impl PersistedState {
    pub fn capture(state: &AuthoringState, is_authenticated: bool) -> Self {
        Self {
            version: PERSIST_VERSION,
            draft_content: state.content.draft().clone(),
            published_content: state.content.published().clone(),
            has_unsaved_changes: state.content.has_unsaved_changes(),
            section_configs: state.sections.clone(),
            asset_library: state.assets.clone(),
            seo: state.seo.clone(),
            llm: state.llm.clone(),
            technical_seo: state.technical_seo.clone(),
            template: state.template,
            is_authenticated,
        }
    }

    /// Rebuild the in-memory state; returns it with the authentication flag
    pub fn restore(self) -> (AuthoringState, bool) {
        let state = AuthoringState {
            content: ContentStore::from_parts(
                self.draft_content,
                self.published_content,
                self.has_unsaved_changes,
            ),
            sections: self.section_configs,
            assets: self.asset_library,
            seo: self.seo,
            llm: self.llm,
            technical_seo: self.technical_seo,
            template: self.template,
        };
        (state, self.is_authenticated)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn save<S: StateStorage>(&self, storage: &S, key: &str) -> CommonResult<()> {
        let raw = self.to_json()?;
        storage.store(key, &raw)
    }
}
