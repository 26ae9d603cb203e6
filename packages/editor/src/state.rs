//! The whole authoring state owned by one editing session.

use crate::assets::AssetLibrary;
use crate::sections::SectionConfigs;
use crate::site::{LlmProfile, SeoMap, TechnicalSeo, TemplateId};
use crate::store::ContentStore;

#[derive(Debug, Clone, Default)]
pub struct AuthoringState {
    pub content: ContentStore,
    pub sections: SectionConfigs,
    pub assets: AssetLibrary,
    pub seo: SeoMap,
    pub llm: LlmProfile,
    pub technical_seo: TechnicalSeo,
    pub template: TemplateId,
}

impl AuthoringState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(template: TemplateId) -> Self {
        Self {
            template,
            ..Self::default()
        }
    }
}
