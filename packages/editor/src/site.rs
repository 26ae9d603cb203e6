//! Site-level records that live beside the content tree: SEO metadata,
//! the LLM-facing business profile, technical SEO files and the active
//! template.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The three visual skins a site can be rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Classic,
    Modern,
    Bold,
}

impl TemplateId {
    pub const ALL: [TemplateId; 3] = [TemplateId::Classic, TemplateId::Modern, TemplateId::Bold];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Bold => "bold",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown template {s:?} (expected classic, modern or bold)"))
    }
}

/// Per-page search metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoRecord {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
}

/// page-id → SEO record
pub type SeoMap = BTreeMap<String, SeoRecord>;

/// Business summary served to language-model crawlers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmProfile {
    pub business_name: String,
    pub summary: String,
    pub services: Vec<String>,
    pub audience: String,
    pub tone: String,
    pub contact: String,
}

/// Generated crawler-facing files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicalSeo {
    pub robots_txt: String,
    pub sitemap_xml: String,
    pub llms_txt: String,
    pub base_url: String,
}

impl Default for TechnicalSeo {
    fn default() -> Self {
        Self {
            robots_txt: "User-agent: *\nAllow: /\n".to_string(),
            sitemap_xml: String::new(),
            llms_txt: String::new(),
            base_url: String::new(),
        }
    }
}

/// Starter document for a fresh site
pub fn default_content() -> Value {
    json!({
        "site": {
            "name": "My Site",
            "tagline": "",
            "phone": "",
            "email": "",
            "logo": ""
        },
        "navigation": [
            { "label": "Home", "href": "/" },
            { "label": "Programs", "href": "/programs" },
            { "label": "Blog", "href": "/blog" },
            { "label": "Contact", "href": "/contact" }
        ],
        "hero": {
            "title": "Welcome",
            "subtitle": "",
            "ctaText": "Get started",
            "ctaLink": "/contact",
            "image": ""
        },
        "programs": [],
        "blog": [],
        "reviews": [],
        "locations": [],
        "contact": {
            "title": "Contact us",
            "address": "",
            "hours": ""
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_ids() {
        assert_eq!("modern".parse::<TemplateId>().unwrap(), TemplateId::Modern);
        assert!("retro".parse::<TemplateId>().is_err());
        assert_eq!(serde_json::to_value(TemplateId::Bold).unwrap(), json!("bold"));
        assert_eq!(TemplateId::default(), TemplateId::Classic);
    }

    #[test]
    fn test_records_fill_missing_fields() {
        let seo: SeoRecord = serde_json::from_value(json!({"title": "Home"})).unwrap();
        assert_eq!(seo.title, "Home");
        assert!(seo.keywords.is_empty());

        let technical: TechnicalSeo =
            serde_json::from_value(json!({"baseUrl": "https://acme.test"})).unwrap();
        assert_eq!(technical.base_url, "https://acme.test");
        assert!(technical.robots_txt.starts_with("User-agent"));
    }

    #[test]
    fn test_default_content_is_an_object() {
        let content = default_content();
        assert!(content.is_object());
        assert!(content["blog"].is_array());
    }
}
