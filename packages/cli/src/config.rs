use serde::{Deserialize, Serialize};
use sitedraft_editor::TemplateId;
use sitedraft_workspace::{SessionMode, SessionOptions, DEFAULT_NAMESPACE};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "sitedraft.config.json";

/// Sitedraft configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the persisted session
    #[serde(default = "default_state_dir")]
    pub state_dir: String,

    /// Storage key of the session snapshot
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Template for a brand new site
    #[serde(default)]
    pub template: TemplateId,

    #[serde(default = "default_scroll_delay")]
    pub preview_scroll_delay_ms: u64,

    /// Canonical section order per page
    #[serde(default = "default_pages")]
    pub pages: BTreeMap<String, Vec<String>>,
}

fn default_state_dir() -> String {
    ".sitedraft".to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_scroll_delay() -> u64 {
    100
}

fn default_pages() -> BTreeMap<String, Vec<String>> {
    let home = ["hero", "programs", "reviews", "blog", "locations", "contact"];
    BTreeMap::from([(
        "home".to_string(),
        home.iter().map(|s| s.to_string()).collect(),
    )])
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get absolute path to the state directory
    pub fn get_state_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.state_dir)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            namespace: self.namespace.clone(),
            mode: SessionMode::Standalone,
            scroll_delay: Duration::from_millis(self.preview_scroll_delay_ms),
            template: self.template,
        }
    }

    /// Canonical sections of `page`, empty for pages the config does not know
    pub fn canonical(&self, page: &str) -> &[String] {
        self.pages.get(page).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            namespace: default_namespace(),
            template: TemplateId::default(),
            preview_scroll_delay_ms: default_scroll_delay(),
            pages: default_pages(),
        }
    }
}
