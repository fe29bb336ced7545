use anyhow::Context;
use pagesmith_schema::BrandConfig;
use pagesmith_translator::TranslatorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "pagesmith.config.json";

/// Pagesmith configuration file format
///
/// The API key is deliberately absent: it is read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Layout edited by `chat` and written by `:save`
    #[serde(default = "default_layout")]
    pub layout: String,

    /// Where `chat` keeps its resumable session
    #[serde(default = "default_session_file")]
    pub session_file: String,

    /// Directory published pages are written into
    #[serde(default = "default_publish_root")]
    pub publish_root: String,

    /// Maximum versions kept per session (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub brand: BrandConfig,

    #[serde(default)]
    pub translator: TranslatorConfig,
}

fn default_layout() -> String {
    "layout.json".to_string()
}

fn default_session_file() -> String {
    ".pagesmith/session.json".to_string()
}

fn default_publish_root() -> String {
    "public".to_string()
}

fn default_history_limit() -> usize {
    100
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", config_path.display()))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Resolve a configured (or overriding) path against the working directory
    pub fn resolve(cwd: &str, path: impl AsRef<Path>) -> PathBuf {
        PathBuf::from(cwd).join(path)
    }

    pub fn layout_path(&self, cwd: &str) -> PathBuf {
        Self::resolve(cwd, &self.layout)
    }

    pub fn session_path(&self, cwd: &str) -> PathBuf {
        Self::resolve(cwd, &self.session_file)
    }

    pub fn publish_root(&self, cwd: &str) -> PathBuf {
        Self::resolve(cwd, &self.publish_root)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            session_file: default_session_file(),
            publish_root: default_publish_root(),
            history_limit: default_history_limit(),
            brand: BrandConfig::default(),
            translator: TranslatorConfig::default(),
        }
    }
}
