//! Site configuration from discourse-docs.toml

use crate::index::{ParserConfig, DOCS_PREFIX, ENGAGE_PREFIX};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "discourse-docs.toml";

/// Which kind of collection the index topic describes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Documentation pages with navigation and redirects
    #[default]
    Docs,
    /// Engage pages with per-page metadata and takeovers
    Engage,
}

impl Variant {
    /// URL prefix used when none is configured
    pub fn default_prefix(self) -> &'static str {
        match self {
            Variant::Docs => DOCS_PREFIX,
            Variant::Engage => ENGAGE_PREFIX,
        }
    }
}

/// Site configuration from discourse-docs.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Collection kind
    #[serde(default)]
    pub variant: Variant,

    /// Id of the index topic
    pub index_topic_id: u64,

    /// Prefix the collection is served under; defaults per variant
    pub url_prefix: Option<String>,

    /// Forum category documents must belong to (docs only)
    pub category_id: Option<u64>,

    /// Base URL of the forum
    pub forum_url: Option<String>,

    /// Directory holding `{id}.json` topic files, relative to the config file
    #[serde(default = "default_topics_dir")]
    pub topics_dir: PathBuf,
}

fn default_topics_dir() -> PathBuf {
    PathBuf::from("topics")
}

impl SiteConfig {
    /// Create a configuration with defaults for everything but the index topic
    pub fn new(variant: Variant, index_topic_id: u64) -> Self {
        Self {
            variant,
            index_topic_id,
            url_prefix: None,
            category_id: None,
            forum_url: None,
            topics_dir: default_topics_dir(),
        }
    }

    /// Load configuration from a discourse-docs.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(SiteConfig)` - Successfully loaded configuration
    /// * `Err(SiteConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SiteConfigError> {
        let content = fs::read_to_string(&path)?;
        let config: SiteConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a discourse-docs.toml file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SiteConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Effective URL prefix
    pub fn url_prefix(&self) -> &str {
        self.url_prefix
            .as_deref()
            .unwrap_or_else(|| self.variant.default_prefix())
    }

    /// Parser settings derived from this configuration
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            url_prefix: self.url_prefix().to_string(),
            index_topic_id: self.index_topic_id,
            category_id: match self.variant {
                Variant::Docs => self.category_id,
                Variant::Engage => None,
            },
            forum_url: self.forum_url.clone().unwrap_or_default(),
        }
    }

    /// Topic directory, resolved against the directory holding the config file
    pub fn topics_dir_from(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.topics_dir)
    }
}

/// Errors that can occur when loading or saving site configuration
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum SiteConfigError {
    /// IO error when reading or writing file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing TOML
    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Error serializing to TOML
    #[error("TOML serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
}
