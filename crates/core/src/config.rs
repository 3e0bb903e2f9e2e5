//! Application Configuration
//!
//! Manages all editor settings including:
//! - Which document store backend to use and how to reach it
//! - Autosave timing and new-scene defaults
//! - Log verbosity

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::UNTITLED;
use crate::error::{Result, SceneError};

/// Environment variable that points at an explicit config file
pub const CONFIG_ENV: &str = "SCENEWRIGHT_CONFIG";

/// Which document store adapter the application root constructs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store; nothing survives a restart
    #[default]
    Memory,
    /// Hosted content API over HTTP
    Http,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Project identifier of the hosted content API
    pub project_id: String,
    /// Dataset inside the project
    pub dataset: String,
    /// API version, e.g. `2023-05-03`
    pub api_version: String,
    /// Document type the scenes are stored under
    pub document_type: String,
    /// Write token; anonymous when absent
    pub token: Option<String>,
    /// Overrides the URL derived from `project_id`
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2023-05-03".to_string(),
            document_type: "novelContent".to_string(),
            token: None,
            base_url: None,
            timeout_secs: 30,
        }
    }
}

impl StoreConfig {
    /// Check the fields the HTTP backend cannot do without
    pub fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::Http {
            if self.project_id.is_empty() && self.base_url.is_none() {
                return Err(SceneError::Config(
                    "store.project_id or store.base_url is required for the http backend".into(),
                ));
            }
            if self.dataset.is_empty() {
                return Err(SceneError::Config("store.dataset must not be empty".into()));
            }
        }
        Ok(())
    }
}

/// Editor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period before an edit is written back, in milliseconds
    pub autosave_delay_ms: u64,
    /// Title given to newly created scenes
    pub default_title: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: 600,
            default_title: UNTITLED.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// Include source file and line in log lines
    pub show_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_location: false,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration version for migrations
    pub version: u32,
    pub store: StoreConfig,
    pub editor: EditorConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            store: StoreConfig::default(),
            editor: EditorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "scenewright", "Scenewright")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the configuration file path, honouring `SCENEWRIGHT_CONFIG`
    pub fn config_file() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Load configuration from the default location, writing defaults if absent
    pub async fn load() -> Result<Self> {
        let config_file = Self::config_file()
            .ok_or_else(|| SceneError::Config("Cannot determine config path".into()))?;
        Self::load_from(&config_file).await
    }

    /// Load configuration from `path`, writing defaults there if it does not exist
    pub async fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {:?}", path);
            let contents = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&contents)?;
            config.store.validate()?;
            Ok(config)
        } else {
            info!("Config file not found at {:?}, using defaults", path);
            let config = AppConfig::default();
            config.save_to(path).await?;
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = toml::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }
}
