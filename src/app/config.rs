//! Declarative configuration file
//!
//! The file lists the instances to start for each capability, in order:
//!
//! ```json
//! {
//!   "credentials": [{"name": "c1", "plugin": "simple.map",
//!                    "params": {"auth.mode": "jwt", "auth.file": "/etc/key.json"}}],
//!   "datasources": [],
//!   "collectors":  [{"name": "col1", "plugin": "google.analytics",
//!                    "params": {"credential": "c1", "view.id": "12345",
//!                               "metric": "rt:activeUsers"}}]
//! }
//! ```
//!
//! JSON is the default format; a `.toml` extension selects TOML with the same
//! shape. Missing lists and missing `params` are empty.

use crate::core::error_handling::ContextualError;
use crate::plugin::api::{ConfigEntry, Declarations};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "pickman";
const DEFAULT_FILE_NAMES: [&str; 2] = ["pickman.json", "pickman.toml"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {tried}")]
    NotFound { tried: String },

    #[error("Error reading configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {path}: {message}")]
    Parse { path: String, message: String },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Reserved `server` section; accepted and kept but not acted on
///
/// Values are loosely typed so that both `"port": 8080` and `"port": "8080"`
/// load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub collectors: Vec<ConfigEntry>,
    #[serde(default)]
    pub credentials: Vec<ConfigEntry>,
    #[serde(default)]
    pub datasources: Vec<ConfigEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,
}

impl Config {
    /// Candidate paths tried when no file is given on the command line
    pub fn default_paths() -> Vec<PathBuf> {
        dirs::config_dir()
            .map(|dir| {
                DEFAULT_FILE_NAMES
                    .iter()
                    .map(|file| dir.join(APP_DIR).join(file))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The explicit path if it exists, else the first existing default
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let candidates = match explicit {
            Some(path) => vec![path.to_path_buf()],
            None => Self::default_paths(),
        };

        if let Some(found) = candidates.iter().find(|path| path.is_file()) {
            return Ok(found.clone());
        }

        let tried = if candidates.is_empty() {
            "no configuration directory available".to_string()
        } else {
            candidates
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        Err(ConfigError::NotFound { tried })
    }

    /// Locate, read and parse the configuration file
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = Self::locate(explicit)?;
        log::debug!("Loading configuration from {}", path.display());

        let contents =
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })?;

        Self::parse(&contents, ConfigFormat::from_path(&path)).map_err(|message| {
            ConfigError::Parse {
                path: path.display().to_string(),
                message,
            }
        })
    }

    pub fn parse(contents: &str, format: ConfigFormat) -> Result<Self, String> {
        match format {
            ConfigFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
        }
    }

    /// The three declaration lists handed to the orchestrator
    pub fn declarations(&self) -> Declarations {
        Declarations {
            credentials: self.credentials.clone(),
            data_sources: self.datasources.clone(),
            collectors: self.collectors.clone(),
        }
    }
}
