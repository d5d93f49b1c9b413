//! Configuration loaded from YAML, with every field defaulted
//!
//! Resolution order: an explicit path (must exist), then
//! `<config_dir>/quorum/config.yaml` when present, then built-in defaults.

use crate::gateway::{GatewayError, GeminiGateway, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::orchestrator::Orchestrator;
use crate::storage::MemoryStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Errors from loading or interpreting configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

/// Settings for the Gemini analysis provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub model: String,
    pub base_url: String,
    /// Inline API key. Prefer `api_key_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset
    pub api_key_env: String,
    /// HTTP request timeout; unset means no timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl GatewayConfig {
    /// The inline key, or else the value of `api_key_env`
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Per-kind record limit for the in-memory store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_records: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn level(&self) -> Result<tracing::Level, ConfigError> {
        tracing::Level::from_str(self.level.trim())
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.level)))
    }
}

impl Config {
    /// Default config file location (`~/.config/quorum/config.yaml` on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quorum").join("config.yaml"))
    }

    /// Load configuration from `path`, or from the default location if it
    /// exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.is_file() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file is a valid, all-defaults config
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.log.level()?;
        if self.gateway.model.trim().is_empty() {
            return Err(ConfigError::Invalid("gateway.model is empty".into()));
        }
        if self.gateway.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "gateway.request_timeout_secs must be positive".into(),
            ));
        }
        if self.storage.max_records == Some(0) {
            return Err(ConfigError::Invalid(
                "storage.max_records must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Wire a fresh in-memory store and the Gemini gateway into an orchestrator
    pub fn build_orchestrator(&self) -> Result<Orchestrator, GatewayError> {
        let gateway = GeminiGateway::from_config(&self.gateway)?;
        let store = match self.storage.max_records {
            Some(limit) => MemoryStore::new().with_max_records(limit),
            None => MemoryStore::new(),
        };
        Ok(Orchestrator::new(Arc::new(store), Arc::new(gateway)))
    }

    /// A copy safe to print: the inline API key is masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.gateway.api_key.is_some() {
            copy.gateway.api_key = Some("<redacted>".to_string());
        }
        copy
    }
}
