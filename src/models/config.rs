//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Collection registry location
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Replication tool invocation
    #[serde(default)]
    pub replication: ReplicationConfig,

    /// Search index connection
    #[serde(default)]
    pub index: IndexConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.registry.path.as_os_str().is_empty() {
            return Err(AppError::validation("registry.path is empty"));
        }
        if self.registry.table.trim().is_empty() {
            return Err(AppError::validation("registry.table is empty"));
        }
        if self.replication.program.trim().is_empty() {
            return Err(AppError::validation("replication.program is empty"));
        }
        let url = url::Url::parse(&self.index.url)
            .map_err(|e| AppError::validation(format!("index.url is invalid: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "index.url must be http(s), got '{}'",
                url.scheme()
            )));
        }
        if self.index.timeout_secs == 0 {
            return Err(AppError::validation("index.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Where the collection rows live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Path to the registry JSON file
    #[serde(default = "defaults::registry_path")]
    pub path: PathBuf,

    /// Table inside the file holding the rows
    #[serde(default = "defaults::registry_table")]
    pub table: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: defaults::registry_path(),
            table: defaults::registry_table(),
        }
    }
}

/// Replication tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationConfig {
    /// Executable name or path
    #[serde(default = "defaults::program")]
    pub program: String,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            program: defaults::program(),
        }
    }
}

/// Solr connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Core or collection base URL, e.g. `http://localhost:8983/solr/records`
    #[serde(default = "defaults::index_url")]
    pub url: String,

    /// Commit after every update request
    #[serde(default = "defaults::commit")]
    pub commit: bool,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: defaults::index_url(),
            commit: defaults::commit(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Registry defaults
    pub fn registry_path() -> PathBuf {
        PathBuf::from("storage/collections.json")
    }
    pub fn registry_table() -> String {
        "_default".into()
    }

    // Replication defaults
    pub fn program() -> String {
        "resync".into()
    }

    // Index defaults
    pub fn index_url() -> String {
        "http://localhost:8983/solr/records".into()
    }
    pub fn commit() -> bool {
        true
    }
    pub fn timeout() -> u64 {
        30
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
