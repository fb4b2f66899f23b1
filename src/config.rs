// src/config.rs

//! Configuration loading utilities.
//!
//! Resolves the effective configuration for a run: the TOML file (or
//! defaults when it cannot be read), then command line overrides, then
//! validation.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::Config;

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Registry file path
    pub registry: Option<PathBuf>,
    /// Solr core URL
    pub solr_url: Option<String>,
    /// Replication program
    pub program: Option<String>,
}

impl ConfigOverrides {
    /// Apply the overrides onto a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.registry {
            config.registry.path = path.clone();
        }
        if let Some(url) = &self.solr_url {
            config.index.url = url.clone();
        }
        if let Some(program) = &self.program {
            config.replication.program = program.clone();
        }
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file cannot be loaded, applies the
/// overrides, and rejects invalid results.
pub fn load_config(path: &Path, overrides: &ConfigOverrides) -> Result<Config> {
    let mut config = Config::load_or_default(path);
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}
