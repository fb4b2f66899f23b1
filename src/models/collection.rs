//! Collection registry row.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One managed collection, as stored in the registry file.
///
/// Field names on disk follow the registry's historical keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionRow {
    /// Collection identifier, stable across runs
    pub collection_key: String,

    /// Owning institution identifier
    pub institution_key: String,

    /// Remote resource list, used by every run
    #[serde(rename = "resourcelist_uri")]
    pub remote_descriptor_uri: String,

    /// Remote change list, required once the baseline has run
    #[serde(rename = "changelist_uri", default)]
    pub remote_change_descriptor_uri: Option<String>,

    /// Remote URI prefix mapped onto `local_path_prefix`
    #[serde(rename = "url_map_from")]
    pub remote_uri_prefix: String,

    /// Local directory that mirrors `remote_uri_prefix`
    #[serde(rename = "file_path_map_to")]
    pub local_path_prefix: String,

    /// True until the first successful baseline sync
    #[serde(rename = "new")]
    pub is_first_run: bool,
}

/// Replication mode for a collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Full mirror against the resource list
    Baseline,
    /// Delta against the change list
    Incremental,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Baseline => "baseline",
            SyncMode::Incremental => "incremental",
        }
    }
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CollectionRow {
    /// Mode the next run of this collection will use.
    pub fn sync_mode(&self) -> SyncMode {
        if self.is_first_run {
            SyncMode::Baseline
        } else {
            SyncMode::Incremental
        }
    }

    /// Change list URI, or a config error when an incremental run has none.
    pub fn change_descriptor(&self) -> Result<&str> {
        self.remote_change_descriptor_uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| {
                AppError::config(format!(
                    "collection '{}' has no changelist_uri for incremental sync",
                    self.collection_key
                ))
            })
    }

    /// Check the row for values a sync could not run with.
    pub fn validate(&self) -> Result<()> {
        if self.collection_key.trim().is_empty() {
            return Err(AppError::validation("collection_key is empty"));
        }
        if self.institution_key.trim().is_empty() {
            return Err(AppError::validation(format!(
                "collection '{}': institution_key is empty",
                self.collection_key
            )));
        }
        url::Url::parse(&self.remote_descriptor_uri).map_err(|e| {
            AppError::validation(format!(
                "collection '{}': invalid resourcelist_uri: {e}",
                self.collection_key
            ))
        })?;
        if let Some(uri) = &self.remote_change_descriptor_uri {
            url::Url::parse(uri).map_err(|e| {
                AppError::validation(format!(
                    "collection '{}': invalid changelist_uri: {e}",
                    self.collection_key
                ))
            })?;
        }
        if self.sync_mode() == SyncMode::Incremental {
            self.change_descriptor()?;
        }
        if self.local_path_prefix.trim().is_empty() {
            return Err(AppError::validation(format!(
                "collection '{}': file_path_map_to is empty",
                self.collection_key
            )));
        }
        Ok(())
    }
}
