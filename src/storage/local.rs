//! Local filesystem registry implementation.
//!
//! Reads and rewrites a TinyDB-compatible JSON file. Rewrites go through a
//! temporary file and a rename so a crash never leaves a torn registry, and
//! every key other than the first-run flag is written back untouched.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{CollectionRow, RegistryConfig};
use crate::storage::CollectionRegistry;

/// Key of the first-run flag inside a row.
const FIRST_RUN_KEY: &str = "new";

/// JSON file registry backend.
#[derive(Debug, Clone)]
pub struct JsonRegistry {
    path: PathBuf,
    table: String,
}

impl JsonRegistry {
    /// Create a registry reading `table` from the file at `path`.
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            table: table.into(),
        }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(&config.path, &config.table)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole registry document.
    async fn read_document(&self) -> Result<Map<String, Value>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::registry(format!(
                    "registry file {} not found",
                    self.path.display()
                )));
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        match serde_json::from_slice(&bytes)? {
            Value::Object(doc) => Ok(doc),
            _ => Err(AppError::registry(format!(
                "registry file {} is not a JSON object",
                self.path.display()
            ))),
        }
    }

    /// Write the registry document atomically (write to temp, then rename).
    async fn write_document(&self, doc: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec(doc)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Document ids of a table in registry order.
    fn ordered_ids(table: &Map<String, Value>) -> Vec<String> {
        let mut ids: Vec<String> = table.keys().cloned().collect();
        ids.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        });
        ids
    }
}

#[async_trait]
impl CollectionRegistry for JsonRegistry {
    async fn load_rows(&self) -> Result<Vec<CollectionRow>> {
        let doc = self.read_document().await?;

        let Some(table) = doc.get(&self.table) else {
            log::warn!(
                "Registry {} has no table '{}'",
                self.path.display(),
                self.table
            );
            return Ok(Vec::new());
        };
        let table = table.as_object().ok_or_else(|| {
            AppError::registry(format!("registry table '{}' is not an object", self.table))
        })?;

        Self::ordered_ids(table)
            .into_iter()
            .map(|id| {
                serde_json::from_value(table[&id].clone()).map_err(|e| {
                    AppError::registry(format!("row {id} in table '{}': {e}", self.table))
                })
            })
            .collect()
    }

    async fn mark_baseline_complete(&self, collection_key: &str) -> Result<()> {
        let mut doc = self.read_document().await?;
        let table = doc
            .get_mut(&self.table)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                AppError::registry(format!("registry table '{}' is missing", self.table))
            })?;

        let mut matched = 0;
        let mut changed = 0;
        for row in table.values_mut().filter_map(Value::as_object_mut) {
            if row.get("collection_key").and_then(Value::as_str) != Some(collection_key) {
                continue;
            }
            matched += 1;
            if row.get(FIRST_RUN_KEY) != Some(&Value::Bool(false)) {
                row.insert(FIRST_RUN_KEY.to_string(), Value::Bool(false));
                changed += 1;
            }
        }

        if matched == 0 {
            return Err(AppError::registry(format!(
                "no collection '{collection_key}' in registry"
            )));
        }
        if changed > 0 {
            self.write_document(&doc).await?;
            log::info!("Collection '{}' switched to incremental sync", collection_key);
        }
        Ok(())
    }
}
