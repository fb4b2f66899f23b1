// src/pipeline/validate.rs

use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::storage::CollectionRegistry;
use crate::utils::log;

/// Validate configuration and every registry row.
pub async fn run_validate(config: &Config, registry: &dyn CollectionRegistry) -> Result<()> {
    log::header("Validating configuration");

    config.validate()?;
    log::success("Config OK");
    log::sub_item(&format!("Registry: {}", config.registry.path.display()));
    log::sub_item(&format!("Replication program: {}", config.replication.program));
    log::sub_item(&format!("Index: {}", config.index.url));

    let rows = registry.load_rows().await?;
    let mut seen = HashSet::new();
    let mut invalid = 0;

    for row in &rows {
        if !seen.insert(row.collection_key.as_str()) {
            log::error(&format!("Duplicate collection_key '{}'", row.collection_key));
            invalid += 1;
            continue;
        }
        if let Err(e) = row.validate() {
            log::error(&e.to_string());
            invalid += 1;
        }
    }

    if invalid > 0 {
        return Err(AppError::validation(format!(
            "{} of {} registry rows are invalid",
            invalid,
            rows.len()
        )));
    }

    log::success(&format!("Registry OK ({} collections)", rows.len()));
    Ok(())
}
