// src/pipeline/info.rs

use crate::error::Result;
use crate::models::CollectionRow;
use crate::storage::CollectionRegistry;
use crate::utils::log;

/// List registry collections with the mode their next sync will use.
pub async fn run_info(registry: &dyn CollectionRegistry) -> Result<Vec<CollectionRow>> {
    let rows = registry.load_rows().await?;
    log::header(&format!("{} collections", rows.len()));

    for row in &rows {
        log::info(&format!(
            "{} / {}: next sync {}",
            row.institution_key,
            row.collection_key,
            row.sync_mode()
        ));
        log::sub_item(&format!("Resource list: {}", row.remote_descriptor_uri));
        if let Some(uri) = &row.remote_change_descriptor_uri {
            log::sub_item(&format!("Change list: {uri}"));
        }
        log::sub_item(&format!(
            "Mirror: {} -> {}",
            row.remote_uri_prefix, row.local_path_prefix
        ));
    }

    Ok(rows)
}
