//! Run statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::SyncMode;

/// Outcome of syncing one collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub collection_key: String,
    pub mode: SyncMode,
    pub upserted: usize,
    pub deleted: usize,
    pub malformed_lines: usize,
    pub record_failures: usize,
    pub stale_deletes: usize,
    pub index_failures: usize,
    /// Baseline flag could not be persisted
    pub registry_failures: usize,
    /// Error that stopped the collection, if any
    pub fatal: Option<String>,
}

impl CollectionReport {
    pub fn new(collection_key: impl Into<String>, mode: SyncMode) -> Self {
        Self {
            collection_key: collection_key.into(),
            mode,
            upserted: 0,
            deleted: 0,
            malformed_lines: 0,
            record_failures: 0,
            stale_deletes: 0,
            index_failures: 0,
            registry_failures: 0,
            fatal: None,
        }
    }

    /// Sum of per-line, per-record and per-event errors.
    pub fn recoverable_errors(&self) -> usize {
        self.malformed_lines
            + self.record_failures
            + self.stale_deletes
            + self.index_failures
            + self.registry_failures
    }

    pub fn has_failures(&self) -> bool {
        self.fatal.is_some() || self.recoverable_errors() > 0
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub collections: Vec<CollectionReport>,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        self.collections.iter().any(CollectionReport::has_failures)
    }

    pub fn failed_collections(&self) -> usize {
        self.collections.iter().filter(|c| c.fatal.is_some()).count()
    }

    pub fn total_upserted(&self) -> usize {
        self.collections.iter().map(|c| c.upserted).sum()
    }

    pub fn total_deleted(&self) -> usize {
        self.collections.iter().map(|c| c.deleted).sum()
    }

    pub fn total_recoverable_errors(&self) -> usize {
        self.collections
            .iter()
            .map(CollectionReport::recoverable_errors)
            .sum()
    }
}
