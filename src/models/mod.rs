// src/models/mod.rs

//! Domain models for the sync job.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod change;
mod collection;
mod config;
mod document;
mod record;
mod report;

// Re-export all public types
pub use change::{ChangeAction, ChangeEvent};
pub use collection::{CollectionRow, SyncMode};
pub use config::{Config, IndexConfig, LoggingConfig, RegistryConfig, ReplicationConfig};
pub use document::{ColumnValue, SearchDocument};
pub use record::{DcField, ExtractedRecord, FieldEntry};
pub use report::{CollectionReport, SyncReport};

#[cfg(test)]
pub(crate) use collection::tests::sample_row;
