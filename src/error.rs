// src/error.rs

//! Unified error handling for the sync job.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Record file is not well-formed XML
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Record file is not UTF-8
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Collection registry could not be read or updated
    #[error("Registry error: {0}")]
    Registry(String),

    /// Replication tool could not be started or exited unsuccessfully
    #[error("Replication failed for {collection}: {message}")]
    Replication { collection: String, message: String },

    /// A recognized change-log verb without a usable `->` target
    #[error("Malformed change-log line: {line:?}")]
    MalformedChangeLogLine { line: String },

    /// Record has no identifier element
    #[error("Record has no identifier element")]
    MissingIdentifier,

    /// Record has no descriptive metadata container
    #[error("Record has no metadata container")]
    MissingMetadata,

    /// Metadata container holds an element outside the field vocabulary
    #[error("Unrecognized metadata field '{name}'")]
    UnrecognizedField { name: String },

    /// Deleted record's local copy is gone, so its id cannot be recomputed
    #[error("Cannot recompute id for deleted record, {path:?} no longer exists")]
    StaleDeleteUnsupported { path: PathBuf },

    /// Search index rejected an upsert or delete
    #[error("Index write failed for {id}: {message}")]
    IndexWrite { id: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a registry error.
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry(message.into())
    }

    /// Create a replication error with the collection it belongs to.
    pub fn replication(collection: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Replication {
            collection: collection.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed change-log line error.
    pub fn malformed_line(line: impl Into<String>) -> Self {
        Self::MalformedChangeLogLine { line: line.into() }
    }

    /// Create an unrecognized field error.
    pub fn unrecognized_field(name: impl Into<String>) -> Self {
        Self::UnrecognizedField { name: name.into() }
    }

    /// Create a stale delete error.
    pub fn stale_delete(path: &Path) -> Self {
        Self::StaleDeleteUnsupported {
            path: path.to_path_buf(),
        }
    }

    /// Create an index write error.
    pub fn index_write(id: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::IndexWrite {
            id: id.into(),
            message: message.to_string(),
        }
    }
}
