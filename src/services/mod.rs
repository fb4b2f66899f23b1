//! Service layer for the sync job.
//!
//! This module contains the business logic for:
//! - Replication runs (`Replicator`, `ResyncCommand`)
//! - Change log interpretation (`interpret`)
//! - Record field extraction (`extract`, `extract_identifier`)
//! - Search document mapping (`map_document`, `escape_identifier`)

pub mod changelog;
pub mod extractor;
pub mod mapper;
pub mod replication;

pub use changelog::{ChangeLog, interpret};
pub use extractor::{extract, extract_identifier};
pub use mapper::{escape_identifier, map_document};
pub use replication::{Replicator, ResyncCommand};
