//! Search index gateway.
//!
//! The orchestrator only ever upserts whole documents or deletes by id;
//! backends report rejections as [`AppError::IndexWrite`](crate::error::AppError).

pub mod solr;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SearchDocument;

pub use solr::SolrIndex;

/// Write access to the search index.
#[async_trait]
pub trait IndexGateway: Send + Sync {
    /// Add a document, replacing any document with the same id.
    async fn upsert(&self, document: &SearchDocument) -> Result<()>;

    /// Remove a document by id. An unknown id is not an error.
    async fn delete(&self, id: &str) -> Result<()>;
}
