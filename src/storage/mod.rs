//! Collection registry storage.
//!
//! The registry is a TinyDB-layout JSON file, one table of rows keyed by a
//! numeric document id:
//!
//! ```text
//! {
//!   "_default": {
//!     "1": { "collection_key": "...", "new": true, ... },
//!     "2": { ... }
//!   }
//! }
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::CollectionRow;

// Re-export for convenience
pub use local::JsonRegistry;

/// Trait for collection registry backends.
#[async_trait]
pub trait CollectionRegistry: Send + Sync {
    /// All rows, in registry order.
    async fn load_rows(&self) -> Result<Vec<CollectionRow>>;

    /// Persist the end of a collection's baseline phase.
    ///
    /// Clears the first-run flag of every row with this key. Calling it
    /// again is harmless.
    async fn mark_baseline_complete(&self, collection_key: &str) -> Result<()>;
}
