//! Pipeline entry points for sync operations.
//!
//! - `run_sync`: Replicate every collection and apply its changes to the index
//! - `run_validate`: Check configuration and registry rows
//! - `run_info`: List collections and their next sync mode

pub mod info;
pub mod sync;
pub mod validate;

pub use info::run_info;
pub use sync::{Synchronizer, run_sync};
pub use validate::run_validate;
