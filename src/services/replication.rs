// src/services/replication.rs

//! Replication step.
//!
//! Runs the ResourceSync client against a collection and hands back its
//! verbose output for the change log interpreter.

use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{AppError, Result};
use crate::models::{CollectionRow, SyncMode};

/// Number of trailing output bytes kept in a failure message.
const FAILURE_TAIL_BYTES: usize = 2048;

/// Mirrors a collection's remote records into its local directory.
#[async_trait]
pub trait Replicator: Send + Sync {
    /// Run one replication pass and return its raw output.
    ///
    /// Fails when the tool cannot be started or exits unsuccessfully; the
    /// output of a failed run is never interpreted.
    async fn replicate(&self, row: &CollectionRow, mode: SyncMode) -> Result<Vec<u8>>;
}

/// The `resync` command line client.
#[derive(Debug, Clone)]
pub struct ResyncCommand {
    program: String,
}

impl ResyncCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command line arguments for a run in the given mode.
    pub fn arguments(row: &CollectionRow, mode: SyncMode) -> Result<Vec<String>> {
        let mut args: Vec<String> = match mode {
            SyncMode::Baseline => vec!["--baseline".into()],
            SyncMode::Incremental => vec!["--incremental".into()],
        };
        args.extend(["--verbose".into(), "--delete".into(), "--sitemap".into()]);
        args.push(row.remote_descriptor_uri.clone());

        if mode == SyncMode::Incremental {
            args.push("--changelist-uri".into());
            args.push(row.change_descriptor()?.to_string());
        }

        args.push(row.remote_uri_prefix.clone());
        args.push(row.local_path_prefix.clone());
        Ok(args)
    }
}

#[async_trait]
impl Replicator for ResyncCommand {
    async fn replicate(&self, row: &CollectionRow, mode: SyncMode) -> Result<Vec<u8>> {
        let args = Self::arguments(row, mode)?;
        log::info!("Running: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                AppError::replication(
                    &row.collection_key,
                    format!("could not start {}: {e}", self.program),
                )
            })?;

        if !output.status.success() {
            return Err(AppError::replication(
                &row.collection_key,
                format!("{} ({})", output.status, failure_tail(&output)),
            ));
        }

        let Output {
            mut stdout, stderr, ..
        } = output;
        stdout.extend_from_slice(&stderr);
        Ok(stdout)
    }
}

/// Last part of the combined output, for error messages.
fn failure_tail(output: &Output) -> String {
    let mut combined = output.stdout.clone();
    combined.extend_from_slice(&output.stderr);
    let start = combined.len().saturating_sub(FAILURE_TAIL_BYTES);
    String::from_utf8_lossy(&combined[start..]).trim().to_string()
}
