// src/pipeline/sync.rs

//! Collection sync pipeline.
//!
//! For every registry row, in order: replicate, interpret the change log,
//! then apply each change to the index before moving to the next row. A
//! collection whose replication fails is left in its current mode so the
//! next run retries it; a failure on one record only skips that record.

use std::path::Path;

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::index::IndexGateway;
use crate::models::{ChangeAction, CollectionReport, CollectionRow, SyncMode, SyncReport};
use crate::services::{
    Replicator, escape_identifier, extract, extract_identifier, interpret, map_document,
};
use crate::storage::CollectionRegistry;
use crate::utils::log;

/// Drives replication and index updates for registry rows.
pub struct Synchronizer<'a> {
    registry: &'a dyn CollectionRegistry,
    replicator: &'a dyn Replicator,
    index: &'a dyn IndexGateway,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        registry: &'a dyn CollectionRegistry,
        replicator: &'a dyn Replicator,
        index: &'a dyn IndexGateway,
    ) -> Self {
        Self {
            registry,
            replicator,
            index,
        }
    }

    /// Sync one collection. Never fails as a whole; problems land in the report.
    pub async fn sync_collection(&self, row: &CollectionRow) -> CollectionReport {
        let mode = row.sync_mode();
        let mut report = CollectionReport::new(&row.collection_key, mode);

        let output = match self.replicator.replicate(row, mode).await {
            Ok(output) => output,
            Err(e) => {
                log::error(&format!("[{}] {}", row.collection_key, e));
                report.fatal = Some(e.to_string());
                return report;
            }
        };

        if mode == SyncMode::Baseline {
            // Committed before indexing: a crash from here on must not rerun the baseline
            if let Err(e) = self.registry.mark_baseline_complete(&row.collection_key).await {
                log::error(&format!(
                    "[{}] Baseline finished but could not be recorded: {}",
                    row.collection_key, e
                ));
                report.registry_failures += 1;
            }
        }

        self.apply_changes(row, &output, &mut report).await;
        report
    }

    /// Apply every change event of a replication run, in log order.
    async fn apply_changes(
        &self,
        row: &CollectionRow,
        output: &[u8],
        report: &mut CollectionReport,
    ) {
        let key = &row.collection_key;

        for item in interpret(output) {
            let event = match item {
                Ok(event) => event,
                Err(e) => {
                    log::warn(&format!("[{}] Skipping line: {}", key, e));
                    report.malformed_lines += 1;
                    continue;
                }
            };

            let path = event.local_path.as_path();
            let result = match event.action {
                ChangeAction::Created | ChangeAction::Updated => {
                    self.upsert_record(row, path).await
                }
                ChangeAction::Deleted => self.delete_record(path).await,
            };

            match result {
                Ok(id) => {
                    log::sub_item(&format!(
                        "{} {} ({})",
                        event.action.as_str(),
                        id,
                        path.display()
                    ));
                    match event.action {
                        ChangeAction::Deleted => report.deleted += 1,
                        _ => report.upserted += 1,
                    }
                }
                Err(e) => {
                    log::warn(&format!(
                        "[{}] {} {} skipped: {}",
                        key,
                        event.action.as_str(),
                        path.display(),
                        e
                    ));
                    count_failure(report, &e);
                }
            }
        }
    }

    /// Index the current local copy of a record; returns its id.
    async fn upsert_record(&self, row: &CollectionRow, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let record = extract(&bytes)?;
        let id = escape_identifier(&record.identifier);
        let document =
            map_document(&id, &row.collection_key, &row.institution_key, record.fields);
        self.index.upsert(&document).await?;
        Ok(id)
    }

    /// Remove a record from the index, recomputing its id from the local copy.
    async fn delete_record(&self, path: &Path) -> Result<String> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::stale_delete(path));
            }
            Err(e) => return Err(AppError::Io(e)),
        };
        let id = escape_identifier(&extract_identifier(&bytes)?);
        self.index.delete(&id).await?;
        Ok(id)
    }
}

fn count_failure(report: &mut CollectionReport, error: &AppError) {
    match error {
        AppError::StaleDeleteUnsupported { .. } => report.stale_deletes += 1,
        AppError::IndexWrite { .. } => report.index_failures += 1,
        _ => report.record_failures += 1,
    }
}

/// Sync every collection in the registry, or only `only` when given.
pub async fn run_sync(
    registry: &dyn CollectionRegistry,
    replicator: &dyn Replicator,
    index: &dyn IndexGateway,
    only: Option<&str>,
) -> Result<SyncReport> {
    let start_time = Utc::now();
    log::header("Collection sync starting");

    let mut rows = registry.load_rows().await?;
    if let Some(key) = only {
        rows.retain(|row| row.collection_key == key);
        if rows.is_empty() {
            return Err(AppError::config(format!("no collection '{key}' in registry")));
        }
    }
    log::info(&format!("Loaded {} collections", rows.len()));

    let synchronizer = Synchronizer::new(registry, replicator, index);
    let mut collections = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        log::step(
            i + 1,
            rows.len(),
            &format!(
                "{} / {} ({})",
                row.institution_key,
                row.collection_key,
                row.sync_mode()
            ),
        );
        let report = synchronizer.sync_collection(row).await;
        log_collection(&report);
        collections.push(report);
    }

    let report = SyncReport {
        start_time,
        end_time: Utc::now(),
        collections,
    };

    log::summary(
        "Sync run",
        &[
            ("Collections", report.collections.len().to_string()),
            ("Failed collections", report.failed_collections().to_string()),
            ("Documents upserted", report.total_upserted().to_string()),
            ("Documents deleted", report.total_deleted().to_string()),
            ("Skipped with errors", report.total_recoverable_errors().to_string()),
            (
                "Duration",
                format!("{}s", (report.end_time - report.start_time).num_seconds()),
            ),
        ],
    );

    Ok(report)
}

fn log_collection(report: &CollectionReport) {
    if let Some(fatal) = &report.fatal {
        log::error(&format!("{} failed: {}", report.collection_key, fatal));
        return;
    }
    let message = format!(
        "{}: {} upserted, {} deleted",
        report.collection_key, report.upserted, report.deleted
    );
    if report.recoverable_errors() == 0 {
        log::success(&message);
    } else {
        log::warn(&format!(
            "{} ({} malformed lines, {} bad records, {} stale deletes, {} index errors, {} registry errors)",
            message,
            report.malformed_lines,
            report.record_failures,
            report.stale_deletes,
            report.index_failures,
            report.registry_failures
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnValue, SearchDocument, sample_row};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakeRegistry {
        rows: Mutex<Vec<CollectionRow>>,
        fail_updates: bool,
    }

    impl FakeRegistry {
        fn new(rows: Vec<CollectionRow>) -> Self {
            Self {
                rows: Mutex::new(rows),
                fail_updates: false,
            }
        }

        fn is_first_run(&self, key: &str) -> bool {
            let rows = self.rows.lock().unwrap();
            rows.iter().find(|r| r.collection_key == key).unwrap().is_first_run
        }
    }

    #[async_trait]
    impl CollectionRegistry for FakeRegistry {
        async fn load_rows(&self) -> Result<Vec<CollectionRow>> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn mark_baseline_complete(&self, collection_key: &str) -> Result<()> {
            if self.fail_updates {
                return Err(AppError::registry("read-only"));
            }
            for row in self.rows.lock().unwrap().iter_mut() {
                if row.collection_key == collection_key {
                    row.is_first_run = false;
                }
            }
            Ok(())
        }
    }

    /// Replays canned output per collection; a missing entry fails the run.
    #[derive(Default)]
    struct FakeReplicator {
        outputs: HashMap<String, String>,
        calls: Mutex<Vec<(String, SyncMode)>>,
    }

    impl FakeReplicator {
        fn with(mut self, key: &str, output: String) -> Self {
            self.outputs.insert(key.to_string(), output);
            self
        }
    }

    #[async_trait]
    impl Replicator for FakeReplicator {
        async fn replicate(&self, row: &CollectionRow, mode: SyncMode) -> Result<Vec<u8>> {
            self.calls
                .lock()
                .unwrap()
                .push((row.collection_key.clone(), mode));
            self.outputs
                .get(&row.collection_key)
                .map(|s| s.clone().into_bytes())
                .ok_or_else(|| AppError::replication(&row.collection_key, "exit status: 1"))
        }
    }

    #[derive(Default)]
    struct RecordingIndex {
        upserts: Mutex<Vec<SearchDocument>>,
        deletes: Mutex<Vec<String>>,
        reject: Option<String>,
    }

    #[async_trait]
    impl IndexGateway for RecordingIndex {
        async fn upsert(&self, document: &SearchDocument) -> Result<()> {
            if self.reject.as_deref() == Some(document.id.as_str()) {
                return Err(AppError::index_write(&document.id, "HTTP 400"));
            }
            self.upserts.lock().unwrap().push(document.clone());
            Ok(())
        }

        async fn delete(&self, id: &str) -> Result<()> {
            self.deletes.lock().unwrap().push(id.to_string());
            Ok(())
        }
    }

    const RECORD1: &str = r#"<record xmlns="http://www.openarchives.org/OAI/2.0/">
  <header><identifier>oai:repo:123</identifier></header>
  <metadata>
    <oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/"
               xmlns:dc="http://purl.org/dc/elements/1.1/">
      <dc:title>Foo</dc:title>
      <dc:creator>A</dc:creator>
      <dc:creator>B</dc:creator>
    </oai_dc:dc>
  </metadata>
</record>"#;

    fn write_record(dir: &TempDir, name: &str, xml: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, xml).unwrap();
        path
    }

    fn record_with(identifier: &str, fields: &str) -> String {
        format!(
            "<record><header><identifier>{identifier}</identifier></header>\
             <metadata><dc>{fields}</dc></metadata></record>"
        )
    }

    #[tokio::test]
    async fn test_baseline_created_record() {
        let tmp = TempDir::new().unwrap();
        let path = write_record(&tmp, "record1.xml", RECORD1);

        let registry = FakeRegistry::new(vec![sample_row("col1", true)]);
        let replicator = FakeReplicator::default().with(
            "col1",
            format!("created: record1.xml -> {}\n", path.display()),
        );
        let index = RecordingIndex::default();

        let report = run_sync(&registry, &replicator, &index, None).await.unwrap();

        let upserts = index.upserts.lock().unwrap();
        assert_eq!(upserts.len(), 1);
        let doc = &upserts[0];
        assert_eq!(doc.id, "oai_3Arepo_3A123");
        assert_eq!(doc.collection_name, "col1");
        assert_eq!(doc.institution_name, "inst1");
        assert_eq!(
            serde_json::to_value(doc).unwrap(),
            serde_json::json!({
                "id": "oai_3Arepo_3A123",
                "collectionName": "col1",
                "institutionName": "inst1",
                "title_keyword": "Foo",
                "creator_keyword": ["A", "B"],
            })
        );

        assert!(!registry.is_first_run("col1"));
        assert_eq!(
            *replicator.calls.lock().unwrap(),
            vec![("col1".to_string(), SyncMode::Baseline)]
        );
        assert!(!report.has_failures());
        assert_eq!(report.collections[0].upserted, 1);
    }

    #[tokio::test]
    async fn test_incremental_delete_recomputes_id() {
        let tmp = TempDir::new().unwrap();
        let path = write_record(&tmp, "record1.xml", RECORD1);

        let registry = FakeRegistry::new(vec![sample_row("col1", false)]);
        let replicator = FakeReplicator::default().with(
            "col1",
            format!("deleted: record1.xml -> {}\n", path.display()),
        );
        let index = RecordingIndex::default();

        let report = run_sync(&registry, &replicator, &index, None).await.unwrap();

        assert_eq!(*index.deletes.lock().unwrap(), vec!["oai_3Arepo_3A123"]);
        assert!(index.upserts.lock().unwrap().is_empty());
        assert_eq!(report.collections[0].mode, SyncMode::Incremental);
        assert_eq!(report.collections[0].deleted, 1);
        assert!(!registry.is_first_run("col1"));
    }

    #[tokio::test]
    async fn test_unrecognized_verb_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let path = write_record(&tmp, "record1.xml", RECORD1);

        let registry = FakeRegistry::new(vec![sample_row("col1", false)]);
        let replicator = FakeReplicator::default().with(
            "col1",
            format!(
                "updating local cache\nupdated: record1.xml -> {}\n",
                path.display()
            ),
        );
        let index = RecordingIndex::default();

        let report = run_sync(&registry, &replicator, &index, None).await.unwrap();

        assert_eq!(index.upserts.lock().unwrap().len(), 1);
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn test_failed_replication_keeps_baseline_mode() {
        let tmp = TempDir::new().unwrap();
        let path = write_record(&tmp, "record1.xml", RECORD1);

        let registry = FakeRegistry::new(vec![sample_row("broken", true), sample_row("col2", true)]);
        let replicator = FakeReplicator::default().with(
            "col2",
            format!("created: record1.xml -> {}\n", path.display()),
        );
        let index = RecordingIndex::default();

        let report = run_sync(&registry, &replicator, &index, None).await.unwrap();

        assert!(registry.is_first_run("broken"));
        assert!(!registry.is_first_run("col2"));
        assert!(report.collections[0].fatal.is_some());
        assert_eq!(report.collections[1].upserted, 1);
        assert!(report.has_failures());
        assert_eq!(report.failed_collections(), 1);
    }

    #[tokio::test]
    async fn test_bad_records_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let bad = write_record(
            &tmp,
            "bad.xml",
            &record_with("oai:r:1", "<title>x</title><abstract>y</abstract>"),
        );
        let no_id = write_record(&tmp, "noid.xml", "<record><metadata><dc/></metadata></record>");
        let good = write_record(&tmp, "good.xml", &record_with("oai:r:2", "<title>ok</title>"));

        let registry = FakeRegistry::new(vec![sample_row("col1", false)]);
        let replicator = FakeReplicator::default().with(
            "col1",
            format!(
                "created: a -> {}\ncreated: b -> {}\ncreated: c\ncreated: d -> {}\n",
                bad.display(),
                no_id.display(),
                good.display()
            ),
        );
        let index = RecordingIndex::default();

        let report = run_sync(&registry, &replicator, &index, None).await.unwrap();

        let upserts = index.upserts.lock().unwrap();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0].id, "oai_3Ar_3A2");
        assert_eq!(
            upserts[0].column("title_keyword"),
            Some(&ColumnValue::Scalar("ok".into()))
        );

        let col = &report.collections[0];
        assert_eq!(col.record_failures, 2);
        assert_eq!(col.malformed_lines, 1);
        assert!(col.fatal.is_none());
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn test_stale_delete_and_index_rejection_continue() {
        let tmp = TempDir::new().unwrap();
        let rejected = write_record(&tmp, "rej.xml", &record_with("oai:r:bad", "<title>x</title>"));
        let kept = write_record(&tmp, "kept.xml", &record_with("oai:r:ok", "<title>y</title>"));
        let gone = tmp.path().join("gone.xml");

        let registry = FakeRegistry::new(vec![sample_row("col1", false)]);
        let replicator = FakeReplicator::default().with(
            "col1",
            format!(
                "deleted: g -> {}\nupdated: r -> {}\nupdated: k -> {}\n",
                gone.display(),
                rejected.display(),
                kept.display()
            ),
        );
        let index = RecordingIndex {
            reject: Some("oai_3Ar_3Abad".to_string()),
            ..RecordingIndex::default()
        };

        let report = run_sync(&registry, &replicator, &index, None).await.unwrap();

        let col = &report.collections[0];
        assert_eq!(col.stale_deletes, 1);
        assert_eq!(col.index_failures, 1);
        assert_eq!(col.upserted, 1);
        assert!(index.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_flag_persist_failure_still_indexes() {
        let tmp = TempDir::new().unwrap();
        let path = write_record(&tmp, "record1.xml", RECORD1);

        let registry = FakeRegistry {
            fail_updates: true,
            ..FakeRegistry::new(vec![sample_row("col1", true)])
        };
        let replicator = FakeReplicator::default().with(
            "col1",
            format!("created: record1.xml -> {}\n", path.display()),
        );
        let index = RecordingIndex::default();

        let report = run_sync(&registry, &replicator, &index, None).await.unwrap();

        assert_eq!(report.collections[0].registry_failures, 1);
        assert_eq!(report.collections[0].upserted, 1);
        assert!(registry.is_first_run("col1"));
    }

    #[tokio::test]
    async fn test_collection_filter() {
        let registry = FakeRegistry::new(vec![sample_row("col1", false), sample_row("col2", false)]);
        let replicator = FakeReplicator::default()
            .with("col1", String::new())
            .with("col2", String::new());
        let index = RecordingIndex::default();

        let report = run_sync(&registry, &replicator, &index, Some("col2"))
            .await
            .unwrap();
        assert_eq!(report.collections.len(), 1);
        assert_eq!(report.collections[0].collection_key, "col2");

        let missing = run_sync(&registry, &replicator, &index, Some("nope")).await;
        assert!(matches!(missing, Err(AppError::Config(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resync_script_and_json_registry() {
        use crate::services::ResyncCommand;
        use crate::storage::JsonRegistry;
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let record = write_record(&tmp, "record1.xml", RECORD1);

        // Stand-in for resync: prints one change line, like `--verbose` does
        let script = tmp.path().join("fake-resync.sh");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\necho \"Status: baseline\"\necho \"created: https://repo.example.org/record1.xml -> {}\"\n",
                record.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let registry_path = tmp.path().join("collections.json");
        let row = serde_json::to_value(sample_row("col1", true)).unwrap();
        std::fs::write(
            &registry_path,
            serde_json::to_vec(&serde_json::json!({ "_default": { "1": row } })).unwrap(),
        )
        .unwrap();

        let registry = JsonRegistry::new(&registry_path, "_default");
        let replicator = ResyncCommand::new(script.to_string_lossy());
        let index = RecordingIndex::default();

        let report = run_sync(&registry, &replicator, &index, None).await.unwrap();

        assert!(!report.has_failures());
        assert_eq!(index.upserts.lock().unwrap()[0].id, "oai_3Arepo_3A123");
        let rows = registry.load_rows().await.unwrap();
        assert!(!rows[0].is_first_run);
    }
}
