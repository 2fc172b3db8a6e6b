//! Manifest Processor: one manifest → concurrent Fetch Units.
//!
//! Every entry gets its own task. A failing entry never cancels its siblings,
//! and the processor joins all of them before reporting.

use std::path::PathBuf;
use std::sync::Arc;

use crate::events::FetchEvent;
use crate::fetch::{fetch_file, FetchError, FileOutcome, FileReport};
use crate::manifest::{ManifestError, ResourceManifest};
use crate::session::Session;

#[derive(Debug)]
pub enum ManifestOutcome {
    /// Manifest loaded; one report per entry, in manifest order.
    Processed(Vec<FileReport>),
    /// Manifest could not be loaded; none of its entries were attempted.
    Failed(ManifestError),
}

#[derive(Debug)]
pub struct ManifestReport {
    pub manifest: PathBuf,
    pub outcome: ManifestOutcome,
}

impl ManifestReport {
    /// File reports, empty for a failed manifest.
    pub fn files(&self) -> &[FileReport] {
        match &self.outcome {
            ManifestOutcome::Processed(files) => files,
            ManifestOutcome::Failed(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ManifestOutcome::Failed(_))
    }
}

/// Load the manifest at `path` and fetch all of its entries.
pub async fn process_manifest(session: Arc<Session>, path: PathBuf) -> ManifestReport {
    match ResourceManifest::load(&path).await {
        Ok(manifest) => process_loaded(session, manifest).await,
        Err(e) => {
            tracing::warn!(manifest = %path.display(), "skipping manifest: {e}");
            session
                .emit(FetchEvent::ManifestFailed {
                    manifest: path.clone(),
                    error: e.to_string(),
                })
                .await;
            ManifestReport {
                manifest: path,
                outcome: ManifestOutcome::Failed(e),
            }
        }
    }
}

/// Fetch every entry of an already-loaded manifest concurrently.
pub async fn process_loaded(session: Arc<Session>, manifest: ResourceManifest) -> ManifestReport {
    let ResourceManifest {
        path,
        source_dir,
        entries,
    } = manifest;

    if entries.is_empty() {
        tracing::debug!(manifest = %path.display(), "manifest has no entries");
        return ManifestReport {
            manifest: path,
            outcome: ManifestOutcome::Processed(Vec::new()),
        };
    }
    tracing::info!(manifest = %path.display(), files = entries.len(), "processing manifest");

    let handles: Vec<_> = entries
        .into_iter()
        .map(|task| {
            let session = Arc::clone(&session);
            let source_dir = source_dir.clone();
            let pending = task.clone();
            let handle =
                tokio::spawn(async move { fetch_file(&session, task, &source_dir).await });
            (pending, handle)
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for (task, handle) in handles {
        let report = match handle.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(url = %task.url, "fetch task did not complete: {e}");
                FileReport {
                    task,
                    destination: None,
                    outcome: FileOutcome::Failed(FetchError::Task(e.to_string())),
                }
            }
        };
        reports.push(report);
    }

    let failed = reports.iter().filter(|r| r.error().is_some()).count();
    tracing::info!(
        manifest = %path.display(),
        files = reports.len(),
        failed,
        "manifest finished"
    );

    ManifestReport {
        manifest: path,
        outcome: ManifestOutcome::Processed(reports),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryTransport;
    use std::fs;

    fn write_manifest(dir: &std::path::Path, name: &str, json: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, json).unwrap();
        path
    }

    #[tokio::test]
    async fn bad_url_does_not_stop_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            "m.json",
            r#"{"files":[
                {"url":"http://h/missing","filename":"bad.bin"},
                {"url":"http://h/good","filename":"good.bin"}
            ]}"#,
        );
        let transport = Arc::new(MemoryTransport::new().with_body("http://h/good", b"ok"));
        let session = Arc::new(Session::new(transport, 8));

        let report = process_manifest(session, path).await;

        let files = report.files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].task.filename, "bad.bin");
        assert!(files[0].error().is_some());
        assert!(files[1].is_downloaded());
        assert_eq!(fs::read(dir.path().join("good.bin")).unwrap(), b"ok");
        assert!(!dir.path().join("bad.bin").exists());
    }

    #[tokio::test]
    async fn empty_manifests_are_noop_successes() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MemoryTransport::new());
        let session = Arc::new(Session::new(transport.clone(), 8));

        for (name, json) in [("a.json", r#"{"files":[]}"#), ("b.json", r#"{"other":1}"#)] {
            let path = write_manifest(dir.path(), name, json);
            let report = process_manifest(Arc::clone(&session), path).await;
            assert!(!report.is_failed());
            assert!(report.files().is_empty());
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_manifest_is_a_manifest_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "m.json", "{ not json");
        let (tx, mut rx) = tokio::sync::mpsc::channel(4);
        let session = Arc::new(Session::new(Arc::new(MemoryTransport::new()), 8).with_events(tx));

        let report = process_manifest(session, path.clone()).await;

        assert!(matches!(
            report.outcome,
            ManifestOutcome::Failed(ManifestError::Parse { .. })
        ));
        assert!(matches!(
            rx.recv().await,
            Some(FetchEvent::ManifestFailed { manifest, .. }) if manifest == path
        ));
    }

    #[tokio::test]
    async fn reports_keep_manifest_order() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            MemoryTransport::new()
                .with_body("http://h/1", b"1")
                .with_body("http://h/2", b"2")
                .with_body("http://h/3", b"3"),
        );
        let session = Arc::new(Session::new(transport, 1));
        let manifest = ResourceManifest::from_slice(
            &dir.path().join("m.json"),
            br#"{"files":[
                {"url":"http://h/3","filename":"c"},
                {"url":"http://h/1","filename":"a"},
                {"url":"http://h/2","filename":"b"}
            ]}"#,
        )
        .unwrap();

        let report = process_loaded(session, manifest).await;
        let names: Vec<_> = report.files().iter().map(|r| r.task.filename.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert!(report.files().iter().all(|r| r.is_downloaded()));
    }
}
