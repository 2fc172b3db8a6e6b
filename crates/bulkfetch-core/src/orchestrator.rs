//! Discovery & Orchestrator: resource tree → concurrent Manifest Processors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::discovery::{self, DiscoveryError};
use crate::manifest::ManifestError;
use crate::processor::{process_manifest, ManifestOutcome, ManifestReport};
use crate::session::Session;

/// How a run ended. Only discovery failures abort a run; everything else is
/// reported per manifest and per file.
#[derive(Debug)]
pub enum RunOutcome {
    /// Discovery found no manifests; nothing was attempted.
    NoManifests,
    Completed(RunSummary),
}

impl RunOutcome {
    pub fn counts(&self) -> FetchCounts {
        match self {
            RunOutcome::NoManifests => FetchCounts::default(),
            RunOutcome::Completed(summary) => summary.counts(),
        }
    }
}

/// Per-manifest reports, in discovery order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub manifests: Vec<ManifestReport>,
}

/// Aggregate counters across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchCounts {
    pub manifests: usize,
    pub manifest_failures: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl FetchCounts {
    pub fn files(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }

    pub fn is_clean(&self) -> bool {
        self.manifest_failures == 0 && self.failed == 0
    }
}

impl RunSummary {
    pub fn counts(&self) -> FetchCounts {
        let mut counts = FetchCounts {
            manifests: self.manifests.len(),
            ..FetchCounts::default()
        };
        for report in &self.manifests {
            if let ManifestOutcome::Failed(_) = report.outcome {
                counts.manifest_failures += 1;
                continue;
            }
            for file in report.files() {
                if file.is_skipped() {
                    counts.skipped += 1;
                } else if file.is_downloaded() {
                    counts.downloaded += 1;
                } else {
                    counts.failed += 1;
                }
            }
        }
        counts
    }
}

/// Discover manifests under `root` and process all of them concurrently.
///
/// Returns `Err` only when the tree cannot be walked.
pub async fn run(session: Arc<Session>, root: &Path) -> Result<RunOutcome, DiscoveryError> {
    let manifests = {
        let root = root.to_path_buf();
        let suffix = session.manifest_suffix().to_string();
        tokio::task::spawn_blocking(move || discovery::discover_manifests(&root, &suffix))
            .await
            .map_err(|e| DiscoveryError::Task(e.to_string()))??
    };

    if manifests.is_empty() {
        tracing::info!(root = %root.display(), "no manifests found");
        return Ok(RunOutcome::NoManifests);
    }
    tracing::info!(root = %root.display(), manifests = manifests.len(), "starting run");

    let summary = run_manifests(session, manifests).await;
    let counts = summary.counts();
    tracing::info!(
        downloaded = counts.downloaded,
        skipped = counts.skipped,
        failed = counts.failed,
        manifest_failures = counts.manifest_failures,
        "run finished"
    );
    Ok(RunOutcome::Completed(summary))
}

/// Process the given manifests concurrently, one task each, and wait for all.
pub async fn run_manifests(session: Arc<Session>, manifests: Vec<PathBuf>) -> RunSummary {
    let handles: Vec<_> = manifests
        .into_iter()
        .map(|path| {
            let session = Arc::clone(&session);
            let handle = tokio::spawn(process_manifest(session, path.clone()));
            (path, handle)
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        match handle.await {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!(manifest = %path.display(), "manifest task did not complete: {e}");
                reports.push(ManifestReport {
                    manifest: path.clone(),
                    outcome: ManifestOutcome::Failed(ManifestError::Interrupted {
                        path,
                        reason: e.to_string(),
                    }),
                });
            }
        }
    }
    RunSummary { manifests: reports }
}
