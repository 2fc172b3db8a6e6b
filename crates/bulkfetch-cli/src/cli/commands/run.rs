//! `bulkfetch run` – discover manifests and fetch everything that is missing.

use anyhow::{Context, Result};
use bulkfetch_core::config::FetchConfig;
use bulkfetch_core::control::RunControl;
use bulkfetch_core::events::FetchEvent;
use bulkfetch_core::orchestrator::{self, FetchCounts, RunOutcome};
use bulkfetch_core::Session;
use std::path::Path;
use std::sync::Arc;

/// At least one manifest could not be read or parsed.
pub const EXIT_MANIFEST_FAILURE: i32 = 2;
/// Every manifest loaded but at least one file failed.
pub const EXIT_FILE_FAILURE: i32 = 3;
/// Second Ctrl-C: leave without waiting for transfers to wind down.
const EXIT_INTERRUPTED: i32 = 130;

pub async fn run_fetch(cfg: &FetchConfig, root: &Path) -> Result<i32> {
    let control = RunControl::new();
    let signal_control = control.clone();
    let signal_handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        signal_control.request_abort();
        eprintln!("Stopping; press Ctrl-C again to exit immediately.");
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(EXIT_INTERRUPTED);
        }
    });

    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel::<FetchEvent>(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            println!("{}", format_event(&event));
        }
    });

    let session = Arc::new(
        Session::from_config(cfg)
            .with_events(event_tx)
            .with_control(control.clone()),
    );
    tracing::info!(root = %root.display(), ?session, "run starting");

    let outcome = orchestrator::run(session, root).await;
    // The session (and with it the last event sender) is gone once run returns.
    let _ = printer.await;
    signal_handle.abort();

    let outcome =
        outcome.with_context(|| format!("cannot scan resource tree {}", root.display()))?;
    if let RunOutcome::NoManifests = outcome {
        println!("No manifests found under {}.", root.display());
        return Ok(0);
    }

    let counts = outcome.counts();
    println!(
        "{} manifest(s): {} downloaded, {} already present, {} failed",
        counts.manifests, counts.downloaded, counts.skipped, counts.failed
    );
    if counts.manifest_failures > 0 {
        println!("{} manifest(s) could not be read", counts.manifest_failures);
    }
    if control.is_aborted() {
        println!("Interrupted; rerun to fetch the remaining files.");
    }
    Ok(exit_code(&counts))
}

pub(crate) fn exit_code(counts: &FetchCounts) -> i32 {
    if counts.manifest_failures > 0 {
        EXIT_MANIFEST_FAILURE
    } else if counts.failed > 0 {
        EXIT_FILE_FAILURE
    } else {
        0
    }
}

/// One stdout line per event.
pub(crate) fn format_event(event: &FetchEvent) -> String {
    match event {
        FetchEvent::Skipped { destination } => {
            format!("Already present: {}", destination.display())
        }
        FetchEvent::Started { url, .. } => format!("Downloading: {url}"),
        FetchEvent::Downloaded { destination, bytes } => {
            format!("Downloaded: {} ({} bytes)", destination.display(), bytes)
        }
        FetchEvent::Extracted { archive, files } => {
            format!("Extracted: {} ({} files)", archive.display(), files)
        }
        FetchEvent::Failed { url, error, .. } => format!("Failed: {url}: {error}"),
        FetchEvent::ManifestFailed { manifest, error } => {
            format!("Skipping manifest {}: {}", manifest.display(), error)
        }
    }
}
