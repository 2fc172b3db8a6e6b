//! Progress notifications sent from the engine to whoever renders them.

use std::path::PathBuf;

/// One human-facing progress notification. Informational only; the
/// structured reports returned by the orchestrator are the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// Destination already present; no request issued.
    Skipped { destination: PathBuf },
    /// Transfer admitted and starting.
    Started { url: String, destination: PathBuf },
    Downloaded { destination: PathBuf, bytes: u64 },
    Extracted { archive: PathBuf, files: usize },
    Failed {
        url: String,
        destination: Option<PathBuf>,
        error: String,
    },
    ManifestFailed { manifest: PathBuf, error: String },
}

pub type EventSender = tokio::sync::mpsc::Sender<FetchEvent>;
