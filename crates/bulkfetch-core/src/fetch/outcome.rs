use std::path::PathBuf;

use crate::extract::{ExtractError, Extracted};
use crate::host_limit::HostKeyError;
use crate::manifest::{FileTask, UnsafeFilename};
use crate::transport::TransferError;

/// Why one FileTask did not end up downloaded.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("refusing filename: {0}")]
    UnsafeFilename(#[from] UnsafeFilename),
    #[error("destination {} is already targeted by another entry in this run", .0.display())]
    DuplicateDestination(PathBuf),
    #[error(transparent)]
    InvalidUrl(#[from] HostKeyError),
    #[error("download failed: {0}")]
    Transfer(#[from] TransferError),
    /// The archive was downloaded and kept on disk, but extracting it failed.
    /// A later run sees the archive and does not retry extraction.
    #[error("downloaded {bytes} bytes but extraction failed: {source}")]
    Extraction {
        bytes: u64,
        #[source]
        source: ExtractError,
    },
    #[error("run aborted before the transfer started")]
    Aborted,
    #[error("fetch task failed: {0}")]
    Task(String),
}

#[derive(Debug)]
pub enum FileOutcome {
    /// A regular file was already at the destination; nothing was requested.
    Skipped,
    /// The destination now holds the complete body. `extracted` is set when an
    /// archive was extracted.
    Downloaded {
        bytes: u64,
        extracted: Option<Extracted>,
    },
    Failed(FetchError),
}

/// Result of one Fetch Unit invocation.
#[derive(Debug)]
pub struct FileReport {
    pub task: FileTask,
    /// Resolved destination; `None` when the filename was refused.
    pub destination: Option<PathBuf>,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, FileOutcome::Skipped)
    }

    pub fn is_downloaded(&self) -> bool {
        matches!(self.outcome, FileOutcome::Downloaded { .. })
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.outcome {
            FileOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}
