//! Fetch Unit: one FileTask → one destination path.
//!
//! State machine per task:
//! resolve destination → claim it → skip if already present → wait for a
//! host slot → stream to `.part` → rename into place → extract if requested.
//!
//! The destination is only ever created by the final rename, so a failed or
//! interrupted transfer cannot leave a file that a later run would mistake
//! for a completed download.

mod outcome;

pub use outcome::{FetchError, FileOutcome, FileReport};

use std::io;
use std::path::Path;

use crate::events::FetchEvent;
use crate::extract::{self, Extracted};
use crate::host_limit::HostKey;
use crate::manifest::{resolve_destination, FileTask};
use crate::session::Session;
use crate::storage::PartFile;
use crate::transport::TransferError;

/// Run one FileTask to completion. Never panics on I/O or network failure;
/// every failure is reported in the returned `FileReport`.
pub async fn fetch_file(session: &Session, task: FileTask, source_dir: &Path) -> FileReport {
    let (destination, outcome) = match resolve_destination(source_dir, &task.filename) {
        Ok(dest) => {
            let outcome = fetch_to(session, &task, source_dir, &dest).await;
            (Some(dest), outcome)
        }
        Err(e) => (None, FileOutcome::Failed(e.into())),
    };

    if let FileOutcome::Failed(err) = &outcome {
        tracing::warn!(url = %task.url, filename = %task.filename, "fetch failed: {err}");
        session
            .emit(FetchEvent::Failed {
                url: task.url.clone(),
                destination: destination.clone(),
                error: err.to_string(),
            })
            .await;
    }

    FileReport {
        task,
        destination,
        outcome,
    }
}

async fn fetch_to(
    session: &Session,
    task: &FileTask,
    source_dir: &Path,
    destination: &Path,
) -> FileOutcome {
    if !session.claim_destination(destination) {
        return FileOutcome::Failed(FetchError::DuplicateDestination(destination.to_path_buf()));
    }

    if is_regular_file(destination).await {
        tracing::info!(path = %destination.display(), "already present, skipping");
        session
            .emit(FetchEvent::Skipped {
                destination: destination.to_path_buf(),
            })
            .await;
        return FileOutcome::Skipped;
    }

    let host = match HostKey::from_url(&task.url) {
        Ok(h) => h,
        Err(e) => return FileOutcome::Failed(e.into()),
    };

    let _file_slot = session.acquire_file_slot().await;
    let bytes = {
        let _host_slot = session.limiter().acquire(&host).await;
        if session.control().is_aborted() {
            return FileOutcome::Failed(FetchError::Aborted);
        }
        tracing::debug!(url = %task.url, host = %host, "starting transfer");
        session
            .emit(FetchEvent::Started {
                url: task.url.clone(),
                destination: destination.to_path_buf(),
            })
            .await;
        match transfer(session, &task.url, destination).await {
            Ok(n) => n,
            Err(e) => return FileOutcome::Failed(e),
        }
    };

    tracing::info!(path = %destination.display(), bytes, "downloaded");
    session
        .emit(FetchEvent::Downloaded {
            destination: destination.to_path_buf(),
            bytes,
        })
        .await;

    if !task.should_extract {
        return FileOutcome::Downloaded {
            bytes,
            extracted: None,
        };
    }
    if !extract::is_archive(&task.filename) {
        tracing::debug!(filename = %task.filename, "unzip requested for a non-archive, ignoring");
        return FileOutcome::Downloaded {
            bytes,
            extracted: None,
        };
    }

    match extract_into(destination, source_dir, bytes).await {
        Ok(extracted) => {
            session
                .emit(FetchEvent::Extracted {
                    archive: destination.to_path_buf(),
                    files: extracted.files,
                })
                .await;
            FileOutcome::Downloaded {
                bytes,
                extracted: Some(extracted),
            }
        }
        Err(e) => FileOutcome::Failed(e),
    }
}

async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Stream `url` into `<destination>.part` on the blocking pool and rename it
/// into place. On any error the `.part` file is removed.
async fn transfer(session: &Session, url: &str, destination: &Path) -> Result<u64, FetchError> {
    let transport = session.transport();
    let control = session.control().clone();
    let chunk_size = session.chunk_size();
    let url = url.to_string();
    let destination = destination.to_path_buf();

    let result = tokio::task::spawn_blocking(move || -> Result<u64, TransferError> {
        let mut part = PartFile::create(&destination, chunk_size).map_err(TransferError::Storage)?;
        let got = transport.get(&url, &control, &mut |chunk: &[u8]| {
            if control.is_aborted() {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "run aborted"));
            }
            part.write_chunk(chunk)
        });
        match got {
            Ok(()) => part.finalize().map_err(TransferError::Storage),
            Err(e) => {
                tracing::debug!(
                    path = %part.temp_path().display(),
                    written = part.bytes_written(),
                    "discarding partial download"
                );
                part.discard();
                Err(e)
            }
        }
    })
    .await
    .map_err(|e| FetchError::Task(e.to_string()))?;

    result.map_err(FetchError::from)
}

async fn extract_into(archive: &Path, dest_dir: &Path, bytes: u64) -> Result<Extracted, FetchError> {
    let archive = archive.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();
    tokio::task::spawn_blocking(move || extract::extract_archive(&archive, &dest_dir))
        .await
        .map_err(|e| FetchError::Task(e.to_string()))?
        .map_err(|source| FetchError::Extraction { bytes, source })
}
