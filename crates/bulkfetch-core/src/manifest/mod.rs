//! Manifest loading.
//!
//! A manifest is a JSON file listing remote resources to fetch into the
//! directory that contains the manifest:
//!
//! ```json
//! { "files": [ { "url": "https://host/a.zip", "filename": "a.zip", "unzip": true } ] }
//! ```

mod parse;
mod path;

pub use path::{resolve_destination, UnsafeFilename};

use std::io;
use std::path::{Path, PathBuf};

use parse::RawManifest;

/// One unit of download work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub url: String,
    /// Destination, relative to the owning manifest's `source_dir`.
    pub filename: String,
    /// Extract after download when the filename is a recognised archive.
    pub should_extract: bool,
}

/// The parsed contents of one manifest file.
#[derive(Debug, Clone)]
pub struct ResourceManifest {
    /// The manifest file itself.
    pub path: PathBuf,
    /// Directory that relative filenames (and extracted archives) resolve against.
    pub source_dir: PathBuf,
    pub entries: Vec<FileTask>,
}

/// Manifest-level failure: the file could not be read or decoded.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed manifest {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The task processing this manifest panicked.
    #[error("processing {} did not complete: {reason}", .path.display())]
    Interrupted { path: PathBuf, reason: String },
}

/// Directory containing `manifest_path`; `.` for a bare file name.
pub fn source_dir_of(manifest_path: &Path) -> PathBuf {
    match manifest_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

impl ResourceManifest {
    /// Decode manifest JSON that was read from `path`.
    pub fn from_slice(path: &Path, data: &[u8]) -> Result<Self, ManifestError> {
        let raw: RawManifest = serde_json::from_slice(data).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let entries = raw
            .files
            .unwrap_or_default()
            .into_iter()
            .map(|e| FileTask {
                url: e.url,
                filename: e.filename,
                should_extract: e.unzip,
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            source_dir: source_dir_of(path),
            entries,
        })
    }

    /// Read and decode the manifest at `path`.
    pub async fn load(path: &Path) -> Result<Self, ManifestError> {
        let data = tokio::fs::read(path).await.map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(path, &data)
    }
}
