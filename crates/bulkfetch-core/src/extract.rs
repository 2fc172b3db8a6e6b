//! Archive extraction after download.
//!
//! Only ZIP is recognised. Entries are written under the manifest's directory;
//! entries whose names would escape it are skipped.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Extensions (lowercase, without the dot) treated as extractable archives.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip"];

/// True when `filename` ends in a recognised archive extension (any case).
pub fn is_archive(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ARCHIVE_EXTENSIONS.iter().any(|a| e.eq_ignore_ascii_case(a)))
        .unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("extracting {}: {source}", .archive.display())]
    Io {
        archive: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt archive {}: {source}", .archive.display())]
    Zip {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// What an extraction produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Regular files written.
    pub files: usize,
    /// Entries refused because their path was absolute or contained `..`.
    pub skipped_unsafe: usize,
}

/// Extract every entry of the ZIP at `archive` into `dest_dir`, overwriting
/// existing files.
///
/// Blocking; call from `spawn_blocking` if used from async code.
pub fn extract_archive(archive: &Path, dest_dir: &Path) -> Result<Extracted, ExtractError> {
    let io_err = |source: io::Error| ExtractError::Io {
        archive: archive.to_path_buf(),
        source,
    };
    let zip_err = |source: zip::result::ZipError| ExtractError::Zip {
        archive: archive.to_path_buf(),
        source,
    };

    let file = File::open(archive).map_err(io_err)?;
    let mut zip = zip::ZipArchive::new(file).map_err(zip_err)?;
    let mut out = Extracted::default();

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(zip_err)?;
        let target = match entry.enclosed_name() {
            Some(name) => dest_dir.join(name),
            None => {
                tracing::warn!(
                    archive = %archive.display(),
                    entry = entry.name(),
                    "skipping archive entry with unsafe path"
                );
                out.skipped_unsafe += 1;
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(io_err)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut outfile = File::create(&target).map_err(io_err)?;
        io::copy(&mut entry, &mut outfile).map_err(io_err)?;
        out.files += 1;
    }

    tracing::debug!(
        archive = %archive.display(),
        files = out.files,
        "archive extracted"
    );
    Ok(out)
}
