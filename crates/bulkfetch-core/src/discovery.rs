//! Manifest discovery: recursive walk for files whose name ends with a suffix.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Fatal to the run: the tree could not be walked.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("resource root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("failed to walk resource tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("discovery task failed: {0}")]
    Task(String),
}

/// True when `name` ends with `suffix`, ignoring ASCII case.
pub fn matches_suffix(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// Recursively collects files under `root` whose file name ends with `suffix`
/// (case-insensitive). Results are sorted so runs report in a stable order.
///
/// Symlinked directories are not descended into, so link cycles cannot stall
/// or fail the walk. Symlinks to regular files are accepted as manifests.
///
/// Blocking; call from `spawn_blocking` if used from async code.
pub fn discover_manifests(root: &Path, suffix: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }
        // Non-UTF-8 names still match on their readable suffix.
        if matches_suffix(&entry.file_name().to_string_lossy(), suffix) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    tracing::debug!(root = %root.display(), count = found.len(), "manifest discovery finished");
    Ok(found)
}
