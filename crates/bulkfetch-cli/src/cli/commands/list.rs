//! `bulkfetch list` – show every manifest entry and its on-disk state.

use anyhow::{Context, Result};
use bulkfetch_core::config::FetchConfig;
use bulkfetch_core::discovery;
use bulkfetch_core::manifest::{resolve_destination, FileTask, ResourceManifest};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Destination exists as a regular file; a run would skip it.
    Present,
    Missing,
    /// Filename would escape the manifest directory.
    Invalid,
}

impl EntryState {
    fn as_str(self) -> &'static str {
        match self {
            EntryState::Present => "present",
            EntryState::Missing => "missing",
            EntryState::Invalid => "invalid",
        }
    }
}

pub(crate) fn entry_state(source_dir: &Path, task: &FileTask) -> EntryState {
    match resolve_destination(source_dir, &task.filename) {
        Ok(dest) if dest.is_file() => EntryState::Present,
        Ok(_) => EntryState::Missing,
        Err(_) => EntryState::Invalid,
    }
}

pub async fn run_list(cfg: &FetchConfig, root: &Path) -> Result<i32> {
    let manifests = {
        let root = root.to_path_buf();
        let suffix = cfg.manifest_suffix.clone();
        tokio::task::spawn_blocking(move || discovery::discover_manifests(&root, &suffix))
            .await
            .context("discovery task failed")?
    }
    .with_context(|| format!("cannot scan resource tree {}", root.display()))?;
    if manifests.is_empty() {
        println!("No manifests found under {}.", root.display());
        return Ok(0);
    }

    let mut missing = 0usize;
    for path in manifests {
        let manifest = match ResourceManifest::load(&path).await {
            Ok(m) => m,
            Err(e) => {
                println!("{}: {}", path.display(), e);
                continue;
            }
        };
        println!("{}", path.display());
        if manifest.entries.is_empty() {
            println!("  (no files)");
            continue;
        }
        println!("  {:<8} {:<6} {:<32} {}", "STATE", "UNZIP", "FILE", "URL");
        for task in &manifest.entries {
            let state = entry_state(&manifest.source_dir, task);
            if state == EntryState::Missing {
                missing += 1;
            }
            println!(
                "  {:<8} {:<6} {:<32} {}",
                state.as_str(),
                if task.should_extract { "yes" } else { "no" },
                task.filename,
                task.url
            );
        }
    }
    println!("{missing} file(s) missing");
    Ok(0)
}
