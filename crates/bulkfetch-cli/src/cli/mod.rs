//! CLI for bulkfetch.

mod commands;

use anyhow::Result;
use bulkfetch_core::config::{self, FetchConfig};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use commands::{run_fetch, run_list};

/// Top-level CLI. Without a subcommand, `bulkfetch [ROOT]` behaves like `bulkfetch run [ROOT]`.
#[derive(Debug, Parser)]
#[command(name = "bulkfetch")]
#[command(about = "Fetch every file listed in the JSON manifests under a resource tree", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct RunArgs {
    /// Resource tree to scan (default: config `resources_dir`, else `<exe dir>/../resources`).
    pub root: Option<PathBuf>,

    /// Use this config file instead of the XDG default.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum in-flight transfers per host.
    #[arg(long, value_name = "N")]
    pub per_host: Option<usize>,

    /// Maximum file tasks in flight across the whole run (default: unbounded).
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Manifest file-name suffix, matched case-insensitively.
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Discover manifests and download every missing file (the default).
    Run(RunArgs),

    /// Show each manifest entry and whether it is already on disk. No network access.
    List {
        /// Resource tree to scan.
        root: Option<PathBuf>,

        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        #[arg(long, value_name = "SUFFIX")]
        suffix: Option<String>,
    },
}

impl Cli {
    /// The command to execute, with the bare form mapped to `run`.
    pub fn into_command(self) -> CliCommand {
        self.command.unwrap_or(CliCommand::Run(self.run))
    }
}

impl CliCommand {
    /// Parse arguments, execute, and return the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        match Cli::parse().into_command() {
            CliCommand::Run(args) => {
                let mut cfg = load_config(args.config.as_deref())?;
                apply_overrides(&mut cfg, &args);
                tracing::debug!("effective config: {:?}", cfg);
                let root = resolve_root(args.root, &cfg)?;
                run_fetch(&cfg, &root).await
            }
            CliCommand::List {
                root,
                config,
                suffix,
            } => {
                let mut cfg = load_config(config.as_deref())?;
                if let Some(suffix) = suffix {
                    cfg.manifest_suffix = suffix;
                }
                let root = resolve_root(root, &cfg)?;
                run_list(&cfg, &root).await
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<FetchConfig> {
    match path {
        Some(path) => config::load_from_path(path),
        None => config::load_or_init(),
    }
}

/// Command-line flags win over the config file.
pub(crate) fn apply_overrides(cfg: &mut FetchConfig, args: &RunArgs) {
    if let Some(n) = args.per_host {
        cfg.max_connections_per_host = n;
    }
    if let Some(n) = args.max_files {
        cfg.max_concurrent_files = Some(n);
    }
    if let Some(suffix) = &args.suffix {
        cfg.manifest_suffix = suffix.clone();
    }
}

/// Root precedence: command line, then config, then `<exe dir>/../resources`.
pub(crate) fn resolve_root(arg: Option<PathBuf>, cfg: &FetchConfig) -> Result<PathBuf> {
    if let Some(root) = arg.or_else(|| cfg.resources_dir.clone()) {
        return Ok(root);
    }
    config::default_resources_dir()
}

#[cfg(test)]
mod tests;
