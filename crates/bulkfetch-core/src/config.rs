use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default per-host limit on in-flight transfers.
pub const DEFAULT_MAX_CONNECTIONS_PER_HOST: usize = 8;

/// Default manifest file-name suffix (matched case-insensitively).
pub const DEFAULT_MANIFEST_SUFFIX: &str = ".json";

/// Default size of the write buffer between the transport and the `.part` file.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Transfer timeouts and redirect policy (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Seconds allowed for the TCP/TLS connect phase.
    pub connect_timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/s for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    /// Hard wall-clock limit for a single transfer.
    pub timeout_secs: u64,
    pub max_redirections: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            timeout_secs: 3600,
            max_redirections: 10,
        }
    }
}

/// Global configuration loaded from `~/.config/bulkfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum in-flight transfers per `(scheme, host, port)`. Not a global cap.
    pub max_connections_per_host: usize,
    /// Optional cap on file tasks in flight across the whole run (None = unbounded).
    #[serde(default)]
    pub max_concurrent_files: Option<usize>,
    /// File-name suffix identifying manifests, compared case-insensitively.
    #[serde(default = "default_manifest_suffix")]
    pub manifest_suffix: String,
    /// Root directory to scan when none is given on the command line.
    #[serde(default)]
    pub resources_dir: Option<PathBuf>,
    /// Write buffer size in bytes (None = `CHUNK_SIZE`).
    #[serde(default)]
    pub chunk_size_bytes: Option<usize>,
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

fn default_manifest_suffix() -> String {
    DEFAULT_MANIFEST_SUFFIX.to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_connections_per_host: DEFAULT_MAX_CONNECTIONS_PER_HOST,
            max_concurrent_files: None,
            manifest_suffix: default_manifest_suffix(),
            resources_dir: None,
            chunk_size_bytes: None,
            http: None,
        }
    }
}

impl FetchConfig {
    /// Effective write buffer size; zero is treated as unset.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size_bytes.filter(|n| *n > 0).unwrap_or(CHUNK_SIZE)
    }

    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bulkfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit file. The file must exist.
pub fn load_from_path(path: &Path) -> Result<FetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let cfg: FetchConfig = toml::from_str(&data)
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(cfg)
}

/// Fallback root when neither the command line nor the config names one:
/// `resources/` next to the directory holding the executable.
pub fn default_resources_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate current executable")?;
    let exe_dir = exe
        .parent()
        .ok_or_else(|| anyhow::anyhow!("executable has no parent directory"))?;
    Ok(exe_dir.join("..").join("resources"))
}
