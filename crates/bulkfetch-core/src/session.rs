//! Process-scoped run context.
//!
//! A `Session` is built once per run and shared (`Arc`) by every Manifest
//! Processor and Fetch Unit. It owns the transport, the per-host connection
//! limiter, the optional global file-task cap, the set of destinations
//! claimed so far, the abort token and the progress channel.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::{FetchConfig, CHUNK_SIZE, DEFAULT_MANIFEST_SUFFIX};
use crate::control::RunControl;
use crate::events::{EventSender, FetchEvent};
use crate::host_limit::HostLimiter;
use crate::transport::{CurlTransport, Transport};

pub struct Session {
    transport: Arc<dyn Transport>,
    limiter: HostLimiter,
    file_slots: Option<Arc<Semaphore>>,
    claimed: Mutex<HashSet<PathBuf>>,
    control: RunControl,
    events: Option<EventSender>,
    chunk_size: usize,
    manifest_suffix: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("per_host", &self.limiter.per_host())
            .field("file_slots", &self.file_slots.as_ref().map(|s| s.available_permits()))
            .field("chunk_size", &self.chunk_size)
            .field("manifest_suffix", &self.manifest_suffix)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session over an arbitrary transport with `per_host` in-flight transfers per origin.
    pub fn new(transport: Arc<dyn Transport>, per_host: usize) -> Self {
        Self {
            transport,
            limiter: HostLimiter::new(per_host),
            file_slots: None,
            claimed: Mutex::new(HashSet::new()),
            control: RunControl::new(),
            events: None,
            chunk_size: CHUNK_SIZE,
            manifest_suffix: DEFAULT_MANIFEST_SUFFIX.to_string(),
        }
    }

    /// Production session: curl transport configured from `cfg`.
    pub fn from_config(cfg: &FetchConfig) -> Self {
        let transport = Arc::new(CurlTransport::new(cfg.http()));
        Self::new(transport, cfg.max_connections_per_host)
            .with_max_concurrent_files(cfg.max_concurrent_files)
            .with_chunk_size(cfg.chunk_size())
            .with_manifest_suffix(&cfg.manifest_suffix)
    }

    /// Cap the number of Fetch Units past the existence check at once (None = unbounded).
    pub fn with_max_concurrent_files(mut self, max: Option<usize>) -> Self {
        self.file_slots = max.map(|n| Arc::new(Semaphore::new(n.max(1))));
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_manifest_suffix(mut self, suffix: &str) -> Self {
        self.manifest_suffix = suffix.to_string();
        self
    }

    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    pub fn limiter(&self) -> &HostLimiter {
        &self.limiter
    }

    pub fn control(&self) -> &RunControl {
        &self.control
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn manifest_suffix(&self) -> &str {
        &self.manifest_suffix
    }

    /// Record `destination` as owned by the calling task. Returns false if
    /// another task in this run already claimed it.
    pub(crate) fn claim_destination(&self, destination: &Path) -> bool {
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        claimed.insert(destination.to_path_buf())
    }

    /// Wait for a global file slot when a cap is configured.
    pub(crate) async fn acquire_file_slot(&self) -> Option<OwnedSemaphorePermit> {
        let slots = self.file_slots.as_ref()?;
        Arc::clone(slots).acquire_owned().await.ok()
    }

    pub(crate) async fn emit(&self, event: FetchEvent) {
        if let Some(tx) = &self.events {
            // A closed receiver only means nobody is rendering progress.
            let _ = tx.send(event).await;
        }
    }
}
