//! Per-host admission control.
//!
//! One `HostLimiter` lives in the run's `Session`. Every transfer acquires a
//! permit for its URL's `(scheme, host, port)` before connecting, so at most
//! `per_host` requests are in flight to any one origin while requests to
//! different origins proceed independently. This is deliberately not a global
//! cap.

mod key;

pub use key::{HostKey, HostKeyError};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Lazily creates one semaphore per host, each with `per_host` permits.
#[derive(Debug)]
pub struct HostLimiter {
    per_host: usize,
    hosts: Mutex<HashMap<HostKey, Arc<Semaphore>>>,
}

impl HostLimiter {
    /// `per_host` is clamped to at least 1.
    pub fn new(per_host: usize) -> Self {
        Self {
            per_host: per_host.max(1),
            hosts: Mutex::new(HashMap::new()),
        }
    }

    pub fn per_host(&self) -> usize {
        self.per_host
    }

    fn semaphore_for(&self, key: &HostKey) -> Arc<Semaphore> {
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            hosts
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Semaphore::new(self.per_host))),
        )
    }

    /// Wait for a connection slot on `key`'s host. The slot is released when
    /// the returned permit is dropped.
    pub async fn acquire(&self, key: &HostKey) -> OwnedSemaphorePermit {
        let semaphore = self.semaphore_for(key);
        if semaphore.available_permits() == 0 {
            tracing::debug!(host = %key, limit = self.per_host, "waiting for host connection slot");
        }
        // The semaphore is never closed, so acquisition cannot fail.
        match semaphore.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => unreachable!("host semaphore closed"),
        }
    }

    /// Slots currently free on `key`'s host (`per_host` for an unseen host).
    pub fn available(&self, key: &HostKey) -> usize {
        let hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        hosts
            .get(key)
            .map(|s| s.available_permits())
            .unwrap_or(self.per_host)
    }
}
