//! Run-wide cancellation.
//!
//! A `RunControl` is shared by every task in a run. Requesting abort (e.g. on
//! Ctrl-C) makes in-flight transfers stop at their next chunk and makes Fetch
//! Units that have not started yet fail fast.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort token for one run. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    aborted: Arc<AtomicBool>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal every task of this run to stop.
    pub fn request_abort(&self) {
        if !self.aborted.swap(true, Ordering::SeqCst) {
            tracing::warn!("abort requested; stopping in-flight transfers");
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }
}
