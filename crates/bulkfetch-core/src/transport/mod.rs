//! HTTP transport seam.
//!
//! The Fetch Unit talks to the network only through `Transport`, a blocking
//! streaming GET that is run on the tokio blocking pool. Production uses
//! `CurlTransport`; tests substitute in-memory transports. Connection
//! limiting is not the transport's job: the `Session`'s `HostLimiter` admits
//! requests before they reach it.

mod curl;

pub use self::curl::CurlTransport;

use std::io;

use crate::control::RunControl;

/// Receives body bytes in order. Returning an error aborts the transfer.
pub type ChunkSink<'a> = dyn FnMut(&[u8]) -> io::Result<()> + 'a;

/// A blocking, streaming HTTP GET.
pub trait Transport: Send + Sync {
    /// Fetch `url` and feed the response body to `sink` chunk by chunk.
    /// A non-2xx final status is an error, and no error body is passed to `sink`.
    /// Implementations should give up with `Aborted` soon after `control` is
    /// aborted, even while no bytes arrive.
    fn get(
        &self,
        url: &str,
        control: &RunControl,
        sink: &mut ChunkSink<'_>,
    ) -> Result<(), TransferError>;
}

/// Why a single transfer failed.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// libcurl reported an error (connect, timeout, truncated body, ...).
    #[error("{0}")]
    Curl(#[from] ::curl::Error),
    /// Final response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing the body to disk failed.
    #[error("storage: {0}")]
    Storage(#[source] io::Error),
    /// The run was cancelled while this transfer was in flight.
    #[error("transfer aborted")]
    Aborted,
    /// Failure reported by a non-curl transport.
    #[error("{0}")]
    Other(String),
}

impl TransferError {
    /// Classify an error returned by a `ChunkSink`. `Interrupted` means the
    /// sink stopped because the run was aborted.
    pub fn from_sink(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::Interrupted {
            TransferError::Aborted
        } else {
            TransferError::Storage(err)
        }
    }
}
