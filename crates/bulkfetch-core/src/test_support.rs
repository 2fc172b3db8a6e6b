//! In-memory transport and fixtures shared by unit tests.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::control::RunControl;
use crate::transport::{ChunkSink, TransferError, Transport};

enum Response {
    Body(Vec<u8>),
    /// Send the first `n` bytes of the body, then fail as if the peer hung up.
    Truncated(Vec<u8>, usize),
    Status(u32),
}

/// Serves canned responses keyed by exact URL; anything else is a 404.
pub(crate) struct MemoryTransport {
    responses: HashMap<String, Response>,
    chunk: usize,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            chunk: 4,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_body(mut self, url: &str, body: &[u8]) -> Self {
        self.responses
            .insert(url.to_string(), Response::Body(body.to_vec()));
        self
    }

    pub fn with_truncated(mut self, url: &str, body: &[u8], after: usize) -> Self {
        self.responses
            .insert(url.to_string(), Response::Truncated(body.to_vec(), after));
        self
    }

    pub fn with_status(mut self, url: &str, status: u32) -> Self {
        self.responses.insert(url.to_string(), Response::Status(status));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Transport for MemoryTransport {
    fn get(
        &self,
        url: &str,
        _control: &RunControl,
        sink: &mut ChunkSink<'_>,
    ) -> Result<(), TransferError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Response::Body(body)) => {
                for chunk in body.chunks(self.chunk) {
                    sink(chunk).map_err(TransferError::from_sink)?;
                }
                Ok(())
            }
            Some(Response::Truncated(body, after)) => {
                for chunk in body[..*after].chunks(self.chunk) {
                    sink(chunk).map_err(TransferError::from_sink)?;
                }
                Err(TransferError::Other("connection reset by peer".to_string()))
            }
            Some(Response::Status(code)) => Err(TransferError::Http(*code)),
            None => Err(TransferError::Http(404)),
        }
    }
}

/// Build an in-memory ZIP with stored entries.
pub(crate) fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
