//! libcurl-backed `Transport`.

use std::io;
use std::time::Duration;

use super::{ChunkSink, TransferError, Transport};
use crate::config::HttpConfig;
use crate::control::RunControl;

/// Blocking curl transport. Each `get` uses its own easy handle, so one
/// instance can serve any number of blocking-pool threads at once.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    http: HttpConfig,
}

impl CurlTransport {
    pub fn new(http: HttpConfig) -> Self {
        Self { http }
    }

    fn configure(&self, easy: &mut ::curl::easy::Easy, url: &str) -> Result<(), ::curl::Error> {
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.http.max_redirections)?;
        // Fail on >= 400 before any error page reaches the sink.
        easy.fail_on_error(true)?;
        easy.connect_timeout(Duration::from_secs(self.http.connect_timeout_secs))?;
        // Abort if throughput stays below the floor instead of relying only on a wall clock.
        easy.low_speed_limit(self.http.low_speed_limit_bytes)?;
        easy.low_speed_time(Duration::from_secs(self.http.low_speed_time_secs))?;
        if self.http.timeout_secs > 0 {
            easy.timeout(Duration::from_secs(self.http.timeout_secs))?;
        }
        Ok(())
    }
}

impl Transport for CurlTransport {
    fn get(
        &self,
        url: &str,
        control: &RunControl,
        sink: &mut ChunkSink<'_>,
    ) -> Result<(), TransferError> {
        let mut easy = ::curl::easy::Easy::new();
        self.configure(&mut easy, url)?;
        // The progress callback also fires while the connection is idle, so a
        // stalled transfer notices an abort without waiting for the next chunk.
        easy.progress(true)?;

        let mut sink_error: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    sink_error = Some(e);
                    // Short count makes curl abort with a write error.
                    Ok(0)
                }
            })?;
            transfer.progress_function(|_, _, _, _| !control.is_aborted())?;
            transfer.perform()
        };

        if let Some(e) = sink_error {
            return Err(TransferError::from_sink(e));
        }
        if let Err(e) = performed {
            if e.is_aborted_by_callback() && control.is_aborted() {
                return Err(TransferError::Aborted);
            }
            if e.is_http_returned_error() {
                if let Ok(code) = easy.response_code() {
                    return Err(TransferError::Http(code));
                }
            }
            return Err(TransferError::Curl(e));
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransferError::Http(code));
        }
        Ok(())
    }
}
