pub mod config;
pub mod logging;

pub mod control;
pub mod discovery;
pub mod events;
pub mod extract;
pub mod fetch;
pub mod host_limit;
pub mod manifest;
pub mod orchestrator;
pub mod processor;
pub mod session;
pub mod storage;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use fetch::{FetchError, FileOutcome, FileReport};
pub use orchestrator::{FetchCounts, RunOutcome, RunSummary};
pub use processor::{ManifestOutcome, ManifestReport};
pub use session::Session;
