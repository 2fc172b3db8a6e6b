//! Raw JSON shape of a manifest file.

use serde::Deserialize;

/// Top-level manifest object. Unknown keys are ignored; a missing or `null`
/// `files` key means "nothing to fetch".
#[derive(Debug, Deserialize)]
pub(super) struct RawManifest {
    #[serde(default)]
    pub files: Option<Vec<RawEntry>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawEntry {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub unzip: bool,
}
