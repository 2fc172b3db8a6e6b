//! Disk side of a transfer.
//!
//! Bytes are streamed into `<destination>.part` and only published to the
//! destination path by an atomic rename after a complete, synced write. The
//! destination's existence therefore always means "fully downloaded", even if
//! the process is killed mid-transfer.

mod part_file;

pub use part_file::PartFile;

use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.zip` → `a.zip.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}
