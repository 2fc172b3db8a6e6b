use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::temp_path;

/// Sequential writer for one download's `.part` file.
///
/// Writes go through a `chunk_size` buffer. `finalize` flushes, fsyncs and
/// renames onto the destination; dropping an unfinalized `PartFile` removes
/// the temp file.
pub struct PartFile {
    writer: Option<BufWriter<File>>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Create (or truncate) `<final_path>.part`, creating parent directories.
    pub fn create(final_path: &Path, chunk_size: usize) -> io::Result<Self> {
        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(Self {
            writer: Some(BufWriter::with_capacity(chunk_size.max(1), file)),
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("part file already closed"))?;
        writer.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, sync and atomically rename onto the destination. Returns bytes written.
    pub fn finalize(mut self) -> io::Result<u64> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| io::Error::other("part file already closed"))?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = fs::rename(&self.temp_path, &self.final_path) {
            let _ = fs::remove_file(&self.temp_path);
            return Err(io::Error::new(
                e.kind(),
                format!(
                    "failed to rename {} to {}: {e}",
                    self.temp_path.display(),
                    self.final_path.display()
                ),
            ));
        }
        Ok(self.written)
    }

    /// Close and remove the temp file without publishing it.
    pub fn discard(self) {}
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            // Buffered bytes are thrown away with the file.
            let (file, _) = writer.into_parts();
            drop(file);
            match fs::remove_file(&self.temp_path) {
                Ok(()) => tracing::debug!(path = %self.temp_path.display(), "removed partial file"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    path = %self.temp_path.display(),
                    "could not remove partial file: {e}"
                ),
            }
        }
    }
}
