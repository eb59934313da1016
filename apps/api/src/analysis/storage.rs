//! Temp File Store: scratch storage for one uploaded resume per request.
//!
//! Files get random names (keeping the original extension) so concurrent uploads
//! never collide. `UploadedResume` owns its file: `discard()` on the normal path,
//! and `Drop` deletes it on every other exit path (early return, timeout, panic).

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, warn};

const FILE_PREFIX: &str = "cv-";

#[derive(Debug, Clone)]
pub struct TempFileStore {
    dir: PathBuf,
}

impl TempFileStore {
    /// Creates the scratch directory if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` to a freshly named file and returns the owning guard.
    pub async fn store(
        &self,
        original_filename: &str,
        media_type: &str,
        bytes: &[u8],
    ) -> io::Result<UploadedResume> {
        let suffix = extension_suffix(original_filename);
        let path = tempfile::Builder::new()
            .prefix(FILE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?
            .into_temp_path();

        // `path` is already a guard; a failed write drops it and removes the file.
        tokio::fs::write(&path, bytes).await?;

        debug!(path = %path.display(), size = bytes.len(), "Stored upload");

        Ok(UploadedResume {
            path: Some(path),
            original_filename: original_filename.to_string(),
            media_type: media_type.to_string(),
            size: bytes.len() as u64,
        })
    }
}

/// An accepted upload on local disk. Deleted exactly once.
#[derive(Debug)]
pub struct UploadedResume {
    path: Option<TempPath>,
    pub original_filename: String,
    pub media_type: String,
    pub size: u64,
}

impl UploadedResume {
    pub fn path(&self) -> &Path {
        // Only `discard` takes the path, and it consumes `self`.
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Deletes the file now. A file that is already gone is not an error.
    pub fn discard(mut self) -> io::Result<()> {
        match self.path.take() {
            Some(path) => remove(path),
            None => Ok(()),
        }
    }
}

impl Drop for UploadedResume {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let shown = path.display().to_string();
            if let Err(e) = remove(path) {
                warn!(path = %shown, error = %e, "Failed to remove upload");
            }
        }
    }
}

fn remove(path: TempPath) -> io::Result<()> {
    match path.close() {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// `.pdf` for `resume.PDF`, empty when there is no extension.
fn extension_suffix(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}
