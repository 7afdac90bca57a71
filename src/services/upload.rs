//! Local persistence of uploaded receipt images.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::models::ReceiptUpload;

/// Timestamp layout used in stored filenames (one-second granularity).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Writes uploads into a single directory, created on demand.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save an upload under a timestamped name and return its path.
    ///
    /// Two uploads with the same extension in the same second share a name;
    /// the later one overwrites the earlier.
    pub async fn save(&self, upload: &ReceiptUpload) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let filename = receipt_filename(&upload.original_filename, Local::now());
        let path = self.dir.join(filename);
        tokio::fs::write(&path, &upload.bytes).await?;
        debug!("Wrote {} bytes to {}", upload.bytes.len(), path.display());
        Ok(path)
    }
}

/// `receipt_<timestamp><ext>`, keeping the original extension (with its dot).
pub fn receipt_filename(original: &str, now: DateTime<Local>) -> String {
    let ext = Path::new(original)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("receipt_{}{}", now.format(TIMESTAMP_FORMAT), ext)
}
