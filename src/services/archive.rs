//! Remote archival of receipt images.

use std::path::Path;

use async_trait::async_trait;

use crate::google::GoogleError;
use crate::models::ArchivedImage;

/// Remote storage that keeps a publicly viewable copy of each receipt.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Id of the folder with this exact name, creating it when missing.
    ///
    /// Lookup-then-create is not atomic: concurrent callers may each create
    /// a folder.
    async fn ensure_folder(&self, name: &str) -> Result<String, GoogleError>;

    /// Upload a file into a folder and make it readable by anyone with the link.
    ///
    /// Not idempotent; every call creates a new remote file.
    async fn upload(&self, path: &Path, folder_id: &str) -> Result<ArchivedImage, GoogleError>;
}
