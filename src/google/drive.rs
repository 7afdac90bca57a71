//! Google Drive v3 client: folder lookup, media upload and sharing.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{GoogleApi, GoogleError};
use crate::models::ArchivedImage;
use crate::services::ArchiveStore;

pub(crate) const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
pub(crate) const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Fallback media type when nothing better can be determined.
const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    web_view_link: Option<String>,
}

/// Drive client.
#[derive(Clone)]
pub struct DriveClient {
    api: GoogleApi,
}

impl DriveClient {
    pub fn new(api: GoogleApi) -> Self {
        Self { api }
    }

    /// Ids of non-trashed files with an exact name and MIME type.
    async fn find_by_name(&self, name: &str, mime_type: &str) -> Result<Vec<String>, GoogleError> {
        let query = name_query(name, mime_type);
        let files_url = &self.api.endpoints().drive_files;
        let request = self.api.http().get(files_url).query(&[
            ("q", query.as_str()),
            ("spaces", "drive"),
            ("fields", "files(id, name)"),
        ]);
        let list: FileList = self.api.send_json(request).await?;
        Ok(list.files.into_iter().map(|f| f.id).collect())
    }

    /// Find a folder by exact name.
    pub async fn find_folder(&self, name: &str) -> Result<Option<String>, GoogleError> {
        Ok(self.find_by_name(name, FOLDER_MIME).await?.into_iter().next())
    }

    /// Create a folder at the drive root.
    pub async fn create_folder(&self, name: &str) -> Result<String, GoogleError> {
        let request = self
            .api
            .http()
            .post(&self.api.endpoints().drive_files)
            .query(&[("fields", "id")])
            .json(&json!({ "name": name, "mimeType": FOLDER_MIME }));
        let folder: DriveFile = self.api.send_json(request).await?;
        info!("Created Drive folder '{}' ({})", name, folder.id);
        Ok(folder.id)
    }

    /// Find a spreadsheet by exact title.
    pub async fn find_spreadsheet(&self, title: &str) -> Result<Option<String>, GoogleError> {
        Ok(self
            .find_by_name(title, SPREADSHEET_MIME)
            .await?
            .into_iter()
            .next())
    }

    /// Upload a local file into a folder. Returns (file id, view link).
    pub async fn upload_file(
        &self,
        path: &Path,
        folder_id: &str,
    ) -> Result<(String, Option<String>), GoogleError> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "receipt".to_string());
        let media_type = media_type(path, &bytes);
        let metadata = json!({ "name": name, "parents": [folder_id] });

        let boundary = format!("receipt-{}", uuid::Uuid::new_v4().simple());
        let body = related_body(&boundary, &metadata, media_type, &bytes);
        debug!(
            "Uploading {} ({} bytes, {}) to folder {}",
            name,
            bytes.len(),
            media_type,
            folder_id
        );

        let request = self
            .api
            .http()
            .post(&self.api.endpoints().drive_upload)
            .query(&[("uploadType", "multipart"), ("fields", "id,webViewLink")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body);
        let file: DriveFile = self.api.send_json(request).await?;
        Ok((file.id, file.web_view_link))
    }

    /// Grant read access to anyone with the link.
    pub async fn make_public(&self, file_id: &str) -> Result<(), GoogleError> {
        let url = format!("{}/{}/permissions", self.api.endpoints().drive_files, file_id);
        let request = self
            .api
            .http()
            .post(url)
            .json(&json!({ "role": "reader", "type": "anyone" }));
        self.api.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ArchiveStore for DriveClient {
    async fn ensure_folder(&self, name: &str) -> Result<String, GoogleError> {
        match self.find_folder(name).await? {
            Some(id) => Ok(id),
            None => self.create_folder(name).await,
        }
    }

    async fn upload(&self, path: &Path, folder_id: &str) -> Result<ArchivedImage, GoogleError> {
        let (file_id, link) = self.upload_file(path, folder_id).await?;
        self.make_public(&file_id).await?;
        let web_view_link = link.unwrap_or_else(|| view_link(&file_id));

        Ok(ArchivedImage {
            file_id,
            web_view_link,
            local_path: path.to_path_buf(),
        })
    }
}

/// Drive query matching non-trashed files by exact name and MIME type.
fn name_query(name: &str, mime_type: &str) -> String {
    format!(
        "name='{}' and mimeType='{}' and trashed=false",
        escape_query_value(name),
        mime_type
    )
}

/// Escape a value for use inside a single-quoted Drive query string.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Canonical view link for a file id.
fn view_link(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view?usp=drivesdk", file_id)
}

/// Determine the media type from content, then extension.
fn media_type(path: &Path, bytes: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type();
    }
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(DEFAULT_MEDIA_TYPE)
}

/// Build a `multipart/related` body: JSON metadata part, then the media part.
fn related_body(
    boundary: &str,
    metadata: &serde_json::Value,
    media_type: &str,
    bytes: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{}\r\n",
            boundary, metadata
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!("--{}\r\nContent-Type: {}\r\n\r\n", boundary, media_type).as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}
