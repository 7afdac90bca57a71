//! Google Drive and Sheets REST clients.
//!
//! Authenticates as a service account (signed JWT exchanged for an OAuth
//! access token) and talks to the Drive v3 and Sheets v4 JSON APIs directly
//! over reqwest.

mod auth;
mod drive;
mod sheets;
#[cfg(test)]
mod testing;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, GOOGLE_SCOPES};
pub use drive::DriveClient;
pub use sheets::SheetsClient;

/// Errors from Google API calls.
#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Invalid service account credentials: {0}")]
    Credentials(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Base URLs of the REST collections the clients talk to.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    /// Drive v3 `files` collection (metadata and permissions).
    pub drive_files: String,
    /// Drive v3 media upload endpoint.
    pub drive_upload: String,
    /// Sheets v4 `spreadsheets` collection.
    pub spreadsheets: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            drive_files: "https://www.googleapis.com/drive/v3/files".to_string(),
            drive_upload: "https://www.googleapis.com/upload/drive/v3/files".to_string(),
            spreadsheets: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
        }
    }
}

/// Authorized HTTP access shared by the Drive and Sheets clients.
#[derive(Clone)]
pub struct GoogleApi {
    http: Client,
    auth: Arc<ServiceAccountAuth>,
    endpoints: Arc<GoogleEndpoints>,
}

impl GoogleApi {
    pub fn new(
        key: ServiceAccountKey,
        timeout: Duration,
        endpoints: GoogleEndpoints,
    ) -> Result<Self, GoogleError> {
        let http = Client::builder().timeout(timeout).build()?;
        let auth = ServiceAccountAuth::new(key, http.clone());
        Ok(Self {
            http,
            auth: Arc::new(auth),
            endpoints: Arc::new(endpoints),
        })
    }

    /// Build an API handle from a service-account JSON key file.
    pub fn from_credentials_file(path: &Path, timeout: Duration) -> Result<Self, GoogleError> {
        let key = ServiceAccountKey::from_file(path)?;
        Self::new(key, timeout, GoogleEndpoints::default())
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn endpoints(&self) -> &GoogleEndpoints {
        &self.endpoints
    }

    /// Attach a bearer token and send, failing on non-2xx statuses.
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, GoogleError> {
        let token = self.auth.access_token().await?;
        let resp = request.bearer_auth(token).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GoogleError::Api { status, body });
        }
        Ok(resp)
    }

    /// Send and decode a JSON response body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GoogleError> {
        Ok(self.send(request).await?.json().await?)
    }
}
