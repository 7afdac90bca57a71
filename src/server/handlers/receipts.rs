//! Receipt upload endpoint.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::debug;

use super::super::AppState;
use crate::models::{ExtractedRecord, ReceiptUpload};
use crate::services::ScanError;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// Success body for `POST /scan-receipt`.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub message: &'static str,
    pub data: ExtractedRecord,
}

/// Accept a receipt image and run it through the pipeline.
pub async fn scan_receipt(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ScanResponse>, ScanError> {
    // A body that isn't multipart at all has no file part either.
    let multipart = multipart.map_err(|_| ScanError::MissingFile)?;
    let upload = read_upload(multipart).await?;

    let outcome = state.pipeline.process(upload).await?;

    Ok(Json(ScanResponse {
        message: "Receipt processed and saved to Google Sheets.",
        data: outcome.record,
    }))
}

/// Pull the first `file` field out of the form.
async fn read_upload(mut multipart: Multipart) -> Result<ReceiptUpload, ScanError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ScanError::EmptyFilename);
        }

        let bytes = field.bytes().await.map_err(upload_error)?;
        debug!("Received '{}' ({} bytes)", filename, bytes.len());
        return Ok(ReceiptUpload::new(filename, bytes.to_vec()));
    }

    Err(ScanError::MissingFile)
}

/// Keep the body-limit case distinct from other malformed streams.
fn upload_error(e: MultipartError) -> ScanError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ScanError::UploadTooLarge(e.body_text())
    } else {
        ScanError::InvalidUpload(e.body_text())
    }
}
