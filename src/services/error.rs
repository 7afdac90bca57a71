//! Error taxonomy for a receipt scan.

use thiserror::Error;

use crate::google::GoogleError;
use crate::llm::LlmError;
use crate::ocr::OcrError;

/// Everything that can go wrong while scanning a receipt.
///
/// Client input problems map to 400 (413 for an oversized body); every
/// downstream fault maps to 500.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("No file part in the request")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Malformed upload: {0}")]
    InvalidUpload(String),

    #[error("Upload too large: {0}")]
    UploadTooLarge(String),

    #[error("Failed to save upload: {0}")]
    Storage(#[source] std::io::Error),

    #[error("Archive upload failed: {0}")]
    Archive(#[source] GoogleError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("OCR task failed: {0}")]
    OcrTask(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Could not extract JSON from GPT")]
    NoJsonFound,

    #[error("{0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Ledger write failed: {0}")]
    Ledger(#[source] GoogleError),
}

impl ScanError {
    /// Whether the caller, not a downstream service, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingFile
                | Self::EmptyFilename
                | Self::InvalidUpload(_)
                | Self::UploadTooLarge(_)
        )
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        if let Self::UploadTooLarge(_) = self {
            413
        } else if self.is_client_error() {
            400
        } else {
            500
        }
    }
}
