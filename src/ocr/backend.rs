//! OCR backend abstraction.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Raw text as produced by the engine.
    pub text: String,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for OCR backends.
///
/// Implementations are blocking; async callers should run them on the
/// blocking thread pool.
pub trait OcrBackend: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &'static str;

    /// Check if this backend is available (binary installed).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Run OCR on an image file.
    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError>;
}

/// Configuration for the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Path or name of the tesseract executable.
    #[serde(default = "default_command")]
    pub command: PathBuf,
    /// Language for OCR (e.g., "eng", "deu").
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_command() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_language() -> String {
    "eng".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            language: default_language(),
        }
    }
}

impl OcrConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `TESSERACT_CMD`: path to the tesseract binary
    /// - `TESSERACT_LANG`: language code(s), e.g. "eng+deu"
    pub(crate) fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = var("TESSERACT_CMD") {
            self.command = PathBuf::from(val);
        }
        if let Some(val) = var("TESSERACT_LANG") {
            self.language = val;
        }
        self
    }
}
