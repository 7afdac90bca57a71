//! Tesseract OCR backend implementation.
//!
//! Runs the Tesseract command-line tool and reads the recognized text from
//! its stdout.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use tracing::debug;

use super::backend::{OcrBackend, OcrConfig, OcrError, OcrResult};

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Run Tesseract on an image file.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        debug!(
            "Running {} on {}",
            self.config.command.display(),
            image_path.display()
        );
        let output = Command::new(&self.config.command)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!(
                        "tesseract failed: {}",
                        stderr.trim()
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(format!(
                    "{} not found (install tesseract-ocr)",
                    self.config.command.display()
                )))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        which::which(&self.config.command).is_ok()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            format!("Tesseract is available ({})", self.config.command.display())
        } else {
            format!(
                "{} not found. Install with: apt install tesseract-ocr (or set TESSERACT_CMD)",
                self.config.command.display()
            )
        }
    }

    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        if !image_path.exists() {
            return Err(OcrError::OcrFailed(format!(
                "image not found: {}",
                image_path.display()
            )));
        }

        let start = Instant::now();
        let text = self.run_tesseract(image_path)?;
        let elapsed = start.elapsed();

        Ok(OcrResult {
            text,
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn missing_binary_backend() -> TesseractBackend {
        TesseractBackend::with_config(OcrConfig {
            command: PathBuf::from("definitely-not-a-tesseract-binary"),
            language: "eng".to_string(),
        })
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let backend = missing_binary_backend();
        assert!(!backend.is_available());
        assert!(backend.availability_hint().contains("not found"));
    }

    #[test]
    fn test_missing_binary_reports_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("receipt.png");
        std::fs::write(&image, b"not really a png").unwrap();

        let err = missing_binary_backend().ocr_image(&image).unwrap_err();
        assert!(matches!(err, OcrError::BackendNotAvailable(_)));
    }

    #[test]
    fn test_missing_image_fails_before_running() {
        let err = missing_binary_backend()
            .ocr_image(Path::new("/nonexistent/receipt.png"))
            .unwrap_err();
        assert!(matches!(err, OcrError::OcrFailed(_)));
    }
}
