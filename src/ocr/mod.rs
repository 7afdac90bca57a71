//! OCR text extraction for receipt images.
//!
//! Tesseract (invoked as a subprocess) is the only engine. The
//! [`OcrBackend`] trait keeps the pipeline independent of how text is
//! actually recognized, and [`clean_text`] strips the blank-line noise OCR
//! tends to leave on receipts.

mod backend;
mod tesseract;
mod text;

pub use backend::{OcrBackend, OcrConfig, OcrError, OcrResult};
pub use tesseract::TesseractBackend;
pub use text::clean_text;
