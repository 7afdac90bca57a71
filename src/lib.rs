//! Receipt scanner - turns photographed receipts into spreadsheet ledger rows.
//!
//! Each uploaded image is saved locally, archived to Google Drive, run
//! through Tesseract OCR, handed to a language model for field extraction,
//! and finally appended to a Google Sheets expense log.

pub mod cli;
pub mod config;
pub mod google;
pub mod llm;
pub mod models;
pub mod ocr;
pub mod server;
pub mod services;
