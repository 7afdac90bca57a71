//! Service layer for receipt scanning.
//!
//! The pipeline and its steps live here, separated from the HTTP and CLI
//! front ends. Remote systems sit behind the [`ArchiveStore`] and
//! [`SpreadsheetStore`] traits.

mod archive;
mod error;
mod extraction;
mod ledger;
mod pipeline;
mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use archive::ArchiveStore;
pub use error::ScanError;
pub use extraction::{json_span, parse_reply, FieldExtractor};
pub use ledger::{header_matches, LedgerWriter, SheetRef, SpreadsheetStore};
pub use pipeline::{ReceiptPipeline, ScanOutcome};
pub use upload::{receipt_filename, UploadStore};
