//! Data models for the receipt pipeline.

mod receipt;
mod stage;

pub use receipt::{ArchivedImage, ExtractedRecord, LedgerRow, ReceiptUpload, LEDGER_HEADERS};
pub use stage::ScanStage;
