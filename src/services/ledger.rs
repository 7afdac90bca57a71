//! Spreadsheet ledger: one row per processed receipt.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::google::GoogleError;
use crate::models::{ExtractedRecord, LedgerRow, LEDGER_HEADERS};

/// Location of a worksheet inside a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub spreadsheet_id: String,
    pub sheet_id: i64,
    pub title: String,
}

/// Row-level access to a spreadsheet service.
#[async_trait]
pub trait SpreadsheetStore: Send + Sync {
    /// Open a spreadsheet by title and select its first worksheet.
    async fn open_first_sheet(&self, title: &str) -> Result<SheetRef, GoogleError>;

    /// All populated rows, as returned by the service (no padding).
    async fn get_all_values(&self, sheet: &SheetRef) -> Result<Vec<Vec<String>>, GoogleError>;

    /// Insert a row at a 1-based index, shifting existing rows down.
    async fn insert_row(&self, sheet: &SheetRef, row: &[String], index: u32)
        -> Result<(), GoogleError>;

    /// Append a row after the last populated one.
    async fn append_row(&self, sheet: &SheetRef, row: &[String]) -> Result<(), GoogleError>;
}

/// Whether the first row is exactly the ledger header.
///
/// The comparison is exact: differences in case or whitespace count as a
/// mismatch.
pub fn header_matches(rows: &[Vec<String>]) -> bool {
    rows.first()
        .is_some_and(|first| first.iter().map(String::as_str).eq(LEDGER_HEADERS))
}

/// Appends extracted records to a named spreadsheet.
#[derive(Clone)]
pub struct LedgerWriter {
    store: Arc<dyn SpreadsheetStore>,
    sheet_name: String,
}

impl LedgerWriter {
    pub fn new(store: Arc<dyn SpreadsheetStore>, sheet_name: impl Into<String>) -> Self {
        Self {
            store,
            sheet_name: sheet_name.into(),
        }
    }

    /// Insert the header at row 1 unless the first row already matches it.
    ///
    /// Returns `true` when a header row was inserted.
    pub async fn ensure_header(&self, sheet: &SheetRef) -> Result<bool, GoogleError> {
        let rows = self.store.get_all_values(sheet).await?;
        if header_matches(&rows) {
            return Ok(false);
        }

        debug!(
            "First row of '{}' is not the ledger header, inserting it",
            sheet.title
        );
        let header: Vec<String> = LEDGER_HEADERS.iter().map(|h| h.to_string()).collect();
        self.store.insert_row(sheet, &header, 1).await?;
        Ok(true)
    }

    /// Record one receipt: ensure the header, then append its row.
    pub async fn record(
        &self,
        record: &ExtractedRecord,
        archive_link: &str,
    ) -> Result<LedgerRow, GoogleError> {
        let sheet = self.store.open_first_sheet(&self.sheet_name).await?;
        self.ensure_header(&sheet).await?;

        let row = LedgerRow::new(record, archive_link);
        self.store.append_row(&sheet, row.cells()).await?;
        info!(
            "Appended ledger row for '{}' to '{}'",
            record.vendor, self.sheet_name
        );
        Ok(row)
    }
}
