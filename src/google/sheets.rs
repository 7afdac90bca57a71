//! Google Sheets v4 client for the expense ledger.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{DriveClient, GoogleApi, GoogleError};
use crate::services::{SheetRef, SpreadsheetStore};

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Sheets client. Spreadsheets are located by title through Drive.
#[derive(Clone)]
pub struct SheetsClient {
    api: GoogleApi,
    drive: DriveClient,
}

impl SheetsClient {
    pub fn new(api: GoogleApi) -> Self {
        let drive = DriveClient::new(api.clone());
        Self { api, drive }
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!("{}/{}", self.api.endpoints().spreadsheets, spreadsheet_id)
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(spreadsheet_id),
            urlencoding::encode(range)
        )
    }
}

#[async_trait]
impl SpreadsheetStore for SheetsClient {
    async fn open_first_sheet(&self, title: &str) -> Result<SheetRef, GoogleError> {
        let spreadsheet_id = self
            .drive
            .find_spreadsheet(title)
            .await?
            .ok_or_else(|| GoogleError::NotFound(format!("spreadsheet '{}'", title)))?;

        let request = self
            .api
            .http()
            .get(self.spreadsheet_url(&spreadsheet_id))
            .query(&[("fields", "sheets.properties")]);
        let meta: SpreadsheetMeta = self.api.send_json(request).await?;

        let first = meta
            .sheets
            .into_iter()
            .next()
            .ok_or_else(|| GoogleError::NotFound(format!("worksheets in '{}'", title)))?;
        debug!(
            "Opened '{}' ({}), first sheet '{}'",
            title, spreadsheet_id, first.properties.title
        );

        Ok(SheetRef {
            spreadsheet_id,
            sheet_id: first.properties.sheet_id,
            title: first.properties.title,
        })
    }

    async fn get_all_values(&self, sheet: &SheetRef) -> Result<Vec<Vec<String>>, GoogleError> {
        let url = self.values_url(&sheet.spreadsheet_id, &sheet_range(&sheet.title, None));
        let range: ValueRange = self.api.send_json(self.api.http().get(url)).await?;
        Ok(range.values)
    }

    async fn insert_row(
        &self,
        sheet: &SheetRef,
        row: &[String],
        index: u32,
    ) -> Result<(), GoogleError> {
        let index = index.max(1);
        let batch_url = format!("{}:batchUpdate", self.spreadsheet_url(&sheet.spreadsheet_id));
        let insert = json!({
            "requests": [{
                "insertDimension": {
                    "range": {
                        "sheetId": sheet.sheet_id,
                        "dimension": "ROWS",
                        "startIndex": index - 1,
                        "endIndex": index,
                    },
                    "inheritFromBefore": false,
                }
            }]
        });
        self.api
            .send(self.api.http().post(batch_url).json(&insert))
            .await?;

        let cell = format!("A{}", index);
        let range = sheet_range(&sheet.title, Some(&cell));
        let url = self.values_url(&sheet.spreadsheet_id, &range);
        let request = self
            .api
            .http()
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": [row] }));
        self.api.send(request).await?;
        Ok(())
    }

    async fn append_row(&self, sheet: &SheetRef, row: &[String]) -> Result<(), GoogleError> {
        let url = format!(
            "{}:append",
            self.values_url(&sheet.spreadsheet_id, &sheet_range(&sheet.title, None))
        );
        let request = self
            .api
            .http()
            .post(url)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "values": [row] }));
        self.api.send(request).await?;
        Ok(())
    }
}

/// A1 range for a sheet title, optionally narrowed to a cell.
fn sheet_range(title: &str, cell: Option<&str>) -> String {
    let quoted = format!("'{}'", title.replace('\'', "''"));
    match cell {
        Some(cell) => format!("{}!{}", quoted, cell),
        None => quoted,
    }
}
