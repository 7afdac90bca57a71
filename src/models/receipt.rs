//! Receipt upload, archive and ledger records.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

/// Header row the ledger sheet must start with.
pub const LEDGER_HEADERS: [&str; 4] = ["Vendor", "Date", "Amount", "Drive Link"];

/// A receipt image received from a client.
#[derive(Debug, Clone)]
pub struct ReceiptUpload {
    /// Filename as supplied by the client (used only for its extension).
    pub original_filename: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl ReceiptUpload {
    pub fn new(original_filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            original_filename: original_filename.into(),
            bytes,
        }
    }
}

/// A receipt image stored in the remote archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedImage {
    /// Remote storage file id.
    pub file_id: String,
    /// Publicly readable view link.
    pub web_view_link: String,
    /// Local copy the archive was uploaded from.
    pub local_path: PathBuf,
}

/// Fields extracted from a receipt by the language model.
///
/// Lookup is best-effort: missing keys become empty strings, and `items`
/// stays `None` unless the model returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedRecord {
    pub vendor: String,
    pub date: String,
    pub total_amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
}

impl ExtractedRecord {
    /// Build a record from a parsed JSON value.
    ///
    /// Anything that isn't an object yields an all-empty record.
    pub fn from_json(value: &Value) -> Self {
        let items = value.get("items").map(|v| match v {
            Value::Array(entries) => entries.iter().map(scalar_to_string).collect(),
            Value::Null => Vec::new(),
            other => vec![scalar_to_string(other)],
        });

        Self {
            vendor: field(value, "vendor"),
            date: field(value, "date"),
            total_amount: field(value, "total_amount"),
            items,
        }
    }

    /// Items joined for the ledger's items column.
    pub fn items_joined(&self) -> String {
        self.items
            .as_deref()
            .map(|items| items.join(", "))
            .unwrap_or_default()
    }
}

fn field(value: &Value, key: &str) -> String {
    value.get(key).map(scalar_to_string).unwrap_or_default()
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// One row appended to the ledger sheet.
///
/// Column order: vendor, date, amount, items, archive link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow(pub Vec<String>);

impl LedgerRow {
    pub fn new(record: &ExtractedRecord, archive_link: &str) -> Self {
        Self(vec![
            record.vendor.clone(),
            record.date.clone(),
            record.total_amount.clone(),
            record.items_joined(),
            archive_link.to_string(),
        ])
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_complete_json() {
        let record = ExtractedRecord::from_json(&json!({
            "vendor": "Acme Store",
            "date": "2024-01-05",
            "total_amount": "$23.45",
            "items": ["Milk", "Bread"]
        }));
        assert_eq!(record.vendor, "Acme Store");
        assert_eq!(record.date, "2024-01-05");
        assert_eq!(record.total_amount, "$23.45");
        assert_eq!(record.items_joined(), "Milk, Bread");
    }

    #[test]
    fn test_record_missing_keys_default_to_empty() {
        let record = ExtractedRecord::from_json(&json!({ "vendor": "Corner Deli" }));
        assert_eq!(record.vendor, "Corner Deli");
        assert_eq!(record.date, "");
        assert_eq!(record.total_amount, "");
        assert!(record.items.is_none());
        assert_eq!(record.items_joined(), "");
    }

    #[test]
    fn test_record_stringifies_scalars() {
        let record = ExtractedRecord::from_json(&json!({
            "vendor": null,
            "total_amount": 23.45,
            "items": ["Coffee", 2]
        }));
        assert_eq!(record.vendor, "");
        assert_eq!(record.total_amount, "23.45");
        assert_eq!(record.items, Some(vec!["Coffee".to_string(), "2".to_string()]));
    }

    #[test]
    fn test_serialized_keys() {
        let without_items = serde_json::to_value(ExtractedRecord::default()).unwrap();
        let keys: Vec<_> = without_items.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(without_items.get("items").is_none());

        let with_items = serde_json::to_value(ExtractedRecord {
            items: Some(vec!["Tea".to_string()]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(with_items["items"], json!(["Tea"]));
    }

    #[test]
    fn test_ledger_row_order() {
        let record = ExtractedRecord {
            vendor: "Acme Store".to_string(),
            date: "2024-01-05".to_string(),
            total_amount: "$23.45".to_string(),
            items: None,
        };
        let row = LedgerRow::new(&record, "https://drive.example/view");
        assert_eq!(
            row.cells(),
            &["Acme Store", "2024-01-05", "$23.45", "", "https://drive.example/view"]
        );
    }
}
