//! In-memory stand-ins for the remote services, shared by unit tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Barrier;

use super::{
    ArchiveStore, FieldExtractor, LedgerWriter, ReceiptPipeline, SheetRef, SpreadsheetStore,
    UploadStore,
};
use crate::google::GoogleError;
use crate::llm::{ChatModel, LlmConfig, LlmError};
use crate::models::ArchivedImage;
use crate::ocr::{OcrBackend, OcrError, OcrResult};

pub const TEST_FOLDER: &str = "Receipt Images";
pub const TEST_SHEET: &str = "EXPENSE LOG";

/// Build a pipeline over the given fakes, storing uploads in `dir/uploads`.
pub fn test_pipeline(
    dir: &Path,
    archive: Arc<MemoryArchive>,
    ocr: Arc<FixedOcr>,
    model: Arc<ScriptedModel>,
    sheets: Arc<MemorySpreadsheet>,
) -> ReceiptPipeline {
    ReceiptPipeline::new(
        UploadStore::new(dir.join("uploads")),
        archive,
        TEST_FOLDER,
        ocr,
        FieldExtractor::new(model, &LlmConfig::default()),
        LedgerWriter::new(sheets, TEST_SHEET),
    )
}

/// Drive stand-in with a deliberately non-atomic folder lookup.
pub struct MemoryArchive {
    folders: Mutex<Vec<(String, String)>>,
    uploads: Mutex<Vec<(String, ArchivedImage)>>,
    next_id: AtomicUsize,
    race: Option<Barrier>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self {
            folders: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            race: None,
        }
    }

    /// Hold `callers` concurrent `ensure_folder` calls between lookup and
    /// create, so each of them creates its own folder.
    pub fn racing(callers: usize) -> Self {
        Self {
            race: Some(Barrier::new(callers)),
            ..Self::new()
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    pub fn folders(&self) -> Vec<(String, String)> {
        self.folders.lock().unwrap().clone()
    }

    /// (folder id, archived image) per upload.
    pub fn uploaded(&self) -> Vec<(String, ArchivedImage)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchiveStore for MemoryArchive {
    async fn ensure_folder(&self, name: &str) -> Result<String, GoogleError> {
        let existing = self
            .folders
            .lock()
            .unwrap()
            .iter()
            .find(|(_, n)| n == name)
            .map(|(id, _)| id.clone());
        if let Some(id) = existing {
            return Ok(id);
        }

        if let Some(barrier) = &self.race {
            barrier.wait().await;
        }

        let id = self.next_id("folder");
        self.folders
            .lock()
            .unwrap()
            .push((id.clone(), name.to_string()));
        Ok(id)
    }

    async fn upload(&self, path: &Path, folder_id: &str) -> Result<ArchivedImage, GoogleError> {
        let file_id = self.next_id("file");
        let image = ArchivedImage {
            web_view_link: format!("https://drive.example.com/file/d/{}/view", file_id),
            file_id,
            local_path: path.to_path_buf(),
        };
        self.uploads
            .lock()
            .unwrap()
            .push((folder_id.to_string(), image.clone()));
        Ok(image)
    }
}

/// Sheets stand-in holding a single worksheet.
pub struct MemorySpreadsheet {
    title: String,
    rows: Mutex<Vec<Vec<String>>>,
    fail_appends: bool,
}

impl MemorySpreadsheet {
    pub fn new(title: &str) -> Self {
        Self::with_rows(title, Vec::new())
    }

    pub fn with_rows(title: &str, rows: Vec<Vec<String>>) -> Self {
        Self {
            title: title.to_string(),
            rows: Mutex::new(rows),
            fail_appends: false,
        }
    }

    /// A spreadsheet whose appends are rejected by the "provider".
    pub fn rejecting_appends(title: &str) -> Self {
        Self {
            fail_appends: true,
            ..Self::new(title)
        }
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpreadsheetStore for MemorySpreadsheet {
    async fn open_first_sheet(&self, title: &str) -> Result<SheetRef, GoogleError> {
        if title != self.title {
            return Err(GoogleError::NotFound(format!("spreadsheet '{}'", title)));
        }
        Ok(SheetRef {
            spreadsheet_id: "sheet-1".to_string(),
            sheet_id: 0,
            title: "Sheet1".to_string(),
        })
    }

    async fn get_all_values(&self, _sheet: &SheetRef) -> Result<Vec<Vec<String>>, GoogleError> {
        Ok(self.rows())
    }

    async fn insert_row(
        &self,
        _sheet: &SheetRef,
        row: &[String],
        index: u32,
    ) -> Result<(), GoogleError> {
        let mut rows = self.rows.lock().unwrap();
        let at = (index.max(1) as usize - 1).min(rows.len());
        rows.insert(at, row.to_vec());
        Ok(())
    }

    async fn append_row(&self, _sheet: &SheetRef, row: &[String]) -> Result<(), GoogleError> {
        if self.fail_appends {
            return Err(GoogleError::Api {
                status: 403,
                body: "The caller does not have permission".to_string(),
            });
        }
        self.rows.lock().unwrap().push(row.to_vec());
        Ok(())
    }
}

enum OcrBehavior {
    Text(String),
    FileContents,
    Fail(String),
}

/// OCR stand-in.
pub struct FixedOcr {
    behavior: OcrBehavior,
}

impl FixedOcr {
    /// Always recognize the same text.
    pub fn new(text: &str) -> Self {
        Self {
            behavior: OcrBehavior::Text(text.to_string()),
        }
    }

    /// "Recognize" the image file's bytes as UTF-8 text.
    pub fn file_contents() -> Self {
        Self {
            behavior: OcrBehavior::FileContents,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            behavior: OcrBehavior::Fail(message.to_string()),
        }
    }
}

impl OcrBackend for FixedOcr {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        "always available".to_string()
    }

    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let text = match &self.behavior {
            OcrBehavior::Text(text) => text.clone(),
            OcrBehavior::FileContents => {
                String::from_utf8_lossy(&std::fs::read(image_path)?).into_owned()
            }
            OcrBehavior::Fail(message) => return Err(OcrError::OcrFailed(message.clone())),
        };
        Ok(OcrResult {
            text,
            processing_time_ms: 1,
        })
    }
}

enum ModelBehavior {
    Reply(String),
    VendorFromFirstLine,
    Fail(String),
}

/// Chat model stand-in that records every call.
pub struct ScriptedModel {
    behavior: ModelBehavior,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    fn with_behavior(behavior: ModelBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self::with_behavior(ModelBehavior::Reply(reply.to_string()))
    }

    /// Reply with a record whose vendor is the first line of receipt text.
    pub fn vendor_from_first_line() -> Self {
        Self::with_behavior(ModelBehavior::VendorFromFirstLine)
    }

    pub fn failing(message: &str) -> Self {
        Self::with_behavior(ModelBehavior::Fail(message.to_string()))
    }

    /// (system, prompt) pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));

        match &self.behavior {
            ModelBehavior::Reply(reply) => Ok(reply.clone()),
            ModelBehavior::VendorFromFirstLine => {
                let vendor = prompt
                    .split("\"\"\"\n")
                    .nth(1)
                    .and_then(|text| text.lines().next())
                    .unwrap_or_default();
                Ok(serde_json::json!({
                    "vendor": vendor,
                    "date": "2024-01-05",
                    "total_amount": "$1.00",
                })
                .to_string())
            }
            ModelBehavior::Fail(message) => Err(LlmError::Api(message.clone())),
        }
    }

    fn temperature(&self) -> f32 {
        0.2
    }
}
