//! The receipt scanning pipeline.
//!
//! `received -> saved -> archived -> recognized -> extracted -> recorded`.
//! Each step runs once, in order; the first failure aborts the rest and
//! nothing already done is undone (the local file and any remote upload
//! stay where they are).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info};

use super::{ArchiveStore, FieldExtractor, LedgerWriter, ScanError, UploadStore};
use crate::config::Settings;
use crate::google::{DriveClient, GoogleApi, SheetsClient};
use crate::llm::LlmClient;
use crate::models::{ArchivedImage, ExtractedRecord, LedgerRow, ReceiptUpload, ScanStage};
use crate::ocr::{clean_text, OcrBackend, TesseractBackend};

/// What a successful scan produced.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub saved_path: PathBuf,
    pub archived: ArchivedImage,
    pub cleaned_text: String,
    pub record: ExtractedRecord,
    pub row: LedgerRow,
}

/// Runs uploads through storage, archival, OCR, extraction and the ledger.
pub struct ReceiptPipeline {
    uploads: UploadStore,
    archive: Arc<dyn ArchiveStore>,
    folder_name: String,
    ocr: Arc<dyn OcrBackend>,
    extractor: FieldExtractor,
    ledger: LedgerWriter,
}

impl ReceiptPipeline {
    pub fn new(
        uploads: UploadStore,
        archive: Arc<dyn ArchiveStore>,
        folder_name: impl Into<String>,
        ocr: Arc<dyn OcrBackend>,
        extractor: FieldExtractor,
        ledger: LedgerWriter,
    ) -> Self {
        Self {
            uploads,
            archive,
            folder_name: folder_name.into(),
            ocr,
            extractor,
            ledger,
        }
    }

    /// Wire the pipeline to Tesseract, the configured LLM and Google APIs.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(settings.request_timeout);

        let creds = settings
            .credentials_path
            .as_deref()
            .context("No Google credentials configured (set GOOGLE_CREDS_PATH)")?;
        let google = GoogleApi::from_credentials_file(creds, timeout)
            .with_context(|| format!("Failed to load credentials from {}", creds.display()))?;

        let llm = LlmClient::new(settings.llm.clone(), timeout)?;
        if !llm.is_configured() {
            tracing::warn!("No LLM API key configured; extraction requests will fail");
        }
        let extractor = FieldExtractor::new(Arc::new(llm), &settings.llm);

        let ocr = TesseractBackend::with_config(settings.ocr.clone());
        if !ocr.is_available() {
            tracing::warn!("{}", ocr.availability_hint());
        }

        Ok(Self::new(
            UploadStore::new(&settings.upload_dir),
            Arc::new(DriveClient::new(google.clone())),
            &settings.drive_folder,
            Arc::new(ocr),
            extractor,
            LedgerWriter::new(Arc::new(SheetsClient::new(google)), &settings.sheet_name),
        ))
    }

    /// Process one receipt end to end.
    pub async fn process(&self, upload: ReceiptUpload) -> Result<ScanOutcome, ScanError> {
        let mut stage = ScanStage::Received;
        let result = self.run(upload, &mut stage).await;
        if let Err(ref e) = result {
            if !e.is_client_error() {
                error!("Receipt scan failed after stage '{}': {}", stage, e);
            }
        }
        result
    }

    async fn run(
        &self,
        upload: ReceiptUpload,
        stage: &mut ScanStage,
    ) -> Result<ScanOutcome, ScanError> {
        if upload.original_filename.is_empty() {
            return Err(ScanError::EmptyFilename);
        }

        let saved_path = self
            .uploads
            .save(&upload)
            .await
            .map_err(ScanError::Storage)?;
        *stage = ScanStage::Saved;
        info!("Saved receipt to {}", saved_path.display());

        let folder_id = self
            .archive
            .ensure_folder(&self.folder_name)
            .await
            .map_err(ScanError::Archive)?;
        let archived = self
            .archive
            .upload(&saved_path, &folder_id)
            .await
            .map_err(ScanError::Archive)?;
        *stage = ScanStage::Archived;
        info!(
            "Archived {} as {} ({})",
            saved_path.display(),
            archived.file_id,
            archived.web_view_link
        );

        let cleaned_text = self.recognize(&saved_path).await?;
        *stage = ScanStage::Recognized;

        let record = self.extractor.extract(&cleaned_text).await?;
        *stage = ScanStage::Extracted;

        let row = self
            .ledger
            .record(&record, &archived.web_view_link)
            .await
            .map_err(ScanError::Ledger)?;
        *stage = ScanStage::Recorded;

        Ok(ScanOutcome {
            saved_path,
            archived,
            cleaned_text,
            record,
            row,
        })
    }

    /// OCR a stored image on the blocking pool and normalize the text.
    pub async fn recognize(&self, path: &Path) -> Result<String, ScanError> {
        let ocr = Arc::clone(&self.ocr);
        let path = path.to_path_buf();
        let result = tokio::task::spawn_blocking(move || ocr.ocr_image(&path))
            .await
            .map_err(|e| ScanError::OcrTask(e.to_string()))??;

        let cleaned = clean_text(&result.text);
        info!(
            "OCR ({}) produced {} lines in {}ms",
            self.ocr.name(),
            cleaned.lines().count(),
            result.processing_time_ms
        );
        Ok(cleaned)
    }
}
