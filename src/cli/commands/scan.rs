//! Local scan and OCR commands.

use std::path::Path;

use anyhow::Context;
use console::style;

use crate::config::Settings;
use crate::models::ReceiptUpload;
use crate::ocr::{clean_text, OcrBackend, TesseractBackend};
use crate::services::ReceiptPipeline;

/// Run an image file through the whole pipeline and print the record.
pub async fn cmd_scan(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let upload = read_upload(file).await?;
    let pipeline = ReceiptPipeline::from_settings(settings)?;

    eprintln!("{} Scanning {}", style("→").cyan(), file.display());
    let outcome = pipeline.process(upload).await?;

    eprintln!(
        "  {} Saved to {}",
        style("✓").green(),
        outcome.saved_path.display()
    );
    eprintln!(
        "  {} Archived at {}",
        style("✓").green(),
        outcome.archived.web_view_link
    );
    eprintln!(
        "  {} Recorded in '{}'",
        style("✓").green(),
        settings.sheet_name
    );
    println!("{}", serde_json::to_string_pretty(&outcome.record)?);
    Ok(())
}

/// Print the cleaned OCR text of an image file.
pub async fn cmd_ocr(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    if !file.is_file() {
        anyhow::bail!("No such file: {}", file.display());
    }

    let backend = TesseractBackend::with_config(settings.ocr.clone());
    if !backend.is_available() {
        anyhow::bail!("{}", backend.availability_hint());
    }

    let path = file.to_path_buf();
    let result = tokio::task::spawn_blocking(move || backend.ocr_image(&path)).await??;
    tracing::debug!("OCR took {}ms", result.processing_time_ms);

    println!("{}", clean_text(&result.text));
    Ok(())
}

async fn read_upload(file: &Path) -> anyhow::Result<ReceiptUpload> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ReceiptUpload::new(filename, bytes))
}
