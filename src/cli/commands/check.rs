//! Readiness check for the external dependencies.

use console::style;

use crate::config::Settings;
use crate::google::ServiceAccountKey;
use crate::llm::LlmClient;
use crate::ocr::{OcrBackend, TesseractBackend};

/// Report whether tesseract, Google credentials and the LLM are usable.
///
/// Nothing remote is contacted.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    let mut problems = 0;

    let ocr = TesseractBackend::with_config(settings.ocr.clone());
    if ocr.is_available() {
        report_ok(&format!(
            "OCR: {} (language {})",
            ocr.config().command.display(),
            ocr.config().language
        ));
    } else {
        problems += 1;
        report_problem(&format!("OCR: {}", ocr.availability_hint()));
    }

    match settings.credentials_path.as_deref() {
        None => {
            problems += 1;
            report_problem("Google credentials: not configured (set GOOGLE_CREDS_PATH)");
        }
        Some(path) => match ServiceAccountKey::from_file(path) {
            Ok(key) => report_ok(&format!(
                "Google credentials: {} ({})",
                key.client_email,
                path.display()
            )),
            Err(e) => {
                problems += 1;
                report_problem(&format!("Google credentials: {}", e));
            }
        },
    }

    let llm = LlmClient::new(
        settings.llm.clone(),
        std::time::Duration::from_secs(settings.request_timeout),
    )?;
    if llm.is_configured() {
        report_ok(&format!(
            "LLM: {} via {} ({})",
            llm.config().model,
            llm.config().provider.as_str(),
            llm.config().endpoint()
        ));
    } else {
        problems += 1;
        report_problem("LLM: no API key (set OPENAI_API_KEY or LLM_API_KEY)");
    }

    println!();
    println!("Upload directory: {}", settings.upload_dir.display());
    println!("Drive folder:     {}", settings.drive_folder);
    println!("Ledger sheet:     {}", settings.sheet_name);

    if problems > 0 {
        anyhow::bail!("{} dependency check(s) failed", problems);
    }
    Ok(())
}

fn report_ok(message: &str) {
    println!("  {} {}", style("✓").green(), message);
}

fn report_problem(message: &str) {
    println!("  {} {}", style("✗").red(), message);
}
