//! Structured field extraction from cleaned OCR text.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::debug;

use super::ScanError;
use crate::llm::{ChatModel, LlmConfig};
use crate::models::ExtractedRecord;

/// Asks a chat model for receipt fields and scrapes JSON out of the reply.
#[derive(Clone)]
pub struct FieldExtractor {
    model: Arc<dyn ChatModel>,
    system_prompt: String,
    prompt_template: String,
}

impl FieldExtractor {
    /// Build an extractor using the prompts from an LLM config.
    pub fn new(model: Arc<dyn ChatModel>, config: &LlmConfig) -> Self {
        Self {
            model,
            system_prompt: config.get_system_prompt().to_string(),
            prompt_template: config.get_extraction_prompt().to_string(),
        }
    }

    /// The user prompt for a piece of receipt text.
    pub fn build_prompt(&self, cleaned_text: &str) -> String {
        self.prompt_template.replace("{content}", cleaned_text)
    }

    /// Run the model over the text and parse its reply.
    pub async fn extract(&self, cleaned_text: &str) -> Result<ExtractedRecord, ScanError> {
        let prompt = self.build_prompt(cleaned_text);
        debug!(
            "Extracting fields from {} chars of text (temperature {})",
            cleaned_text.len(),
            self.model.temperature()
        );

        let reply = self.model.complete(&self.system_prompt, &prompt).await?;
        debug!("Model reply:\n{}", reply);
        parse_reply(&reply)
    }
}

/// Greedy match from the first `{` to the last `}` of the reply.
///
/// Braces in prose around the real object (or several objects) yield a
/// span that is not valid JSON.
pub fn json_span(reply: &str) -> Option<&str> {
    static SPAN: OnceLock<Regex> = OnceLock::new();
    let re = SPAN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));
    re.find(reply).map(|m| m.as_str())
}

/// Parse a model reply into a record.
pub fn parse_reply(reply: &str) -> Result<ExtractedRecord, ScanError> {
    let span = json_span(reply).ok_or(ScanError::NoJsonFound)?;
    let value: serde_json::Value = serde_json::from_str(span)?;
    Ok(ExtractedRecord::from_json(&value))
}
