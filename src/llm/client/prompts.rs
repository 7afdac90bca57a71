//! Default prompts for receipt extraction.

/// System instruction framing the task as structured extraction.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You extract structured data from receipts.";

/// Default extraction prompt. `{content}` is replaced with the cleaned OCR text.
pub const DEFAULT_EXTRACTION_PROMPT: &str = r#"You are an AI assistant that extracts structured information from scanned receipt text.

Receipt text:
"""
{content}
"""

Extract the following in valid JSON format ONLY:
{
    "vendor": "Vendor Name",
    "date": "YYYY-MM-DD",
    "total_amount": "$0.00",
    "items": ["Item name", "..."]
}

Use an empty string for any field you cannot find. Omit "items" if the receipt does not list individual items."#;
