//! OCR output normalization.

/// Trim every line and drop the blank ones.
///
/// Receipts tend to come back from OCR with runs of empty or
/// whitespace-only lines between the useful ones.
pub fn clean_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
