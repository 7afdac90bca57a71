//! Forward-only stages a receipt passes through while being scanned.

use serde::Serialize;

/// Pipeline stage identifier.
///
/// Stages only ever advance; a failure at any point aborts the remainder
/// without revisiting earlier stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
    Received,
    Saved,
    Archived,
    Recognized,
    Extracted,
    Recorded,
}

impl ScanStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Saved => "saved",
            Self::Archived => "archived",
            Self::Recognized => "recognized",
            Self::Extracted => "extracted",
            Self::Recorded => "recorded",
        }
    }
}

impl std::fmt::Display for ScanStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
