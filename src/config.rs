//! Configuration management using the prefer crate.
//!
//! Settings are layered: built-in defaults, then an optional config file
//! (TOML, YAML or JSON), then environment variables. Command-line flags are
//! applied by the caller on top of the result.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::llm::LlmConfig;
use crate::ocr::OcrConfig;

/// Default directory for locally stored uploads.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
/// Default spreadsheet title.
pub const DEFAULT_SHEET_NAME: &str = "EXPENSE LOG";
/// Default Drive folder name for archived images.
pub const DEFAULT_DRIVE_FOLDER: &str = "Receipt Images";
/// Default timeout for outbound HTTP requests, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 120;
/// Default request body limit for uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory uploads are written to before archival.
    pub upload_dir: PathBuf,
    /// Title of the ledger spreadsheet.
    pub sheet_name: String,
    /// Drive folder receipts are archived into.
    pub drive_folder: String,
    /// Google service-account key file.
    pub credentials_path: Option<PathBuf>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Maximum accepted request body size.
    pub max_upload_bytes: usize,
    pub ocr: OcrConfig,
    pub llm: LlmConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            drive_folder: DEFAULT_DRIVE_FOLDER.to_string(),
            credentials_path: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            ocr: OcrConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Settings {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `RECEIPT_UPLOAD_DIR`, `RECEIPT_SHEET_NAME`, `RECEIPT_DRIVE_FOLDER`
    /// - `GOOGLE_CREDS_PATH`: service-account JSON key
    /// - `RECEIPT_REQUEST_TIMEOUT`: seconds
    /// - `RECEIPT_MAX_UPLOAD_BYTES`
    /// - the `TESSERACT_*` and `LLM_*` variables of the nested configs
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok().filter(|s| !s.is_empty()))
    }

    pub(crate) fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = var("RECEIPT_UPLOAD_DIR") {
            self.upload_dir = expand_path(&dir);
        }
        if let Some(name) = var("RECEIPT_SHEET_NAME") {
            self.sheet_name = name;
        }
        if let Some(folder) = var("RECEIPT_DRIVE_FOLDER") {
            self.drive_folder = folder;
        }
        if let Some(path) = var("GOOGLE_CREDS_PATH") {
            self.credentials_path = Some(expand_path(&path));
        }
        if let Some(secs) = var("RECEIPT_REQUEST_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.request_timeout = secs;
        }
        if let Some(bytes) = var("RECEIPT_MAX_UPLOAD_BYTES").and_then(|v| v.parse().ok()) {
            self.max_upload_bytes = bytes;
        }
        self.ocr = self.ocr.with_overrides_from(&var);
        self.llm = self.llm.with_overrides_from(&var);
        self
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_folder: Option<String>,
    /// Service-account key file, relative to the config file if not absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover a `receipt-scanner` config file in the standard locations.
    ///
    /// A missing or unreadable file yields the defaults.
    pub async fn load() -> Self {
        match prefer::load("receipt-scanner").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config file {}: {:#}", path.display(), e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// The format follows the file extension; anything unknown is read as JSON.
    pub async fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).context("Failed to parse TOML config")?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).context("Failed to parse YAML config")?
            }
            _ => serde_json::from_str(&contents).context("Failed to parse JSON config")?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Directory relative paths in the file are resolved against.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let path = expand_path(path_str);
        if path.is_absolute() {
            path
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref dir) = self.upload_dir {
            settings.upload_dir = self.resolve_path(dir, base_dir);
        }
        if let Some(ref name) = self.sheet_name {
            settings.sheet_name = name.clone();
        }
        if let Some(ref folder) = self.drive_folder {
            settings.drive_folder = folder.clone();
        }
        if let Some(ref creds) = self.credentials_path {
            settings.credentials_path = Some(self.resolve_path(creds, base_dir));
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(bytes) = self.max_upload_bytes {
            settings.max_upload_bytes = bytes;
        }
        settings.ocr = self.ocr.clone();
        settings.llm = self.llm.clone();
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Load settings: `config_path` if given (errors are fatal), otherwise a
/// discovered config file, then environment overrides.
pub async fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let config = match config_path {
        Some(path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    if let Some(ref path) = config.source_path {
        tracing::debug!("Using config file {}", path.display());
    }

    let base_dir = match config.base_dir() {
        Some(dir) => dir,
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    Ok(settings.with_env_overrides())
}
