//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod scan;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::load_settings;

#[derive(Parser)]
#[command(name = "receipts")]
#[command(about = "Scan receipts into a Google Sheets expense ledger")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind: PORT, HOST, or HOST:PORT
        #[arg(short, long, default_value = "0.0.0.0:5000")]
        bind: String,
    },

    /// Run a local receipt image through the full pipeline
    Scan {
        /// Image file to scan
        file: PathBuf,
    },

    /// Print the cleaned OCR text of an image
    Ocr {
        /// Image file to recognize
        file: PathBuf,
    },

    /// Check that tesseract, credentials and the LLM key are set up
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Scan { file } => scan::cmd_scan(&settings, &file).await,
        Commands::Ocr { file } => scan::cmd_ocr(&settings, &file).await,
        Commands::Check => check::cmd_check(&settings).await,
    }
}
