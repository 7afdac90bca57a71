//! Receipt scanner - OCR, LLM extraction, Drive archival and Sheets ledger.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use receipt_scanner::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let default_filter = if cli::is_verbose() {
        "receipt_scanner=debug,receipts=debug"
    } else {
        "receipt_scanner=info,receipts=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::run().await
}
