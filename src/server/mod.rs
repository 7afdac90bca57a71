//! HTTP front end for the receipt pipeline.
//!
//! - `GET /`: readiness string
//! - `POST /scan-receipt`: multipart upload (`file` field), returns the
//!   extracted record

mod error;
mod handlers;
mod routes;

pub use routes::create_router;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::services::ReceiptPipeline;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReceiptPipeline>,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            pipeline: Arc::new(ReceiptPipeline::from_settings(settings)?),
            max_upload_bytes: settings.max_upload_bytes,
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let listener = bind_listener(host, port).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Bind `host` (an IP literal or a resolvable name like `localhost`) and `port`.
async fn bind_listener(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))
}
