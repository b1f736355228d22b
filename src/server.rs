//! HTTP upload server
//!
//! Accepts a catalog CSV over multipart, runs the enrichment pipeline in a
//! session-scoped temporary directory and answers with the zipped workbooks.

pub mod archive;
pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::application::EnrichmentPipeline;
use crate::infrastructure::AppConfig;

pub use error::{ErrorBody, UploadError};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<EnrichmentPipeline>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pipeline: EnrichmentPipeline, config: AppConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/products/process", post(handlers::process_products))
        .route("/api/products/progress", get(handlers::progress))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind to `bind` and serve until the process is stopped
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address {bind}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🚀 Upload server listening on http://{}", addr);
    axum::serve(listener, router(state))
        .await
        .context("Server shutdown")?;
    Ok(())
}
