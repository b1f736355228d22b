use anyhow::Context;
use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{info, warn};

use super::archive::{ARCHIVE_NAME, zip_outputs};
use super::{AppState, UploadError};
use crate::application::PipelineOptions;

const FILE_FIELD: &str = "csvFile";
const INPUT_FILE: &str = "input.csv";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub success: bool,
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn progress() -> Json<ProgressResponse> {
    Json(ProgressResponse {
        success: true,
        status: "processing",
        message: "Procesando productos...",
    })
}

/// Fields collected from the multipart form
#[derive(Debug, Default)]
struct UploadForm {
    file_name: Option<String>,
    csv: Option<Vec<u8>>,
    concurrency_transform: Option<String>,
    concurrency_images: Option<String>,
    concurrency_descriptions: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, UploadError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                FILE_FIELD => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().unwrap_or_default().to_string();
                    if !is_csv_upload(&content_type, &file_name) {
                        return Err(UploadError::NotCsv);
                    }
                    form.csv = Some(field.bytes().await?.to_vec());
                    form.file_name = Some(file_name);
                }
                "concurrencyTransform" => form.concurrency_transform = Some(field.text().await?),
                "concurrencyImages" => form.concurrency_images = Some(field.text().await?),
                "concurrencyDescriptions" => form.concurrency_descriptions = Some(field.text().await?),
                other => warn!("Ignoring unknown form field {}", other),
            }
        }
        Ok(form)
    }

    fn options(&self, defaults: PipelineOptions) -> PipelineOptions {
        PipelineOptions {
            concurrency_transform: parse_concurrency(
                self.concurrency_transform.as_deref(),
                defaults.concurrency_transform,
            ),
            concurrency_images: parse_concurrency(self.concurrency_images.as_deref(), defaults.concurrency_images),
            concurrency_descriptions: parse_concurrency(
                self.concurrency_descriptions.as_deref(),
                defaults.concurrency_descriptions,
            ),
            ..defaults
        }
    }
}

pub(crate) fn is_csv_upload(content_type: &str, file_name: &str) -> bool {
    content_type == "text/csv" || file_name.to_lowercase().ends_with(".csv")
}

/// Parse a form value, falling back to `default`; the result is at least 1
pub(crate) fn parse_concurrency(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(default)
        .max(1)
}

pub async fn process_products(State(state): State<AppState>, multipart: Multipart) -> Result<Response, UploadError> {
    let form = UploadForm::read(multipart).await?;
    let options = form.options(PipelineOptions::from_config(&state.config.concurrency));
    let Some(csv) = form.csv else {
        return Err(UploadError::MissingFile);
    };
    info!(
        "📥 Received {} ({} bytes), concurrency transform={} images={} descriptions={}",
        form.file_name.as_deref().unwrap_or(INPUT_FILE),
        csv.len(),
        options.concurrency_transform,
        options.concurrency_images,
        options.concurrency_descriptions
    );

    // Removed when `session` drops, on success and on error alike
    let session = tempfile::Builder::new()
        .prefix("session_")
        .tempdir()
        .context("Failed to create session directory")?;
    let input = session.path().join(INPUT_FILE);
    let output_dir = session.path().join("output");
    tokio::fs::write(&input, &csv)
        .await
        .context("Failed to store uploaded catalog")?;

    let summary = state.pipeline.run(&input, &output_dir, &options).await?;
    info!("📦 Packaging {} output files for run {}", summary.files.len(), summary.run_id);

    let archive = tokio::task::spawn_blocking(move || zip_outputs(&output_dir))
        .await
        .context("Archive task failed")?
        .context("Failed to build output archive")?;

    let disposition = format!("attachment; filename=\"{ARCHIVE_NAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive,
    )
        .into_response())
}
