use crate::config::Config;
use crate::engine::OcrEngine;
use crate::engines;
use crate::error::ScanError;
use crate::preprocessing::Pipeline;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tempfile::NamedTempFile;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn OcrEngine>,
    pub pipeline: Arc<Pipeline>,
    pub config: Arc<Config>,
}

/// Scan response
#[derive(Serialize)]
pub struct ScanResponse {
    pub text: String,
    pub confidence: f32,
    /// Whether a receipt boundary was located and cropped to
    pub cropped: bool,
    pub processing_time_ms: u64,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness message for the root route
#[derive(Serialize)]
pub struct HomeResponse {
    pub message: String,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let engine = engines::build(&config)?;
    let pipeline = Pipeline::with_options(config.pipeline_options());
    let addr = format!("{}:{}", config.host, config.port);
    let max_file_size = config.max_file_size;

    let state = AppState {
        engine,
        pipeline: Arc::new(pipeline),
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/", get(handle_home))
        .route("/upload_receipt", post(handle_upload))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle receipt uploads
async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScanResponse>, ScanError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ScanError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "receipt" {
            content_type = field.content_type().map(|s| s.to_string());
            file_data = Some(field.bytes().await.map_err(|e| {
                ScanError::InvalidRequest(format!("Failed to read file data: {}", e))
            })?);
        }
        // Ignore unknown fields
    }

    let data = file_data.ok_or(ScanError::MissingFile)?;

    if data.len() > state.config.max_file_size {
        return Err(ScanError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    let mime = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    if !mime.starts_with("image/") {
        tracing::warn!("Received file with content type: {}", mime);
    }

    // Upload lands in a temp file removed when this handler returns,
    // success or failure.
    let mut upload = tempfile::Builder::new()
        .suffix(extension_for_mime(&mime))
        .tempfile()
        .map_err(|e| ScanError::Internal(format!("Failed to create temp file: {}", e)))?;
    upload
        .write_all(&data)
        .map_err(|e| ScanError::Internal(format!("Failed to write temp file: {}", e)))?;

    // Per-request artifact paths; no two requests ever share one.
    let crop_artifact = artifact_file(&state.config, "receipt-crop-")?;
    let enhance_artifact = artifact_file(&state.config, "receipt-enhanced-")?;

    let processed = state.pipeline.process(
        upload.path(),
        crop_artifact.path(),
        enhance_artifact.path(),
    )?;
    let cropped = processed.cropped;

    if state.config.artifact_dir.is_some() {
        if cropped {
            persist_artifact(crop_artifact, "cropped");
        }
        persist_artifact(enhance_artifact, "enhanced");
    }

    let enhanced = image::DynamicImage::ImageLuma8(processed.image);
    let result = state.engine.recognize(&enhanced)?;

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Scan completed in {}ms, confidence: {:.2}, text length: {}, cropped: {}",
        processing_time_ms,
        result.confidence,
        result.text.len(),
        cropped
    );

    Ok(Json(ScanResponse {
        text: result.text,
        confidence: result.confidence,
        cropped,
        processing_time_ms,
    }))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle root requests
async fn handle_home() -> impl IntoResponse {
    Json(HomeResponse {
        message: "Receipt OCR server is running".to_string(),
    })
}

/// Create a unique artifact file, in the configured directory when one is
/// set, otherwise alongside the other temp files.
fn artifact_file(config: &Config, prefix: &str) -> Result<NamedTempFile, ScanError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(prefix).suffix(".png");

    let file = match &config.artifact_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(|e| ScanError::Internal(format!("Failed to create artifact file: {}", e)))?;

    Ok(file)
}

/// Keep an artifact on disk instead of letting it be cleaned up.
fn persist_artifact(file: NamedTempFile, label: &str) {
    match file.keep() {
        Ok((_, path)) => tracing::info!("{} artifact kept at {}", label, path.display()),
        Err(e) => tracing::warn!("failed to keep {} artifact: {}", label, e),
    }
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        "image/gif" => ".gif",
        "image/bmp" => ".bmp",
        "image/webp" => ".webp",
        "image/tiff" => ".tiff",
        _ => ".tmp",
    }
}
