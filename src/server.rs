use crate::config::Config;
use crate::error::OcrError;
use crate::ocr::{ConfidenceReport, OcrProcessor};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<OcrProcessor>,
    pub config: Arc<Config>,
}

/// Successful upload response
#[derive(Serialize)]
pub struct UploadResponse {
    pub text: String,
    pub confidence: ConfidenceReport,
    pub filename: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><title>SnapText</title></head>
<body>
<h1>SnapText</h1>
<p>Extract text from images. Upload an image below.</p>
<form action="/upload" method="post" enctype="multipart/form-data">
<input type="file" name="file">
<button type="submit">Extract</button>
</form>
</body>
</html>
"#;

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let processor = OcrProcessor::with_tesseract(&config.language);
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        processor: Arc::new(processor),
        config: Arc::new(config),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router; split out so tests can drive it in-process.
pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/", get(handle_index))
        .route("/upload", post(handle_upload))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Handle an image upload: stage the file, extract text, score confidence.
async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, OcrError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OcrError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                file_data = Some(field.bytes().await.map_err(|e| {
                    OcrError::InvalidRequest(format!("Failed to read file data: {}", e))
                })?);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let data = file_data.ok_or(OcrError::MissingFile)?;
    let filename = filename.unwrap_or_default();
    if filename.is_empty() {
        return Err(OcrError::EmptyFilename);
    }
    if data.is_empty() {
        return Err(OcrError::InvalidRequest("Empty file".to_string()));
    }
    if data.len() > state.config.max_file_size {
        return Err(OcrError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    tracing::info!(filename = %filename, bytes = data.len(), "processing upload");

    // Stage the upload with its original extension; the temp file is removed
    // when this guard drops, on success and failure alike.
    let suffix = Path::new(&filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| ".tmp".to_string());

    let mut temp_file = tempfile::Builder::new()
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| OcrError::Internal(format!("Failed to create temp file: {}", e)))?;

    temp_file
        .write_all(&data)
        .map_err(|e| OcrError::Internal(format!("Failed to write temp file: {}", e)))?;

    let text = state
        .processor
        .extract_text(temp_file.path())
        .map_err(|e| {
            tracing::error!(filename = %filename, error = %e, "text extraction failed");
            e.into_extraction()
        })?;

    let confidence = state.processor.confidence(temp_file.path());

    tracing::info!(
        filename = %filename,
        elapsed_ms = start.elapsed().as_millis() as u64,
        chars = text.chars().count(),
        "upload processed"
    );

    Ok(Json(UploadResponse {
        text,
        confidence,
        filename,
    }))
}

async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
