use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Recognition engine call failed: {0}")]
    Engine(String),

    #[error("Failed to extract text: {0}")]
    Extraction(String),

    #[error("Preprocessing failed: {0}")]
    #[allow(dead_code)]
    Preprocessing(String),

    #[error("No file uploaded")]
    MissingFile,

    #[error("Empty filename")]
    EmptyFilename,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    /// Collapse any processing failure into the upload-facing extraction
    /// error, keeping an existing extraction error as-is.
    pub fn into_extraction(self) -> OcrError {
        match self {
            err @ OcrError::Extraction(_) => err,
            err => OcrError::Extraction(err.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        let status = match &self {
            OcrError::Decode(_) => StatusCode::BAD_REQUEST,
            OcrError::MissingFile => StatusCode::BAD_REQUEST,
            OcrError::EmptyFilename => StatusCode::BAD_REQUEST,
            OcrError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            OcrError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            OcrError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OcrError::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OcrError::Preprocessing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OcrError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
