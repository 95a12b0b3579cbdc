use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::generation::GenerationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The `Display` text of each variant is exactly what the client sees in
/// the `{"error": ...}` body, so upstream diagnostics reach the caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Extraction(_) | AppError::Generation(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Unauthorized(msg) | AppError::Validation(msg) => {
                tracing::warn!("Rejected request: {msg}");
            }
            AppError::Extraction(e) => tracing::error!("Extraction error: {e}"),
            AppError::Generation(e) => tracing::error!("Generation error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
        }

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}
