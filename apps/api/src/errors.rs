use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::verdict::VerdictError;
use crate::llm_client::LlmError;

/// Message returned for 5xx errors when error details are withheld from callers.
pub const GENERIC_FAILURE_MESSAGE: &str = "Resume analysis failed";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Only PDF allowed")]
    UnsupportedMediaType(String),

    #[error("Unexpected field")]
    UnexpectedField(String),

    #[error("{0}")]
    Multipart(String),

    #[error("{0}")]
    Storage(#[from] std::io::Error),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Verdict(#[from] VerdictError),

    #[error("Analysis timed out after {0}s")]
    Timeout(u64),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoFile => StatusCode::BAD_REQUEST,
            // The upload layer reports these as failures, not client errors.
            AppError::UnsupportedMediaType(_)
            | AppError::UnexpectedField(_)
            | AppError::Multipart(_)
            | AppError::Storage(_)
            | AppError::Llm(_)
            | AppError::Verdict(_)
            | AppError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the `{ error: true, message }` body.
    /// With `expose_details` off, 5xx messages are replaced by a generic one;
    /// the full error is always logged.
    pub fn into_client_response(self, expose_details: bool) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            match &self {
                AppError::UnsupportedMediaType(media_type) => {
                    tracing::warn!(media_type = %media_type, "Rejected non-PDF upload");
                }
                AppError::UnexpectedField(field) => {
                    tracing::warn!(field = %field, "Rejected unexpected file field");
                }
                other => tracing::error!("Analyze request failed: {other:?}"),
            }
            if expose_details {
                self.to_string()
            } else {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": true,
            "message": message
        }));

        (status, body).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_client_response(true)
    }
}
