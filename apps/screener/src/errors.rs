use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Status, machine-readable code, and user-facing message for a pipeline error.
/// Bad documents are reported as such; broken models are logged and hidden.
pub fn describe_pipeline_error(e: &PipelineError) -> (StatusCode, &'static str, String) {
    match e {
        PipelineError::UnsupportedFormat(format) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_FORMAT",
            format!("Unsupported document format '{format}'. Upload a .txt or .pdf file"),
        ),
        PipelineError::MalformedDocument(_) | PipelineError::DecodeFailure => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "UNPROCESSABLE_DOCUMENT",
            format!("Could not process this document: {e}"),
        ),
        PipelineError::ModelLoad { .. } | PipelineError::DimensionMismatch { .. } => {
            tracing::error!("Classifier deployment error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Pipeline(e) => describe_pipeline_error(e),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
