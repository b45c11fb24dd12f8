use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only failures that leave no recipe producible by any path end up here;
/// per-ingredient and per-lookup failures are absorbed where they happen.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The model source could not be reached or answered with a non-2xx status.
    #[error("LLM error: {0}")]
    Llm(String),

    /// The model answered, but not with a recipe we could decode.
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Parse(_) | LlmError::EmptyContent => AppError::Serialization(err.to_string()),
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error, details) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Invalid request",
                msg.clone(),
            ),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "Recipe creation failed",
                    "We couldn't come up with a recipe right now. Please try again!".to_string(),
                )
            }
            AppError::Serialization(msg) => {
                tracing::error!("Serialization error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERIALIZATION_ERROR",
                    "Recipe format error",
                    "We had trouble formatting your recipe. Please try again!".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Kitchen troubles!",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error,
            "details": details,
            "code": code,
        }));

        (status, body).into_response()
    }
}
