use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::{LlmError, SettingsError};
use crate::rubric::table_parser::ParseError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No API key configured. Supply `api_key` or set GROQ_API_KEY.")]
    MissingCredential,

    #[error("Validation error: {0}")]
    Validation(String),

    /// Completion API failure. The message is shown to the caller as-is.
    #[error("Error in generating LLM output: {0}")]
    Upstream(String),

    #[error("Failed to parse the generated rubric: {message}")]
    ParseFailure { message: String, raw: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<SettingsError> for AppError {
    fn from(e: SettingsError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl AppError {
    pub fn parse_failure(err: ParseError, raw: impl Into<String>) -> Self {
        AppError::ParseFailure {
            message: err.to_string(),
            raw: raw.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, raw) = match &self {
            AppError::MissingCredential => (
                StatusCode::UNAUTHORIZED,
                "MISSING_CREDENTIAL",
                self.to_string(),
                None,
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Upstream(msg) => {
                tracing::error!("Completion API error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", self.to_string(), None)
            }
            AppError::ParseFailure { message, raw } => {
                tracing::warn!("Rubric parse failure: {message}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "PARSE_FAILURE",
                    self.to_string(),
                    Some(raw.clone()),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(raw) = raw {
            error["raw"] = json!(raw);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
