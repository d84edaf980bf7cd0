use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::recovery::RecoveryError;
use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{ "detail": "..." }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unreadable document: {0}")]
    UnreadableDocument(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed completion")]
    MalformedCompletion,

    #[error("Unexpected completion shape: {0}")]
    UnexpectedShape(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        AppError::UnreadableDocument(e.to_string())
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::UpstreamUnavailable(e.to_string())
    }
}

impl From<RecoveryError> for AppError {
    fn from(e: RecoveryError) -> Self {
        match e {
            RecoveryError::MalformedCompletion => AppError::MalformedCompletion,
            RecoveryError::UnexpectedShape(reason) => AppError::UnexpectedShape(reason),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::UnreadableDocument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body is too large. Please upload a smaller PDF.".to_string(),
            ),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method Not Allowed. Only POST requests are accepted for this endpoint."
                    .to_string(),
            ),
            AppError::UpstreamUnavailable(msg) => {
                tracing::error!("Completion service error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The AI analysis service is unavailable. Please try again later.".to_string(),
                )
            }
            AppError::MalformedCompletion => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to parse AI response into expected format. Please try again later."
                    .to_string(),
            ),
            AppError::UnexpectedShape(reason) => {
                tracing::error!("Completion had an unexpected shape: {reason}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI response did not contain the expected analysis. Please try again later."
                        .to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred during resume analysis.".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        let response = AppError::InvalidRequest("missing".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::UnreadableDocument("empty".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_server_errors_map_to_500() {
        for err in [
            AppError::UpstreamUnavailable("timeout".into()),
            AppError::MalformedCompletion,
            AppError::UnexpectedShape("array".into()),
            AppError::Internal(anyhow::anyhow!("boom")),
        ] {
            assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_recovery_errors_keep_their_classification() {
        assert!(matches!(
            AppError::from(RecoveryError::MalformedCompletion),
            AppError::MalformedCompletion
        ));
        assert!(matches!(
            AppError::from(RecoveryError::UnexpectedShape("x".into())),
            AppError::UnexpectedShape(_)
        ));
    }
}
