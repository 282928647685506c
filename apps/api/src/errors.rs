use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::client::AnalysisError;

/// Longest slice of an upstream error body echoed back to the caller.
const BODY_EXCERPT_CHARS: usize = 500;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Analysis(AnalysisError::Service {
                status_code,
                raw_body,
            }) => {
                tracing::warn!("Analysis service returned {status_code}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SERVICE_ERROR",
                    format!(
                        "Analysis service returned status {status_code}: {}",
                        excerpt(raw_body)
                    ),
                )
            }
            AppError::Analysis(AnalysisError::Malformed(e)) => {
                tracing::error!("Malformed analysis response: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_RESPONSE",
                    "The analysis service returned an unreadable response. Please try again."
                        .to_string(),
                )
            }
            AppError::Analysis(AnalysisError::Timeout) => (
                StatusCode::GATEWAY_TIMEOUT,
                "SERVICE_TIMEOUT",
                "The analysis service did not respond in time. Please try again.".to_string(),
            ),
            AppError::Analysis(AnalysisError::Http(e)) => {
                tracing::error!("Analysis transport error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SERVICE_UNAVAILABLE",
                    "The analysis service could not be reached. Please try again.".to_string(),
                )
            }
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

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_keeps_short_bodies() {
        assert_eq!(excerpt("  internal error \n"), "internal error");
    }

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let body = "x".repeat(BODY_EXCERPT_CHARS + 20);
        let out = excerpt(&body);
        assert_eq!(out.chars().count(), BODY_EXCERPT_CHARS + 1);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn test_service_error_maps_to_bad_gateway() {
        let err = AppError::Analysis(AnalysisError::Service {
            status_code: 500,
            raw_body: "internal error".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let err = AppError::Conflict("busy".to_string());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let response = AppError::Analysis(AnalysisError::Timeout).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
