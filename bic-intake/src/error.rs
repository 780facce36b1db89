//! HTTP error mapping for bic-intake
//!
//! Every failure is returned as `{"error": "<message>"}`.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bic_common::AllocateError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Unreadable or oversized form upload; status chosen by the extractor
    #[error("{message}")]
    Payload { status: StatusCode, message: String },

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Quote was saved but could not be numbered (409); the id is returned
    /// so the caller can retry numbering later
    #[error("{message}")]
    NumberingExhausted { quote_id: String, message: String },

    /// Speech-to-text provider failed (502)
    #[error("Transcription failed: {0}")]
    Upstream(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] bic_common::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Payload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Payload {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<AllocateError> for ApiError {
    fn from(err: AllocateError) -> Self {
        match err {
            AllocateError::QuoteNotFound(id) => ApiError::NotFound(format!("Quote not found: {}", id)),
            AllocateError::Exhausted { .. } => ApiError::Internal(err.to_string()),
            AllocateError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Payload { status, .. } => *status,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NumberingExhausted { .. } => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Common(bic_common::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Common(bic_common::Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Io(_) | ApiError::Common(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = match &self {
            ApiError::NumberingExhausted { quote_id, message } => json!({
                "error": message,
                "id": quote_id,
            }),
            // Input errors already carry a user-facing message
            ApiError::Common(bic_common::Error::InvalidInput(msg)) => json!({ "error": msg }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                ApiError::NumberingExhausted {
                    quote_id: "q".into(),
                    message: "x".into(),
                },
                StatusCode::CONFLICT,
            ),
            (ApiError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (
                ApiError::Common(bic_common::Error::InvalidInput("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Common(bic_common::Error::Internal("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_missing_quote_maps_to_not_found() {
        let err: ApiError = AllocateError::QuoteNotFound("abc".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
