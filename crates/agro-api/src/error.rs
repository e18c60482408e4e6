//! API error types and JSON error response formatting.
//!
//! ApiError gives every endpoint the same `{error, message}` body and maps
//! chat and core errors onto HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use agro_chat::ChatError;
use agro_core::error::AgroError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 404 Not Found - unknown session.
    NotFound(String),
    /// 409 Conflict - the session is not ready for this request.
    Conflict(String),
    /// 429 Too Many Requests.
    TooManyRequests(String),
    /// 502 Bad Gateway - the embedding or LLM service failed.
    Upstream(String),
    /// 500 Internal Server Error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::TooManyRequests(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "too_many_requests", msg)
            }
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), %message, "Request failed");
        }

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::QuestionTooLong(_) => ApiError::BadRequest(err.to_string()),
            ChatError::NoCropSelected => {
                ApiError::Conflict("select a crop before asking a question".to_string())
            }
            ChatError::Retrieval(_) | ChatError::Llm(_) => ApiError::Upstream(err.to_string()),
            ChatError::Template(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<AgroError> for ApiError {
    fn from(err: AgroError) -> Self {
        match &err {
            AgroError::Embedding(_) => ApiError::Upstream(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
