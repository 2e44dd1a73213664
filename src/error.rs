//! Error types for Courier
//!
//! Every failure a relay can hit is converted into an HTTP response here, so
//! no error escapes the request that produced it.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Missing API key")]
    Unauthorized,

    /// Upstream answered with a non-success status; the caller receives it as-is
    #[error("Upstream {}", .0.as_u16())]
    UpstreamStatus(StatusCode),

    /// Network-level failure on the fetch relay
    #[error("Fetch failed: {0}")]
    FetchFailed(#[source] reqwest::Error),

    /// Network-level failure on the chat relay
    #[error("Chat proxy failed: {0}")]
    ProxyFailed(#[source] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error details
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

impl AppError {
    /// Status code sent to the caller
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::UpstreamStatus(status) => *status,
            AppError::FetchFailed(_) | AppError::ProxyFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Network and internal failures keep their detail in the logs only
        let (code, message) = match &self {
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg.clone()),
            AppError::Unauthorized => ("UNAUTHORIZED", self.to_string()),
            AppError::UpstreamStatus(_) => ("UPSTREAM_ERROR", self.to_string()),
            AppError::FetchFailed(_) => ("FETCH_FAILED", "Fetch failed".to_string()),
            AppError::ProxyFailed(_) => ("PROXY_FAILED", "openai proxy failed".to_string()),
            AppError::Internal(_) => ("INTERNAL_ERROR", "Internal server error".to_string()),
        };

        (self.status(), Json(ErrorResponse::new(code, message))).into_response()
    }
}

/// Convert a handler panic into a 500 JSON response
///
/// Installed through `CatchPanicLayer` so one faulty request never takes the
/// listener down.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("INTERNAL_ERROR", "Internal server error")),
    )
        .into_response()
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
