//! Health check endpoint
//!
//! The relay has no dependencies to probe; a response means the listener is up.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{config::CorsMode, AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
    /// `wildcard` or `allow-list`
    pub cors_mode: &'static str,
    /// Whether a server-side chat key is configured
    pub fallback_key: bool,
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        cors_mode: match state.config.cors {
            CorsMode::Wildcard => "wildcard",
            CorsMode::AllowList(_) => "allow-list",
        },
        fallback_key: state.config.openai_api_key.is_some(),
    })
}
