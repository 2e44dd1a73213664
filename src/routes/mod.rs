//! HTTP routes for Courier
//!
//! This module defines all HTTP endpoints exposed by the relay.

pub mod chat;
pub mod fetch;
pub mod health;
pub mod metrics;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    error::{panic_response, ErrorResponse},
    middleware::origin::origin_guard,
    AppState,
};

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/fetch", get(fetch::fetch))
        .route(
            "/openai/chat",
            post(chat::chat).layer(DefaultBodyLimit::max(state.config.chat_body_limit_bytes)),
        )
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics));

    with_request_boundary(routes, state.clone()).with_state(state)
}

/// Wrap `router` in the layers every request passes through
///
/// Layers run outermost first: tracing, then the origin guard, then panic
/// recovery, so even a 500 from a panicking handler carries CORS headers. The
/// fallback is added here so preflight to unknown paths still reaches the
/// guard.
pub fn with_request_boundary(
    router: Router<Arc<AppState>>,
    state: Arc<AppState>,
) -> Router<Arc<AppState>> {
    router
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(state, origin_guard))
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("NOT_FOUND", "No such route")),
    )
}
