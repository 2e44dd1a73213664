//! Origin guard middleware
//!
//! Attaches CORS headers according to the configured mode and answers every
//! `OPTIONS` request with an empty 204. Requests from origins outside the
//! allow-list are still served; the browser blocks them on its side.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{config::CorsMode, AppState};

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// CORS response headers for a request carrying `origin`
pub fn cors_headers(mode: &CorsMode, origin: Option<&HeaderValue>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let allow_origin = match mode {
        CorsMode::Wildcard => Some(HeaderValue::from_static("*")),
        CorsMode::AllowList(allowed) => {
            // Responses differ per origin, so caches must key on it
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
            origin
                .filter(|o| o.to_str().map(|o| allowed.contains(o)).unwrap_or(false))
                .cloned()
        }
    };

    if let Some(value) = allow_origin {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
    }

    headers
}

/// Origin guard
///
/// Runs in front of every route, including the fallback, so preflight for any
/// path is handled here without reaching a relay.
pub async fn origin_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request.headers().get(header::ORIGIN).cloned();
    let cors = cors_headers(&state.config.cors, origin.as_ref());

    if origin.is_some() && !cors.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN) {
        debug!(origin = ?origin, "Origin not in allow-list, omitting CORS headers");
    }

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    response.headers_mut().extend(cors);
    response
}
