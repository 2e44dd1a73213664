//! Generic fetch relay
//!
//! Fetches an arbitrary http(s) URL on behalf of a browser and streams the
//! body back, bounded by a byte cap.

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};
use reqwest::Url;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    proxy::headers::build_fetch_headers,
    routes::metrics::record_fetch_stream,
    streaming::cap_stream,
};

/// Content type used when the upstream does not send one
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Validate the `url` query parameter
///
/// The target must be an absolute URL with an `http` or `https` scheme.
pub fn parse_target(raw: Option<&str>) -> AppResult<Url> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing url parameter".to_string()))?;

    let url = Url::parse(raw)
        .map_err(|e| AppError::BadRequest(format!("Malformed url: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::BadRequest(format!(
            "Only http/https allowed, got {}",
            other
        ))),
    }
}

/// Streaming GET relay with a byte cap
pub struct FetchRelay {
    client: reqwest::Client,
    user_agent: String,
    max_bytes: u64,
}

impl FetchRelay {
    /// Create a new fetch relay
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_fetch_bytes,
        }
    }

    /// Fetch `target` and stream its body back
    ///
    /// Only the configured user agent is sent upstream. A non-success upstream
    /// status becomes `UpstreamStatus`; a transport failure becomes
    /// `FetchFailed`.
    #[instrument(skip(self), fields(host = %target.host_str().unwrap_or("")))]
    pub async fn relay(&self, target: Url) -> AppResult<Response<Body>> {
        debug!(url = %target, "Fetching upstream");

        let response = self
            .client
            .get(target.clone())
            .headers(build_fetch_headers(&self.user_agent))
            .send()
            .await
            .map_err(|e| {
                error!(url = %target, error = %e, "Fetch relay could not reach upstream");
                AppError::FetchFailed(e)
            })?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        if !status.is_success() {
            warn!(url = %target, status = %status, "Upstream returned non-success status");
            return Err(AppError::UpstreamStatus(status));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));

        info!(
            url = %target,
            status = %status,
            content_type = ?content_type,
            "Streaming upstream body"
        );

        let cap = self.max_bytes;
        let body = cap_stream(response.bytes_stream(), cap, move |summary| {
            if summary.truncated {
                warn!(
                    bytes = summary.bytes_forwarded,
                    cap = cap,
                    "Fetch relay hit byte cap, truncating response"
                );
            }
            record_fetch_stream(summary);
        });

        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, "no-store")
            .body(Body::from_stream(body))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
    }
}
