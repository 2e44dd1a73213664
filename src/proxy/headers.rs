//! Header utilities for upstream requests
//!
//! Credential resolution for the chat relay and the minimal header sets sent
//! upstream. Caller headers are never copied wholesale.

use axum::http::{header, HeaderMap as InboundHeaders};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};

use crate::error::{AppError, AppResult};

/// Return the token of a `Bearer <token>` header value
///
/// The scheme is matched case-sensitively and an empty token counts as absent.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Pick the API key for an upstream chat call
///
/// A caller-supplied bearer token wins over the server-side fallback key.
pub fn resolve_api_key<'a>(
    inbound: &'a InboundHeaders,
    fallback: Option<&'a str>,
) -> AppResult<&'a str> {
    inbound
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .or(fallback)
        .ok_or(AppError::Unauthorized)
}

/// Headers for a chat completion request
///
/// Caller tokens come from a valid header and the server key is checked at
/// startup, so a failure here is an internal fault.
pub fn build_chat_headers(api_key: &str) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
        .map_err(|_| AppError::Internal(anyhow::anyhow!("API key is not a valid header value")))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(headers)
}

/// Headers for a fetch relay request
pub fn build_fetch_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let agent = HeaderValue::from_str(user_agent)
        .unwrap_or_else(|_| HeaderValue::from_static(crate::config::DEFAULT_USER_AGENT));
    headers.insert(USER_AGENT, agent);
    headers
}
