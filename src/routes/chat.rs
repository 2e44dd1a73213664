//! Chat relay endpoint
//!
//! `POST /openai/chat` forwards a chat completion request to OpenAI using the
//! caller's bearer token or the server-side key, and relays the answer as-is.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    config::ChatDefaults,
    error::{AppError, AppResult},
    proxy::headers::resolve_api_key,
    routes::metrics::record_request,
    AppState,
};

/// Chat request as sent by the caller
///
/// Messages stay opaque JSON so they reach upstream exactly as received,
/// explicit nulls and tool call fields included.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    pub model: Option<String>,
    pub messages: Option<Vec<Value>>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

/// Chat request as sent upstream, with defaults filled in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamChatRequest {
    pub model: String,
    pub messages: Vec<Value>,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl ChatRequest {
    /// Parse a request body. An empty body reads as an empty object.
    pub fn from_slice(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))
    }

    /// Validate `messages` and merge in defaults for omitted fields
    pub fn into_upstream(self, defaults: &ChatDefaults) -> AppResult<UpstreamChatRequest> {
        let messages = self
            .messages
            .filter(|m| !m.is_empty())
            .ok_or_else(|| AppError::BadRequest("messages must be a non-empty array".to_string()))?;

        Ok(UpstreamChatRequest {
            model: self.model.unwrap_or_else(|| defaults.model.clone()),
            messages,
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
        })
    }
}

/// Handle chat relay requests
pub async fn chat(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    let start_time = Instant::now();

    let response = match relay_chat(&state, &headers, &body).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Chat relay request failed");
            e.into_response()
        }
    };

    record_request(
        "/openai/chat",
        response.status().as_u16(),
        start_time.elapsed().as_secs_f64(),
    );
    response
}

async fn relay_chat(state: &AppState, headers: &HeaderMap, body: &[u8]) -> AppResult<Response> {
    let request = ChatRequest::from_slice(body)?;
    let api_key = resolve_api_key(headers, state.config.openai_api_key.as_deref())?;
    let upstream = request.into_upstream(&state.config.chat_defaults)?;

    info!(
        model = %upstream.model,
        messages = upstream.messages.len(),
        max_tokens = upstream.max_tokens,
        "Relaying chat completion"
    );

    state.openai.chat_completions(api_key, &upstream).await
}
