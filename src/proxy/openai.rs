//! OpenAI chat completion client
//!
//! Forwards a chat completion request and hands the upstream answer back
//! untouched, error payloads included.

use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    proxy::headers::build_chat_headers,
};

/// OpenAI chat completions client
pub struct OpenAIClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.openai_api_url.clone(),
        }
    }

    /// Full URL of the chat completions endpoint
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// POST `request` to the chat completions endpoint using `api_key`
    ///
    /// Any HTTP answer from upstream is relayed with its status and body as-is.
    /// Only a failure to reach upstream or to read its body is an error.
    #[instrument(skip(self, api_key, request))]
    pub async fn chat_completions<T: Serialize>(
        &self,
        api_key: &str,
        request: &T,
    ) -> AppResult<Response<Body>> {
        let url = self.chat_completions_url();

        let response = self
            .client
            .post(&url)
            .headers(build_chat_headers(api_key)?)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Failed to send request to OpenAI");
                AppError::ProxyFailed(e)
            })?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);

        let body = response.bytes().await.map_err(|e| {
            error!(url = %url, status = %status, error = %e, "Failed to read OpenAI response");
            AppError::ProxyFailed(e)
        })?;

        debug!(url = %url, status = %status, body_len = body.len(), "Received response from OpenAI");
        if !status.is_success() {
            info!(status = %status, "Relaying OpenAI error response");
        }

        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
    }
}
