//! Courier - CORS-aware HTTP relay
//!
//! This library provides the core functionality for the Courier relay. It
//! streams arbitrary http(s) resources to browsers under a byte cap and
//! forwards chat completion requests to OpenAI with credential fallback.

pub mod config;
pub mod error;
pub mod middleware;
pub mod proxy;
pub mod routes;
pub mod streaming;

use std::time::Instant;

use anyhow::Result;

pub use crate::config::{Config, CorsMode};
pub use crate::proxy::{FetchRelay, OpenAIClient};
pub use crate::routes::create_router;

/// Application state shared across all request handlers
///
/// Built once at startup and read-only afterwards.
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// Streaming relay behind `/fetch`
    pub fetch_relay: FetchRelay,
    /// Upstream client behind `/openai/chat`
    pub openai: OpenAIClient,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // Initialize HTTP client with connection pooling
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(config.upstream_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        // Both relays share one connection pool
        let fetch_relay = FetchRelay::new(http_client.clone(), &config);
        let openai = OpenAIClient::new(http_client, &config);

        Ok(Self {
            config,
            start_time: Instant::now(),
            fetch_relay,
            openai,
        })
    }
}
