//! Configuration management for Courier
//!
//! Configuration is loaded once from environment variables and is immutable
//! afterwards. Handlers receive it through the shared application state.

use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use axum::http::HeaderValue;

/// Default byte cap for the fetch relay (25 MiB)
pub const DEFAULT_MAX_FETCH_BYTES: u64 = 25 * 1024 * 1024;

/// Default request body limit for the chat relay (8 MiB)
pub const DEFAULT_CHAT_BODY_LIMIT_BYTES: usize = 8 * 1024 * 1024;

/// User agent sent with every fetch relay request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (LocalFetcher)";

/// How cross-origin access is granted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsMode {
    /// Every origin may read responses (`Access-Control-Allow-Origin: *`)
    Wildcard,
    /// Only the listed origins receive CORS headers
    AllowList(HashSet<String>),
}

impl CorsMode {
    /// Parse a comma separated origin list. Empty input or `*` means wildcard.
    pub fn parse(raw: &str) -> Self {
        let origins: HashSet<String> = raw
            .split(',')
            .map(|o| o.trim().trim_end_matches('/'))
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.contains("*") {
            CorsMode::Wildcard
        } else {
            CorsMode::AllowList(origins)
        }
    }
}

/// Defaults merged into chat requests that omit them
#[derive(Debug, Clone, PartialEq)]
pub struct ChatDefaults {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for ChatDefaults {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 800,
            temperature: 0.2,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// CORS policy applied by the origin guard
    pub cors: CorsMode,

    /// OpenAI API URL
    pub openai_api_url: String,
    /// Server-side key used when the caller sends no bearer token
    pub openai_api_key: Option<String>,
    pub chat_defaults: ChatDefaults,
    /// Largest accepted chat request body
    pub chat_body_limit_bytes: usize,

    /// Hard cap on bytes relayed by `/fetch`
    pub max_fetch_bytes: u64,
    pub user_agent: String,

    /// Total time allowed for an upstream exchange, body included
    pub upstream_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
            cors: CorsMode::Wildcard,
            openai_api_url: "https://api.openai.com/v1".to_string(),
            openai_api_key: None,
            chat_defaults: ChatDefaults::default(),
            chat_body_limit_bytes: DEFAULT_CHAT_BODY_LIMIT_BYTES,
            max_fetch_bytes: DEFAULT_MAX_FETCH_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            upstream_timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("COURIER_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw.parse().context("Invalid COURIER_PORT")?,
            None => defaults.port,
        };

        let chat_defaults = ChatDefaults {
            model: lookup("COURIER_DEFAULT_MODEL").unwrap_or(defaults.chat_defaults.model),
            max_tokens: parse_or(
                &lookup,
                "COURIER_DEFAULT_MAX_TOKENS",
                defaults.chat_defaults.max_tokens,
            )?,
            temperature: parse_or(
                &lookup,
                "COURIER_DEFAULT_TEMPERATURE",
                defaults.chat_defaults.temperature,
            )?,
        };

        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        if let Some(key) = &openai_api_key {
            if HeaderValue::from_str(&format!("Bearer {}", key)).is_err() {
                bail!("Invalid OPENAI_API_KEY: not usable in an Authorization header");
            }
        }

        Ok(Self {
            host: lookup("COURIER_HOST").unwrap_or(defaults.host),
            port,

            cors: lookup("COURIER_ALLOWED_ORIGINS")
                .map(|raw| CorsMode::parse(&raw))
                .unwrap_or(CorsMode::Wildcard),

            openai_api_url: lookup("OPENAI_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_api_url),
            openai_api_key,
            chat_defaults,
            chat_body_limit_bytes: parse_or(
                &lookup,
                "COURIER_CHAT_BODY_LIMIT_BYTES",
                defaults.chat_body_limit_bytes,
            )?,

            max_fetch_bytes: parse_or(&lookup, "COURIER_MAX_FETCH_BYTES", defaults.max_fetch_bytes)?,
            user_agent: lookup("COURIER_USER_AGENT").unwrap_or(defaults.user_agent),

            upstream_timeout: Duration::from_secs(parse_or(
                &lookup,
                "COURIER_UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout.as_secs(),
            )?),
            connect_timeout: Duration::from_secs(parse_or(
                &lookup,
                "COURIER_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout.as_secs(),
            )?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}", key)),
        None => Ok(default),
    }
}
