//! Proxy module
//!
//! Handles request forwarding to upstream services.

pub mod fetch;
pub mod headers;
pub mod openai;

pub use fetch::FetchRelay;
pub use openai::OpenAIClient;
