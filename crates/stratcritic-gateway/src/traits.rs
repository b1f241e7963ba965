use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::{ApiKey, Completion, CompletionRequest};

/// Default OpenRouter-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Errors that can occur while talking to the upstream gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Gateway rejected credentials (status {status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("Gateway returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body: {0}")]
    MalformedResponse(String),

    #[error("Response contained no completion choices")]
    EmptyChoices,
}

impl GatewayError {
    /// Map a non-success HTTP status to the matching error variant
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => GatewayError::Unauthorized { status, body },
            _ => GatewayError::Status { status, body },
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::MalformedResponse(err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

/// Connection settings for the gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL; `/chat/completions` is appended
    pub base_url: String,
    /// Per-request timeout enforced by the HTTP client
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl GatewayConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Anything that can turn a chat-completion request into text.
///
/// The HTTP client implements this for real runs; tests substitute
/// deterministic stubs.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable name of the provider (e.g., "OpenRouter")
    fn name(&self) -> &str;

    /// Send one request and return the first completion's text
    async fn complete(
        &self,
        request: &CompletionRequest,
        api_key: &ApiKey,
    ) -> Result<Completion, GatewayError>;
}
