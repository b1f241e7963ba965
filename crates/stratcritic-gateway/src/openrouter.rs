//! OpenRouter-compatible chat-completion client using raw HTTP.
//!
//! Any gateway that speaks the OpenAI `chat/completions` shape works; only
//! `choices[0].message.content` is read from the response.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Instant;
use tracing::debug;

use crate::{ApiKey, Completion, CompletionProvider, CompletionRequest, GatewayConfig, GatewayError};

pub struct OpenRouterClient {
    client: Client,
    config: GatewayConfig,
}

impl OpenRouterClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn map_send_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.config.timeout)
        } else {
            GatewayError::from(err)
        }
    }

    fn parse_body(body: &str) -> Result<(String, Option<String>), GatewayError> {
        let response: ChatCompletionResponse = serde_json::from_str(body)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(GatewayError::EmptyChoices)?;

        let text = choice.message.content.ok_or_else(|| {
            GatewayError::MalformedResponse("first choice has no message content".to_string())
        })?;

        Ok((text, response.model))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for OpenRouterClient {
    fn name(&self) -> &str {
        "OpenRouter"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        api_key: &ApiKey,
    ) -> Result<Completion, GatewayError> {
        let url = self.config.completions_url();
        let start = Instant::now();

        debug!(
            url = %url,
            model = %request.model,
            max_tokens = request.max_tokens,
            "Sending chat completion"
        );

        let resp = self
            .client
            .post(&url)
            .header("Authorization", api_key.bearer())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Gateway returned error status");
            return Err(GatewayError::from_status(status.as_u16(), body));
        }

        let (text, routed_model) = Self::parse_body(&body)?;

        Ok(Completion::new(text, routed_model, start.elapsed()))
    }
}
