//! Anthropic Messages API client

use async_trait::async_trait;
use parley_core::config::ProviderConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::base::{LLMProvider, LLMResponse, Message, ProviderError, ProviderResult, Usage};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const ERROR_BODY_LIMIT: usize = 200;

/// Messages API request format
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [Message],
}

/// Messages API response format
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Anthropic provider client
pub struct AnthropicClient {
    client: Client,
    api_base: String,
    api_key: String,
    default_model: String,
}

impl AnthropicClient {
    /// Create a new client. An empty `api_base` selects the public endpoint.
    pub fn new(
        api_key: impl Into<String>,
        api_base: Option<String>,
        default_model: impl Into<String>,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        let api_base = api_base
            .filter(|base| !base.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            default_model: default_model.into(),
        })
    }

    /// Create a client from the provider section of the configuration
    pub fn from_config(config: &ProviderConfig, default_model: &str) -> ProviderResult<Self> {
        Self::new(
            config.api_key.clone(),
            Some(config.api_base.clone()),
            default_model,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.api_base)
    }

    /// Take the text of the first content block
    fn parse_response(response: MessagesResponse) -> ProviderResult<LLMResponse> {
        let first = response
            .content
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No content in response".to_string()))?;

        let ContentBlock::Text { text } = first else {
            return Err(ProviderError::InvalidResponse(
                "First content block is not text".to_string(),
            ));
        };

        Ok(LLMResponse {
            content: text,
            stop_reason: response.stop_reason,
            usage: response.usage,
        })
    }

    /// Turn an error body into a short description, preferring the API's
    /// own error message when the body is the standard error envelope.
    fn describe_error(status: StatusCode, body: &str) -> String {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) if !envelope.error.message.is_empty() => {
                format!(
                    "HTTP {} ({}): {}",
                    status, envelope.error.kind, envelope.error.message
                )
            }
            _ => {
                let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
                format!("HTTP {}: {}", status, excerpt)
            }
        }
    }
}

#[async_trait]
impl LLMProvider for AnthropicClient {
    async fn chat(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        model: Option<String>,
        max_tokens: u32,
    ) -> ProviderResult<LLMResponse> {
        let model = model.unwrap_or_else(|| self.default_model.clone());
        let request = MessagesRequest {
            model: &model,
            max_tokens,
            system: system.as_deref().filter(|s| !s.is_empty()),
            messages: &messages,
        };

        debug!(
            model = %model,
            messages = messages.len(),
            "Sending chat request to {}",
            self.api_base
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let description = Self::describe_error(status, &body);
            warn!(status = status.as_u16(), "Chat request failed");
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                ProviderError::RateLimited(description)
            } else {
                ProviderError::ApiError(description)
            });
        }

        let body = response.text().await?;
        let parsed: MessagesResponse = serde_json::from_str(&body)?;
        let reply = Self::parse_response(parsed)?;

        debug!(
            input_tokens = reply.usage.input_tokens,
            output_tokens = reply.usage.output_tokens,
            stop_reason = reply.stop_reason.as_deref().unwrap_or("unknown"),
            "Received chat response"
        );
        Ok(reply)
    }

    fn get_default_model(&self) -> String {
        self.default_model.clone()
    }
}
