//! Anthropic messages-API gateway.

use super::LlmSetupError;
use async_trait::async_trait;
use fleet_application::{GatewayError, LlmGateway};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Gateway over the Anthropic messages API
pub struct AnthropicGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicGateway {
    /// Construct from `ANTHROPIC_API_KEY` in the environment.
    pub fn from_env(model: Option<String>, timeout: Duration) -> Result<Self, LlmSetupError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| LlmSetupError::MissingApiKey("ANTHROPIC_API_KEY"))?;
        Self::new(api_key, model, timeout)
    }

    pub fn new(
        api_key: String,
        model: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmSetupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmSetupError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn collect_text(response: MessagesResponse) -> Result<String, GatewayError> {
        let text = response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() {
            return Err(GatewayError::InvalidResponse(
                "no text content in reply".to_string(),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmGateway for AnthropicGateway {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, GatewayError> {
        debug!("Anthropic call: model={} temp={}", self.model, temperature);

        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": temperature,
            "system": system,
            "messages": [{"role": "user", "content": user}],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "{}: {}",
                status,
                detail.trim()
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Self::collect_text(parsed)
    }
}

pub(super) fn classify_send_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}
