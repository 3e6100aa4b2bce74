//! OpenAI chat-completions gateway.

use super::anthropic::classify_send_error;
use super::LlmSetupError;
use async_trait::async_trait;
use fleet_application::{GatewayError, LlmGateway};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o";

/// Gateway over the OpenAI chat-completions API
pub struct OpenAiGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

impl OpenAiGateway {
    /// Construct from `OPENAI_API_KEY` in the environment.
    pub fn from_env(model: Option<String>, timeout: Duration) -> Result<Self, LlmSetupError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmSetupError::MissingApiKey("OPENAI_API_KEY"))?;
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

    fn first_choice(response: ChatResponse) -> Result<String, GatewayError> {
        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GatewayError::InvalidResponse("no choices in reply".to_string()))
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, GatewayError> {
        debug!("OpenAI call: model={} temp={}", self.model, temperature);

        let body = json!({
            "model": self.model,
            "temperature": temperature,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Self::first_choice(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_choice_extracts_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "hi there"}}]}"#,
        )
        .unwrap();
        assert_eq!(OpenAiGateway::first_choice(response).unwrap(), "hi there");
    }

    #[test]
    fn test_empty_choices_rejected() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(OpenAiGateway::first_choice(response).is_err());
    }
}
