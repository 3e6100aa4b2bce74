//! LLM provider adapters.
//!
//! Two providers are supported, selected by configuration: Anthropic
//! (default) and OpenAI. Both adapters implement the application's
//! [`LlmGateway`] port over plain HTTPS with a per-call timeout.

pub mod anthropic;
pub mod openai;

use crate::config::file_config::LlmConfig;
use anthropic::AnthropicGateway;
use fleet_application::LlmGateway;
use openai::OpenAiGateway;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors constructing a gateway from configuration
#[derive(Error, Debug)]
pub enum LlmSetupError {
    #[error("Unsupported provider: {0}. Choose 'openai' or 'anthropic'")]
    UnsupportedProvider(String),

    #[error("{0} not found in environment")]
    MissingApiKey(&'static str),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Build the configured provider's gateway.
pub fn build_gateway(config: &LlmConfig) -> Result<Arc<dyn LlmGateway>, LlmSetupError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicGateway::from_env(
            config.model.clone(),
            timeout,
        )?)),
        "openai" => Ok(Arc::new(OpenAiGateway::from_env(
            config.model.clone(),
            timeout,
        )?)),
        other => Err(LlmSetupError::UnsupportedProvider(other.to_string())),
    }
}
