//! LLM Gateway port
//!
//! Defines the interface for the router's four prompted calls (validate,
//! plan, analyse, aggregate). Implementations (adapters) live in the
//! infrastructure layer.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("cancelled")]
    Cancelled,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for LLM completion calls
///
/// Implementations must be safe to call concurrently; the gateway holds no
/// per-run state.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send a system + user prompt pair and return the model's text reply
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, GatewayError>;
}
