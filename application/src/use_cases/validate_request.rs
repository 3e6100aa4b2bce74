//! Validate Request use case (guardrails).
//!
//! Classifies an inbound request as in-scope or out-of-scope via one LLM
//! call. This gate fails closed: any gateway or parse failure rejects the
//! request rather than letting unvetted work through.

use crate::ports::llm_gateway::LlmGateway;
use crate::use_cases::shared::complete_cancellable;
use fleet_domain::{RouterPromptTemplate, ScopePolicy, Validation, ValidationVerdict};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Use case for validating that a request is on-topic
pub struct ValidateRequestUseCase {
    gateway: Arc<dyn LlmGateway>,
    scope: ScopePolicy,
    cancellation_token: Option<CancellationToken>,
}

impl ValidateRequestUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, scope: ScopePolicy) -> Self {
        Self {
            gateway,
            scope,
            cancellation_token: None,
        }
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn scope(&self) -> &ScopePolicy {
        &self.scope
    }

    /// Classify the request. Never errors; failure is a rejection.
    pub async fn validate(&self, request: &str) -> Validation {
        if request.trim().is_empty() {
            return Validation {
                valid: false,
                reason: "No user message provided".to_string(),
            };
        }

        let prompt = RouterPromptTemplate::validation_prompt(request, &self.scope);

        let response = match complete_cancellable(
            self.gateway.as_ref(),
            self.cancellation_token.as_ref(),
            RouterPromptTemplate::validation_system(),
            &prompt,
            RouterPromptTemplate::VALIDATION_TEMPERATURE,
        )
        .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Validation call failed: {}", e);
                return Validation {
                    valid: false,
                    reason: format!("validation error: {}", e),
                };
            }
        };

        match ValidationVerdict::parse(&response) {
            Some(verdict) if verdict.is_valid => {
                info!("Request accepted: {}", verdict.reasoning);
                Validation {
                    valid: true,
                    reason: verdict.reasoning,
                }
            }
            Some(verdict) => {
                info!("Request rejected: {}", verdict.reasoning);
                Validation {
                    valid: false,
                    reason: format!("Off-topic request: {}", verdict.reasoning),
                }
            }
            None => {
                warn!("Validation reply was not parseable JSON");
                Validation {
                    valid: false,
                    reason: "validation error: unparseable classifier reply".to_string(),
                }
            }
        }
    }
}
