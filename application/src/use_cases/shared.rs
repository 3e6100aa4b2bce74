//! Shared helpers for cancellable LLM calls.
//!
//! Every prompted call (validator, planner, analyser, aggregator) is a
//! suspension point, so each one races the run's cancellation token the
//! same way worker dispatches do. A cancelled call surfaces as
//! [`GatewayError::Cancelled`] and each use case then falls back to its
//! own safe default; the driver fails the run at the next phase boundary.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use tokio_util::sync::CancellationToken;

/// Run one gateway completion, racing the cancellation token when present.
pub(crate) async fn complete_cancellable(
    gateway: &dyn LlmGateway,
    token: Option<&CancellationToken>,
    system: &str,
    user: &str,
    temperature: f32,
) -> Result<String, GatewayError> {
    match token {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(GatewayError::Cancelled),
                result = gateway.complete(system, user, temperature) => result,
            }
        }
        None => gateway.complete(system, user, temperature).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::StubGateway;
    use std::time::Duration;

    #[tokio::test]
    async fn test_without_token_passes_through() {
        let gateway = StubGateway::replies(vec!["reply"]);
        let result = complete_cancellable(&gateway, None, "sys", "user", 0.3).await;
        assert_eq!(result.unwrap(), "reply");
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        // A reply is scripted, but the race must not consume it
        let gateway = StubGateway::replies(vec!["reply"]);
        let result = complete_cancellable(&gateway, Some(&token), "sys", "user", 0.3).await;
        assert!(matches!(result, Err(GatewayError::Cancelled)));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_in_flight_call() {
        let token = CancellationToken::new();
        let gateway =
            StubGateway::replies(vec!["reply"]).with_delay(Duration::from_secs(30));

        let racing_token = token.clone();
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            racing_token.cancel();
        };

        let (result, _) = tokio::join!(
            complete_cancellable(&gateway, Some(&token), "sys", "user", 0.3),
            cancel
        );
        assert!(matches!(result, Err(GatewayError::Cancelled)));
    }
}
