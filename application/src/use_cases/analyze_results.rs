//! Analyze Results use case (replan decision).
//!
//! Decides whether the accumulated task results answer the request or
//! another plan/execute cycle is needed. The replan budget is enforced
//! deterministically here before any LLM is consulted; the driver asserts
//! the same bound again. This gate fails forward: when the judgement call
//! cannot be made, partial results beat an infinite loop.

use crate::ports::llm_gateway::LlmGateway;
use crate::use_cases::shared::complete_cancellable;
use fleet_domain::{AnalysisVerdict, RouterPromptTemplate, Task};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Outcome of the analysis phase.
#[derive(Debug, Clone)]
pub struct ReplanDecision {
    pub need_replan: bool,
    pub reason: Option<String>,
}

impl ReplanDecision {
    fn proceed() -> Self {
        Self {
            need_replan: false,
            reason: None,
        }
    }

    fn replan(reason: String) -> Self {
        Self {
            need_replan: true,
            reason: Some(reason),
        }
    }
}

/// Use case for judging result sufficiency
pub struct AnalyzeResultsUseCase {
    gateway: Arc<dyn LlmGateway>,
    cancellation_token: Option<CancellationToken>,
}

impl AnalyzeResultsUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            cancellation_token: None,
        }
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub async fn analyze(
        &self,
        request: &str,
        results: &[Task],
        replan_count: u32,
        max_replans: u32,
    ) -> ReplanDecision {
        // Hard escape hatch, independent of any model opinion
        if replan_count >= max_replans {
            info!(
                "Replan budget exhausted ({}/{}), proceeding to aggregation",
                replan_count, max_replans
            );
            return ReplanDecision::proceed();
        }

        let prompt = RouterPromptTemplate::analysis_prompt(
            request,
            results,
            replan_count + 1,
            max_replans,
        );

        let response = match complete_cancellable(
            self.gateway.as_ref(),
            self.cancellation_token.as_ref(),
            RouterPromptTemplate::analysis_system(),
            &prompt,
            RouterPromptTemplate::ANALYSIS_TEMPERATURE,
        )
        .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Analysis call failed, presenting current results: {}", e);
                return ReplanDecision::proceed();
            }
        };

        match AnalysisVerdict::parse(&response) {
            Some(verdict) if verdict.is_sufficient => {
                info!("Results judged sufficient: {}", verdict.reasoning);
                ReplanDecision::proceed()
            }
            Some(verdict) => {
                let reason = verdict.replan_reason();
                info!("Results insufficient, replanning: {}", reason);
                ReplanDecision::replan(reason)
            }
            None => {
                warn!("Analysis reply was not parseable JSON, presenting current results");
                ReplanDecision::proceed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::StubGateway;
    use fleet_domain::Task;

    fn results() -> Vec<Task> {
        vec![Task::new("task_1", "check", "w1", "W").completed("looks fine")]
    }

    #[tokio::test]
    async fn test_budget_exhausted_never_replans() {
        // The gateway would approve a replan, but it must not be consulted
        let gateway = StubGateway::failing();
        let decision = AnalyzeResultsUseCase::new(Arc::new(gateway))
            .analyze("req", &results(), 2, 2)
            .await;
        assert!(!decision.need_replan);
    }

    #[tokio::test]
    async fn test_zero_budget_never_replans() {
        let gateway = StubGateway::replies(vec![
            r#"{"is_sufficient": false, "replan_strategy": "try again"}"#,
        ]);
        let gateway = Arc::new(gateway);
        let decision = AnalyzeResultsUseCase::new(Arc::clone(&gateway) as _)
            .analyze("req", &results(), 0, 0)
            .await;
        assert!(!decision.need_replan);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_sufficient_proceeds() {
        let gateway =
            StubGateway::replies(vec![r#"{"is_sufficient": true, "reasoning": "covered"}"#]);
        let decision = AnalyzeResultsUseCase::new(Arc::new(gateway))
            .analyze("req", &results(), 0, 2)
            .await;
        assert!(!decision.need_replan);
        assert!(decision.reason.is_none());
    }

    #[tokio::test]
    async fn test_insufficient_with_strategy_replans() {
        let gateway = StubGateway::replies(vec![
            r#"{"is_sufficient": false, "reasoning": "missing checks",
                "replan_strategy": "add verification step"}"#,
        ]);
        let decision = AnalyzeResultsUseCase::new(Arc::new(gateway))
            .analyze("req", &results(), 0, 2)
            .await;
        assert!(decision.need_replan);
        assert_eq!(decision.reason.as_deref(), Some("add verification step"));
    }

    #[tokio::test]
    async fn test_gateway_failure_fails_forward() {
        let decision = AnalyzeResultsUseCase::new(Arc::new(StubGateway::failing()))
            .analyze("req", &results(), 0, 2)
            .await;
        assert!(!decision.need_replan);
    }

    #[tokio::test]
    async fn test_unparseable_reply_fails_forward() {
        let gateway = StubGateway::replies(vec!["probably fine?"]);
        let decision = AnalyzeResultsUseCase::new(Arc::new(gateway))
            .analyze("req", &results(), 1, 3)
            .await;
        assert!(!decision.need_replan);
    }
}
