//! Aggregate Results use case (summarizer).
//!
//! Synthesises all task outcomes into the single user-facing artifact.
//! When the synthesis call fails, a deterministic concatenation of the
//! per-task results stands in; the user always gets an artifact. Both
//! paths append a footer when any task failed.

use crate::ports::llm_gateway::LlmGateway;
use crate::use_cases::shared::complete_cancellable;
use fleet_domain::{RouterPromptTemplate, Task, TaskStatus};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Use case for producing the final response
pub struct AggregateResultsUseCase {
    gateway: Arc<dyn LlmGateway>,
    cancellation_token: Option<CancellationToken>,
}

impl AggregateResultsUseCase {
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

    pub async fn aggregate(&self, request: &str, results: &[Task]) -> String {
        let failed = results
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count();

        let prompt = RouterPromptTemplate::aggregation_prompt(request, results);

        match complete_cancellable(
            self.gateway.as_ref(),
            self.cancellation_token.as_ref(),
            RouterPromptTemplate::aggregation_system(),
            &prompt,
            RouterPromptTemplate::AGGREGATION_TEMPERATURE,
        )
        .await
        {
            Ok(mut response) => {
                info!("Synthesised final response ({} chars)", response.len());
                if failed > 0 {
                    response.push_str(&Self::failure_footer(failed, results.len()));
                }
                response
            }
            Err(e) => {
                warn!("Aggregation call failed, using fallback concatenation: {}", e);
                Self::fallback(request, results)
            }
        }
    }

    /// Deterministic concatenation of per-task outcomes.
    pub fn fallback(request: &str, results: &[Task]) -> String {
        let mut response = format!("# Results for: {}\n", request);

        for (idx, task) in results.iter().enumerate() {
            response.push_str(&format!("\n## {}. {}\n\n", idx + 1, task.description));
            match task.status {
                TaskStatus::Completed => {
                    response.push_str(task.result.as_deref().unwrap_or("No result"));
                    response.push('\n');
                }
                _ => {
                    response.push_str(&format!(
                        "*This task failed: {}*\n",
                        task.error.as_deref().unwrap_or("Unknown error")
                    ));
                }
            }
        }

        if results.is_empty() {
            response.push_str("\nNo tasks were executed for this request.\n");
        }

        let failed = results
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count();
        if failed > 0 {
            response.push_str(&Self::failure_footer(failed, results.len()));
        }

        response
    }

    fn failure_footer(failed: usize, total: usize) -> String {
        format!(
            "\n\n---\n*Note: {} of {} tasks encountered errors. \
             The response above reflects available information.*",
            failed, total
        )
    }
}
