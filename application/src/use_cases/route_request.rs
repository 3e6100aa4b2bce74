//! Route Request use case: the router state machine.
//!
//! Owns the run lifecycle: validate → plan → (approval) → execute →
//! analyse → [replan, bounded] → aggregate. The run context is persisted
//! at every phase boundary and at the interactive suspension point, so a
//! suspended run can be resumed purely from `(stored state, answer)`.
//!
//! The replan budget is enforced here as well as in the analyser; the
//! driver never honours a replan request once `replan_count` has reached
//! `max_replans`, whatever the analyser said.

use crate::config::RouterParams;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::worker_client::WorkerClient;
use crate::ports::worker_registry::WorkerRegistry;
use crate::use_cases::aggregate_results::AggregateResultsUseCase;
use crate::use_cases::analyze_results::AnalyzeResultsUseCase;
use crate::use_cases::execute_plan::ExecutePlanUseCase;
use crate::use_cases::generate_plan::GeneratePlanUseCase;
use crate::use_cases::validate_request::ValidateRequestUseCase;
use fleet_domain::{
    DomainError, ExecutionStrategy, Message, Plan, RouterPromptTemplate, RunContext, RunMode,
    RunRepository, RunStatus, ScopePolicy, StoreError,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors surfaced by the driver itself. Orchestration failures inside a
/// phase never reach here; they degrade into the run's artifact instead.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Inbound request for the router.
#[derive(Debug, Clone)]
pub struct RouterInput {
    /// Conversation so far; the last message is the current user prompt
    pub messages: Vec<Message>,
    pub mode: RunMode,
    /// Overrides the configured replan budget when set
    pub max_replans: Option<u32>,
}

impl RouterInput {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            mode: RunMode::default(),
            max_replans: None,
        }
    }

    /// Single-message convenience constructor.
    pub fn from_request(request: impl Into<String>) -> Self {
        Self::new(vec![Message::user(request)])
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_replans(mut self, max_replans: u32) -> Self {
        self.max_replans = Some(max_replans);
        self
    }
}

/// Outbound response once a run has ended.
#[derive(Debug, Clone)]
pub struct RouterOutput {
    /// Final artifact: synthesis, informative failure, or rejection
    pub final_response: String,
    /// Sorted unique names of workers that completed at least one task
    pub agents_used: Option<Vec<String>>,
    pub execution_strategy: Option<ExecutionStrategy>,
}

/// What a routing call produced: a finished run, or a suspension awaiting
/// an external approval answer.
#[derive(Debug, Clone)]
pub enum RouterOutcome {
    Completed(RouterOutput),
    AwaitingApproval { run_id: String, prompt: String },
}

/// The router state-machine driver
pub struct RouteRequestUseCase {
    validator: ValidateRequestUseCase,
    planner: GeneratePlanUseCase,
    executor: ExecutePlanUseCase,
    analyzer: AnalyzeResultsUseCase,
    aggregator: AggregateResultsUseCase,
    store: Arc<dyn RunRepository>,
    params: RouterParams,
    cancellation_token: Option<CancellationToken>,
}

impl RouteRequestUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        worker_client: Arc<dyn WorkerClient>,
        registry: Arc<dyn WorkerRegistry>,
        store: Arc<dyn RunRepository>,
        scope: ScopePolicy,
        params: RouterParams,
    ) -> Self {
        Self {
            validator: ValidateRequestUseCase::new(Arc::clone(&gateway), scope),
            planner: GeneratePlanUseCase::new(Arc::clone(&gateway), registry),
            executor: ExecutePlanUseCase::new(worker_client, &params),
            analyzer: AnalyzeResultsUseCase::new(Arc::clone(&gateway)),
            aggregator: AggregateResultsUseCase::new(gateway),
            store,
            params,
            cancellation_token: None,
        }
    }

    /// Propagate a cancellation signal into every phase: all four LLM call
    /// sites and every worker dispatch race this token.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.validator = self.validator.with_cancellation_token(token.clone());
        self.planner = self.planner.with_cancellation_token(token.clone());
        self.executor = self.executor.with_cancellation_token(token.clone());
        self.analyzer = self.analyzer.with_cancellation_token(token.clone());
        self.aggregator = self.aggregator.with_cancellation_token(token.clone());
        self.cancellation_token = Some(token);
        self
    }

    /// Route a new request through the state machine.
    pub async fn route(&self, input: RouterInput) -> Result<RouterOutcome, RouteError> {
        let request = input
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        if request.trim().is_empty() {
            return Err(DomainError::EmptyRequest.into());
        }
        let max_replans = input.max_replans.unwrap_or(self.params.max_replans);

        let mut ctx = RunContext::new(request, input.mode, max_replans);
        if input.messages.len() > 1 {
            // Preserve the full inbound conversation, not just the prompt
            ctx.message_log = input.messages;
        }

        info!("Routing run {} ({} mode)", ctx.run_id, ctx.mode);
        self.drive(ctx).await
    }

    /// Resume a run suspended at the approval gate.
    ///
    /// The answer is interpreted as: yes/approve → execute; no/reject →
    /// replan with "user rejected the plan"; any other non-empty text →
    /// replan with the text as the modification request.
    pub async fn resume(&self, run_id: &str, answer: &str) -> Result<RouterOutcome, RouteError> {
        let mut ctx = self
            .store
            .load(run_id)
            .await?
            .ok_or_else(|| DomainError::RunNotFound(run_id.to_string()))?;

        if ctx.status != RunStatus::AwaitingApproval {
            return Err(DomainError::NotAwaitingApproval(run_id.to_string()).into());
        }

        let answer = answer.trim();
        match answer.to_lowercase().as_str() {
            "yes" | "y" | "approve" | "approved" => {
                info!("Run {}: plan approved by user", ctx.run_id);
                ctx.push_message(Message::assistant(
                    "Plan approved. Proceeding with execution...",
                ));
                ctx.status = RunStatus::Executing;
            }
            "no" | "n" | "reject" | "rejected" => {
                info!("Run {}: plan rejected by user", ctx.run_id);
                ctx.push_message(Message::assistant(
                    "Plan rejected. I'll create a new plan...",
                ));
                self.force_replan(&mut ctx, "user rejected the plan".to_string());
            }
            "" => {
                // Nothing to act on; keep the run suspended
                return Ok(RouterOutcome::AwaitingApproval {
                    run_id: ctx.run_id.clone(),
                    prompt: Self::approval_prompt(ctx.plan.as_ref()),
                });
            }
            _ => {
                info!("Run {}: user requested plan modifications", ctx.run_id);
                ctx.push_message(Message::assistant(format!(
                    "Understood. I'll revise the plan based on your feedback: {}",
                    answer
                )));
                self.force_replan(&mut ctx, answer.to_string());
            }
        }

        self.drive(ctx).await
    }

    /// Run the state machine until the run ends or suspends.
    async fn drive(&self, mut ctx: RunContext) -> Result<RouterOutcome, RouteError> {
        let started = Instant::now();

        loop {
            debug_assert!(ctx.replan_count <= ctx.max_replans);
            self.store.save(&ctx).await?;

            if ctx.status.is_terminal() {
                return Ok(RouterOutcome::Completed(Self::output(&ctx)));
            }

            if self.is_cancelled() {
                warn!("Run {} cancelled", ctx.run_id);
                ctx.fail(DomainError::Cancelled.to_string());
                continue;
            }

            if let Some(deadline) = self.params.run_deadline
                && started.elapsed() >= deadline
            {
                warn!("Run {} exceeded its deadline", ctx.run_id);
                let partial =
                    AggregateResultsUseCase::fallback(&ctx.original_request, &ctx.task_results);
                ctx.fail(format!(
                    "The run exceeded its {}s deadline. Partial results follow.\n\n{}",
                    deadline.as_secs(),
                    partial
                ));
                continue;
            }

            match ctx.status {
                RunStatus::Pending => {
                    let validation = self.validator.validate(&ctx.original_request).await;
                    ctx.record_validation(validation);
                }

                RunStatus::Rejected => {
                    let reason = ctx
                        .validation
                        .as_ref()
                        .map(|v| v.reason.clone())
                        .unwrap_or_else(|| "Request is not supported".to_string());
                    let artifact = self.validator.scope().rejection_artifact(&reason);
                    ctx.push_message(Message::assistant(artifact.clone()));
                    ctx.final_response = Some(artifact);
                    // Rejection is terminal; the status stays `rejected`
                    self.store.save(&ctx).await?;
                    return Ok(RouterOutcome::Completed(Self::output(&ctx)));
                }

                RunStatus::Validated => {
                    let plan = self
                        .planner
                        .plan(
                            &ctx.original_request,
                            &ctx.task_results,
                            ctx.replan_reason.as_deref(),
                            ctx.replan_count,
                        )
                        .await;
                    ctx.set_plan(plan);
                }

                RunStatus::Planned => match ctx.mode {
                    RunMode::Auto => {
                        ctx.status = RunStatus::Executing;
                    }
                    RunMode::Review => {
                        let summary = Self::approval_prompt(ctx.plan.as_ref());
                        info!("Run {}: plan recorded for review", ctx.run_id);
                        ctx.push_message(Message::assistant(format!(
                            "{}\n\nPlan approved (review mode)",
                            summary
                        )));
                        ctx.status = RunStatus::Executing;
                    }
                    RunMode::Interactive => {
                        let prompt = Self::approval_prompt(ctx.plan.as_ref());
                        ctx.push_message(Message::assistant(prompt.clone()));
                        ctx.status = RunStatus::AwaitingApproval;
                        self.store.save(&ctx).await?;
                        info!("Run {} suspended awaiting approval", ctx.run_id);
                        return Ok(RouterOutcome::AwaitingApproval {
                            run_id: ctx.run_id.clone(),
                            prompt,
                        });
                    }
                },

                RunStatus::AwaitingApproval => {
                    // Only reachable through resume(); keep the suspension
                    return Ok(RouterOutcome::AwaitingApproval {
                        run_id: ctx.run_id.clone(),
                        prompt: Self::approval_prompt(ctx.plan.as_ref()),
                    });
                }

                RunStatus::Executing => {
                    let plan = ctx
                        .plan
                        .clone()
                        .unwrap_or_else(|| Plan::empty("No plan was generated"));
                    ctx.task_results = self
                        .executor
                        .execute(&plan, &ctx.task_results, &ctx.original_request, &ctx.run_id)
                        .await;
                    self.store.save(&ctx).await?;

                    let decision = self
                        .analyzer
                        .analyze(
                            &ctx.original_request,
                            &ctx.task_results,
                            ctx.replan_count,
                            ctx.max_replans,
                        )
                        .await;

                    // Idempotent driver-side guard on top of the analyser's
                    // own budget pre-check
                    if decision.need_replan && ctx.replan_budget_left() {
                        ctx.replan_count += 1;
                        ctx.replan_reason = decision.reason;
                        ctx.status = RunStatus::Validated;
                    } else {
                        if decision.need_replan {
                            warn!(
                                "Run {}: analyser requested a replan past the budget, aggregating",
                                ctx.run_id
                            );
                        }
                        ctx.status = RunStatus::Analysed;
                    }
                }

                RunStatus::Analysed => {
                    let response = self
                        .aggregator
                        .aggregate(&ctx.original_request, &ctx.task_results)
                        .await;
                    // A cancellation during aggregation must not complete
                    // the run with the fallback artifact
                    if self.is_cancelled() {
                        ctx.fail(DomainError::Cancelled.to_string());
                        continue;
                    }
                    ctx.status = RunStatus::Aggregated;
                    self.store.save(&ctx).await?;
                    ctx.finish(response);
                }

                RunStatus::Aggregated => {
                    // Aggregation already produced the artifact
                    ctx.status = RunStatus::Done;
                }

                RunStatus::Done | RunStatus::Failed => unreachable!("handled above"),
            }
        }
    }

    /// Replan after a user rejection or modification request. Counts
    /// against the replan budget; once exhausted, the run proceeds with
    /// the plan it has and aggregates whatever execution yields.
    fn force_replan(&self, ctx: &mut RunContext, reason: String) {
        if ctx.replan_budget_left() {
            ctx.replan_count += 1;
            ctx.replan_reason = Some(reason);
            ctx.status = RunStatus::Validated;
        } else {
            warn!(
                "Run {}: replan budget exhausted at the approval gate, executing current plan",
                ctx.run_id
            );
            ctx.status = RunStatus::Executing;
        }
    }

    fn approval_prompt(plan: Option<&Plan>) -> String {
        match plan {
            Some(plan) => format!(
                "{}\n\nDo you approve this plan? (yes/no/modify)",
                RouterPromptTemplate::plan_summary(plan)
            ),
            None => "No plan was generated to approve".to_string(),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(|t| t.is_cancelled())
    }

    fn output(ctx: &RunContext) -> RouterOutput {
        let agents = ctx.workers_used();
        RouterOutput {
            final_response: ctx.final_response.clone().unwrap_or_default(),
            agents_used: (!agents.is_empty()).then_some(agents),
            execution_strategy: if ctx.task_results.is_empty() {
                None
            } else {
                ctx.execution_strategy()
            },
        }
    }
}
