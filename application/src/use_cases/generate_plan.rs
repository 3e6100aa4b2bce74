//! Generate Plan use case (task breakdown).
//!
//! Snapshots the worker registry, asks the planner LLM for a decomposition,
//! then hardens the draft into a [`Plan`]: planner-assigned task ids,
//! unknown workers dropped, dependency references resolved against the
//! assigned ids. Every failure degrades to an empty plan rather than an
//! error; the driver treats a vacuous plan as a normal outcome.

use crate::ports::llm_gateway::LlmGateway;
use crate::ports::worker_registry::WorkerRegistry;
use crate::use_cases::shared::complete_cancellable;
use fleet_domain::plan::parser::{self, PlanDraft};
use fleet_domain::{graph, Plan, RouterPromptTemplate, Task};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Use case for producing an execution plan from a validated request
pub struct GeneratePlanUseCase {
    gateway: Arc<dyn LlmGateway>,
    registry: Arc<dyn WorkerRegistry>,
    cancellation_token: Option<CancellationToken>,
}

impl GeneratePlanUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, registry: Arc<dyn WorkerRegistry>) -> Self {
        Self {
            gateway,
            registry,
            cancellation_token: None,
        }
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Produce a plan for `request`.
    ///
    /// On a replan cycle (`replan_count > 0`), `prior_results` and
    /// `replan_reason` are rendered into the prompt so the model can build
    /// on what already happened.
    pub async fn plan(
        &self,
        request: &str,
        prior_results: &[Task],
        replan_reason: Option<&str>,
        replan_count: u32,
    ) -> Plan {
        let workers = self.registry.list_workers().await;
        if workers.is_empty() {
            warn!("No workers available in registry");
            return Plan::empty("No workers available to handle this request");
        }

        let replan_context = if replan_count > 0 {
            RouterPromptTemplate::replan_context(
                replan_count + 1,
                replan_reason.unwrap_or("Previous plan was insufficient"),
                prior_results,
            )
        } else {
            String::new()
        };

        let prompt = RouterPromptTemplate::planning_prompt(request, &workers, &replan_context);

        let response = match complete_cancellable(
            self.gateway.as_ref(),
            self.cancellation_token.as_ref(),
            RouterPromptTemplate::planning_system(),
            &prompt,
            RouterPromptTemplate::PLANNING_TEMPERATURE,
        )
        .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Planning call failed: {}", e);
                return Plan::empty(format!("Planning failed: {}", e));
            }
        };

        let Some(draft) = parser::parse_plan_draft(&response) else {
            warn!("Planning reply was not parseable JSON");
            return Plan::empty("Planning failed: invalid JSON response from model");
        };

        let known_workers: HashSet<String> =
            workers.iter().map(|w| w.worker_id.clone()).collect();
        self.harden(draft, &known_workers)
    }

    /// Turn a raw draft into a plan with assigned ids and resolved deps.
    fn harden(&self, draft: PlanDraft, known_workers: &HashSet<String>) -> Plan {
        // Ids are assigned positionally over the draft, before unknown
        // workers are dropped, so ordinal dependency references written
        // against the model's own task list still land on the right task.
        // The random suffix keeps ids unique across replan cycles, so a
        // new plan's tasks never collide with accumulated results.
        let assigned_ids: Vec<String> = (0..draft.tasks.len())
            .map(|_| format!("task_{}", &uuid::Uuid::new_v4().simple().to_string()[..8]))
            .collect();

        let mut tasks = Vec::new();
        for (idx, raw) in draft.tasks.into_iter().enumerate() {
            if !known_workers.contains(&raw.worker_id) {
                warn!(
                    "Worker {} not found in registry, dropping task: {}",
                    raw.worker_id, raw.description
                );
                continue;
            }

            let id = assigned_ids[idx].clone();
            let mut dependencies = Vec::new();
            for reference in &raw.dependencies {
                match parser::resolve_dependency(reference, &assigned_ids) {
                    // A task cannot depend on itself
                    Some(dep) if dep != id => dependencies.push(dep),
                    Some(_) => warn!("Dropping self-dependency on {}", id),
                    None => warn!("Dropping unresolvable dependency reference: {}", reference),
                }
            }

            let worker_name = if raw.worker_name.is_empty() {
                raw.worker_id.clone()
            } else {
                raw.worker_name
            };

            let mut task = Task::new(id, raw.description, raw.worker_id, worker_name)
                .with_rationale(raw.rationale);
            task.dependencies = dependencies;
            tasks.push(task);
        }

        // Dropped tasks may leave dependents pointing at ids absent from the
        // plan; those tasks will fail deterministically at execute time with
        // "dependencies not met", which is the intended degradation.
        if !graph::is_acyclic(&tasks) {
            warn!("Planner produced a cyclic dependency graph, discarding plan");
            return Plan::empty("Planning failed: cyclic task dependencies");
        }

        info!("Generated plan with {} tasks", tasks.len());
        Plan::new(draft.execution_strategy, draft.analysis, tasks)
    }
}
