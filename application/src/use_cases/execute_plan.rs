//! Execute Plan use case (orchestrator).
//!
//! Dependency-aware dispatch of a plan's tasks to remote workers.
//!
//! Sequential strategy walks the plan in order; a task whose dependencies
//! did not complete successfully settles as failed with "dependencies not
//! met". Parallel strategy computes the ready frontier once and dispatches
//! it concurrently; tasks behind unfinished dependencies stay pending and
//! are picked up by a later replan cycle, which keeps cancellation
//! reasoning to a single JoinSet generation.
//!
//! Every failure is contained at the task boundary: timeouts, transport
//! and protocol errors, remote worker errors, and panics inside a dispatch
//! all settle the owning task without touching its siblings.

use crate::config::RouterParams;
use crate::ports::worker_client::{WorkerClient, WorkerError, WorkerRequest};
use fleet_domain::{graph, Plan, RouterPromptTemplate, Task};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Use case for executing a plan against the worker fleet
pub struct ExecutePlanUseCase {
    client: Arc<dyn WorkerClient>,
    task_timeout: Duration,
    max_parallel: Option<usize>,
    cancellation_token: Option<CancellationToken>,
}

impl ExecutePlanUseCase {
    pub fn new(client: Arc<dyn WorkerClient>, params: &RouterParams) -> Self {
        Self {
            client,
            task_timeout: params.task_timeout,
            max_parallel: params.max_parallel_tasks,
            cancellation_token: None,
        }
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(|t| t.is_cancelled())
    }

    /// Execute the plan and return the merged task results: prior results
    /// plus everything settled in this invocation (newer wins on id
    /// collision).
    pub async fn execute(
        &self,
        plan: &Plan,
        prior_results: &[Task],
        original_request: &str,
        run_id: &str,
    ) -> Vec<Task> {
        let completed: HashMap<String, Task> = prior_results
            .iter()
            .map(|t| (t.id.clone(), t.clone()))
            .collect();

        info!(
            "Executing {} tasks ({} strategy, {} already settled)",
            plan.tasks.len(),
            plan.strategy,
            completed.len()
        );

        let new_results = match plan.strategy {
            fleet_domain::ExecutionStrategy::Sequential => {
                self.execute_sequential(plan, completed, original_request, run_id)
                    .await
            }
            fleet_domain::ExecutionStrategy::Parallel => {
                self.execute_parallel(plan, completed, original_request, run_id)
                    .await
            }
        };

        for task in &new_results {
            debug!("  {} -> {}", task.id, task.status);
        }

        merge_results(prior_results, new_results)
    }

    async fn execute_sequential(
        &self,
        plan: &Plan,
        mut completed: HashMap<String, Task>,
        original_request: &str,
        run_id: &str,
    ) -> Vec<Task> {
        let mut results = Vec::new();

        for task in &plan.tasks {
            if completed.contains_key(&task.id) {
                debug!("Skipping already settled task: {}", task.id);
                continue;
            }

            if self.is_cancelled() {
                let settled = task.clone().failed(WorkerError::Cancelled.to_string());
                completed.insert(settled.id.clone(), settled.clone());
                results.push(settled);
                continue;
            }

            if !graph::dependencies_met(task, &completed) {
                warn!("Dependencies not met for task {}", task.id);
                let settled = task.clone().failed("dependencies not met");
                completed.insert(settled.id.clone(), settled.clone());
                results.push(settled);
                continue;
            }

            let settled = self
                .dispatch(task, &completed, original_request, run_id)
                .await;
            completed.insert(settled.id.clone(), settled.clone());
            results.push(settled);
        }

        results
    }

    async fn execute_parallel(
        &self,
        plan: &Plan,
        completed: HashMap<String, Task>,
        original_request: &str,
        run_id: &str,
    ) -> Vec<Task> {
        let frontier = graph::ready_frontier(&plan.tasks, &completed);
        if frontier.is_empty() {
            info!("No tasks ready to execute (all settled or dependencies unmet)");
            return Vec::new();
        }

        info!("Dispatching {} frontier tasks in parallel", frontier.len());

        let semaphore = self.max_parallel.map(|n| Arc::new(Semaphore::new(n)));
        let mut join_set = JoinSet::new();
        let mut pending: HashMap<tokio::task::Id, Task> = HashMap::new();

        for task in frontier {
            let client = Arc::clone(&self.client);
            let token = self.cancellation_token.clone();
            let semaphore = semaphore.clone();
            let timeout = self.task_timeout;
            let task = task.clone();
            let task_on_panic = task.clone();
            let request = self.build_request(&task, &completed, original_request, run_id);

            let handle = join_set.spawn(async move {
                let _permit = match semaphore {
                    Some(s) => s.acquire_owned().await.ok(),
                    None => None,
                };
                settle(client, token, task, request, timeout).await
            });
            pending.insert(handle.id(), task_on_panic);
        }

        // Drain every spawned dispatch; a panic inside one settles that
        // task as failed without disturbing the rest.
        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next_with_id().await {
            match joined {
                Ok((id, settled)) => {
                    pending.remove(&id);
                    results.push(settled);
                }
                Err(join_err) => {
                    if let Some(task) = pending.remove(&join_err.id()) {
                        warn!("Task {} dispatch panicked: {}", task.id, join_err);
                        results.push(task.failed(join_err.to_string()));
                    }
                }
            }
        }

        results
    }

    fn build_request(
        &self,
        task: &Task,
        completed: &HashMap<String, Task>,
        original_request: &str,
        run_id: &str,
    ) -> WorkerRequest {
        let dependencies: Vec<&Task> = task
            .dependencies
            .iter()
            .filter_map(|dep_id| completed.get(dep_id))
            .collect();
        let context = RouterPromptTemplate::dependency_context(&dependencies);
        let payload =
            RouterPromptTemplate::worker_payload(original_request, &task.description, &context);

        WorkerRequest {
            payload,
            correlation_id: task.id.clone(),
            thread_id: format!("router_run_{}", run_id),
        }
    }

    async fn dispatch(
        &self,
        task: &Task,
        completed: &HashMap<String, Task>,
        original_request: &str,
        run_id: &str,
    ) -> Task {
        let request = self.build_request(task, completed, original_request, run_id);
        settle(
            Arc::clone(&self.client),
            self.cancellation_token.clone(),
            task.clone(),
            request,
            self.task_timeout,
        )
        .await
    }
}

/// Run one dispatch to completion and fold the outcome into the task.
async fn settle(
    client: Arc<dyn WorkerClient>,
    token: Option<CancellationToken>,
    mut task: Task,
    request: WorkerRequest,
    task_timeout: Duration,
) -> Task {
    task.mark_in_progress();
    info!("Invoking worker {} for task {}", task.worker_name, task.id);

    let worker_id = task.worker_id.clone();
    let invoke = async {
        match tokio::time::timeout(task_timeout, client.invoke(&worker_id, request)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "execution timed out after {}s",
                task_timeout.as_secs()
            )),
        }
    };

    // None = the dispatch was cancelled before it settled
    let outcome = match token {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                outcome = invoke => Some(outcome),
            }
        }
        None => Some(invoke.await),
    };

    match outcome {
        Some(Ok(text)) => task.completed(text),
        Some(Err(error)) => {
            warn!("Worker {} failed task {}: {}", task.worker_name, task.id, error);
            task.failed(error)
        }
        None => task.failed(WorkerError::Cancelled.to_string()),
    }
}

/// Merged task map: prior results in order, updated or extended by the new
/// ones (newer wins on id collision).
fn merge_results(prior: &[Task], new_results: Vec<Task>) -> Vec<Task> {
    let mut merged: Vec<Task> = prior.to_vec();
    for task in new_results {
        if let Some(existing) = merged.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        } else {
            merged.push(task);
        }
    }
    merged
}
