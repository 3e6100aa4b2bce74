//! Prompt templates for the four router call sites.
//!
//! Each call site carries a system message, a user-message template
//! rendered by pure substitution, and a temperature. Classification gates
//! (validation, analysis) run cool so verdicts stay stable; planning and
//! aggregation run warmer.

use crate::plan::entities::{Plan, Task, TaskStatus};
use crate::scope::ScopePolicy;
use crate::worker::WorkerCapability;

/// Templates for the router's validate / plan / analyse / aggregate calls
pub struct RouterPromptTemplate;

impl RouterPromptTemplate {
    pub const VALIDATION_TEMPERATURE: f32 = 0.3;
    pub const PLANNING_TEMPERATURE: f32 = 0.5;
    pub const ANALYSIS_TEMPERATURE: f32 = 0.3;
    pub const AGGREGATION_TEMPERATURE: f32 = 0.7;

    /// System prompt for request validation
    pub fn validation_system() -> &'static str {
        "You are a request classifier for a multi-agent task platform. \
         You decide whether a request is in scope. Respond only with JSON."
    }

    /// User prompt for request validation
    pub fn validation_prompt(request: &str, scope: &ScopePolicy) -> String {
        format!(
            r#"Classify whether the following request is in scope for {summary}.

In-scope areas:
{domains}

REQUEST:
{request}

Respond with JSON in this exact format:
{{
  "is_valid": true or false,
  "reasoning": "One sentence explaining the classification"
}}"#,
            summary = scope.summary,
            domains = scope.domain_list(),
            request = request
        )
    }

    /// System prompt for plan generation
    pub fn planning_system() -> &'static str {
        "You are an expert at task decomposition and worker orchestration."
    }

    /// User prompt for plan generation.
    ///
    /// `replan_context` is empty on the first cycle; on a replan it carries
    /// the prior attempt's results and the reason the plan was rejected or
    /// judged insufficient.
    pub fn planning_prompt(request: &str, workers: &[WorkerCapability], replan_context: &str) -> String {
        let worker_summary = workers
            .iter()
            .map(|w| w.prompt_summary())
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are the task breakdown system for a fleet of specialist workers.

USER REQUEST:
{request}

AVAILABLE WORKERS:
{worker_summary}
{replan_context}

YOUR TASK:
Create an execution plan to fulfill this request by:
1. Analyzing what needs to be done
2. Breaking it into specific, actionable tasks
3. Assigning each task to the most capable worker
4. Identifying task dependencies
5. Determining if tasks can run in parallel or must be sequential

GUIDELINES:
- Each task should be atomic and focused
- Match tasks to worker capabilities precisely
- Use "parallel" only when all tasks are mutually independent
- Use "sequential" when tasks depend on each other
- Provide clear rationale for each worker selection

Respond with JSON in this exact format:
{{
  "analysis": "Brief analysis of the request and approach",
  "execution_strategy": "parallel" or "sequential",
  "tasks": [
    {{
      "description": "Clear description of what this task accomplishes",
      "worker_id": "exact worker ID from the available workers",
      "worker_name": "worker name for reporting",
      "dependencies": [],
      "rationale": "Why this worker was chosen for this task"
    }}
  ]
}}

IMPORTANT:
- Use exact worker IDs from the available workers list
- Dependencies reference other tasks in this plan by their position (1-based)
- Tasks execute in the order listed for the sequential strategy"#,
            request = request,
            worker_summary = worker_summary,
            replan_context = replan_context
        )
    }

    /// The replan context block appended to the planning prompt.
    pub fn replan_context(attempt: u32, reason: &str, prior_results: &[Task]) -> String {
        format!(
            r#"
IMPORTANT - THIS IS A REPLAN (Attempt #{attempt}):
Reason for replanning: {reason}

Previous attempt results:
{results}

Consider these results when creating the new plan. You may need to:
- Add follow-up tasks based on previous results
- Try different workers if previous ones failed
- Adjust task decomposition based on what we learned"#,
            attempt = attempt,
            reason = reason,
            results = Self::results_summary(prior_results)
        )
    }

    /// System prompt for the replan analyser
    pub fn analysis_system() -> &'static str {
        "You evaluate whether a set of task results fully answers a user \
         request. Be strict but practical. Respond only with JSON."
    }

    /// User prompt for the replan analyser
    pub fn analysis_prompt(request: &str, results: &[Task], attempt: u32, max_replans: u32) -> String {
        format!(
            r#"ORIGINAL REQUEST:
{request}

TASK RESULTS (replan attempt {attempt} of {max}):
{results}

Judge whether these results collectively answer the request.

Respond with JSON in this exact format:
{{
  "is_sufficient": true or false,
  "reasoning": "One or two sentences",
  "replan_strategy": "If insufficient, a concrete strategy for the next plan; otherwise null"
}}"#,
            request = request,
            attempt = attempt,
            max = max_replans,
            results = Self::results_summary(results)
        )
    }

    /// System prompt for final aggregation
    pub fn aggregation_system() -> &'static str {
        "You synthesize the outputs of several specialist workers into one \
         coherent response for the user. Organize clearly, highlight key \
         findings, and note any limitations from failed tasks."
    }

    /// User prompt for final aggregation
    pub fn aggregation_prompt(request: &str, results: &[Task]) -> String {
        let completed = results
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let failed = results
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count();

        format!(
            r#"ORIGINAL REQUEST:
{request}

EXECUTION SUMMARY: {total} tasks, {completed} completed, {failed} failed.

TASK RESULTS:
{results}

Write the final response to the user. Synthesize across all completed
tasks, organize the information coherently, and note gaps caused by any
failed tasks. Do not mention internal orchestration mechanics."#,
            request = request,
            total = results.len(),
            completed = completed,
            failed = failed,
            results = Self::results_summary(results)
        )
    }

    /// The textual payload dispatched to a worker for one task.
    pub fn worker_payload(original_request: &str, description: &str, dependency_context: &str) -> String {
        format!(
            "Original user request: {}\n\n\
             Your specific task: {}\n{}\n\
             Please complete this task and provide your findings.",
            original_request, description, dependency_context
        )
    }

    /// The "context from previous tasks" preamble built from a task's
    /// direct dependencies. Empty when there are none.
    pub fn dependency_context(dependencies: &[&Task]) -> String {
        if dependencies.is_empty() {
            return String::new();
        }
        let mut context = String::from("\nContext from previous tasks:\n");
        for dep in dependencies {
            context.push_str(&format!(
                "- {}: {}\n",
                dep.description,
                dep.result.as_deref().unwrap_or("N/A")
            ));
        }
        context
    }

    /// Render a plan for the approval gate and the review-mode transcript.
    pub fn plan_summary(plan: &Plan) -> String {
        let mut summary = format!(
            "I've created the following execution plan:\n\n\
             Analysis: {}\n\n\
             Strategy: {}\n\n\
             Tasks:\n",
            plan.analysis,
            plan.strategy.as_str().to_uppercase()
        );

        for (idx, task) in plan.tasks.iter().enumerate() {
            let deps = if task.dependencies.is_empty() {
                String::new()
            } else {
                format!(" (depends on: {})", task.dependencies.join(", "))
            };
            summary.push_str(&format!(
                "\n{}. {}\n   Worker: {}\n   Rationale: {}{}\n",
                idx + 1,
                task.description,
                task.worker_name,
                task.rationale,
                deps
            ));
        }

        summary
    }

    /// One line per task: description, worker, status, result or error.
    fn results_summary(results: &[Task]) -> String {
        results
            .iter()
            .enumerate()
            .map(|(idx, task)| {
                format!(
                    "Task {}: {}\n  Worker: {}\n  Status: {}\n  Result: {}\n  Error: {}",
                    idx + 1,
                    task.description,
                    task.worker_name,
                    task.status,
                    task.result.as_deref().unwrap_or("N/A"),
                    task.error.as_deref().unwrap_or("N/A")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
