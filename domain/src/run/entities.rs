//! Run entities

use crate::plan::entities::{ExecutionStrategy, Plan, Task, TaskStatus};
use crate::run::mode::RunMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Where a run currently sits in the orchestration state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Validated,
    Rejected,
    Planned,
    AwaitingApproval,
    Executing,
    Analysed,
    Aggregated,
    Done,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Done | RunStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Validated => "validated",
            RunStatus::Rejected => "rejected",
            RunStatus::Planned => "planned",
            RunStatus::AwaitingApproval => "awaiting_approval",
            RunStatus::Executing => "executing",
            RunStatus::Analysed => "analysed",
            RunStatus::Aggregated => "aggregated",
            RunStatus::Done => "done",
            RunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of the validation gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One entry in the run's conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// State of a single routed request (Entity).
///
/// Created on the inbound request, mutated only by the state-machine
/// driver between phases, frozen once `status` is terminal. Serializable
/// so interactive runs can be suspended to a store and resumed later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    /// Opaque unique identifier for this run
    pub run_id: String,
    /// The verbatim user request (last inbound message)
    pub original_request: String,
    pub mode: RunMode,
    /// Replan budget; `replan_count` never exceeds it
    pub max_replans: u32,
    pub replan_count: u32,
    pub status: RunStatus,
    pub validation: Option<Validation>,
    /// The current plan; a replan replaces it wholesale
    pub plan: Option<Plan>,
    /// Accumulated task outcomes across all execute cycles, identity by id
    pub task_results: Vec<Task>,
    /// Carried into the next planning cycle after a replan decision
    pub replan_reason: Option<String>,
    pub final_response: Option<String>,
    /// Conversation log: inbound user messages plus synthesised replies
    pub message_log: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new(original_request: impl Into<String>, mode: RunMode, max_replans: u32) -> Self {
        let original_request = original_request.into();
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            message_log: vec![Message::user(original_request.clone())],
            original_request,
            mode,
            max_replans,
            replan_count: 0,
            status: RunStatus::Pending,
            validation: None,
            plan: None,
            task_results: Vec::new(),
            replan_reason: None,
            final_response: None,
            created_at: Utc::now(),
        }
    }

    pub fn push_message(&mut self, message: Message) {
        self.message_log.push(message);
    }

    /// Record the validation outcome and move to Validated or Rejected.
    pub fn record_validation(&mut self, validation: Validation) {
        self.status = if validation.valid {
            RunStatus::Validated
        } else {
            RunStatus::Rejected
        };
        self.validation = Some(validation);
    }

    /// Install a freshly generated plan and clear the replan trigger.
    pub fn set_plan(&mut self, plan: Plan) {
        self.plan = Some(plan);
        self.replan_reason = None;
        self.status = RunStatus::Planned;
    }

    /// Merge an execute cycle's output into the accumulated results.
    /// Newer entries win on id collision.
    pub fn merge_task_results(&mut self, results: Vec<Task>) {
        for task in results {
            if let Some(existing) = self.task_results.iter_mut().find(|t| t.id == task.id) {
                *existing = task;
            } else {
                self.task_results.push(task);
            }
        }
    }

    /// Whether another replan cycle is still within budget.
    pub fn replan_budget_left(&self) -> bool {
        self.replan_count < self.max_replans
    }

    /// Record the final artifact and terminate the run.
    pub fn finish(&mut self, final_response: impl Into<String>) {
        let final_response = final_response.into();
        self.push_message(Message::assistant(final_response.clone()));
        self.final_response = Some(final_response);
        self.status = RunStatus::Done;
    }

    /// Terminate the run as failed with an explanatory artifact.
    pub fn fail(&mut self, final_response: impl Into<String>) {
        let final_response = final_response.into();
        self.push_message(Message::assistant(final_response.clone()));
        self.final_response = Some(final_response);
        self.status = RunStatus::Failed;
    }

    /// Sorted unique names of workers that completed at least one task.
    pub fn workers_used(&self) -> Vec<String> {
        self.task_results
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .map(|t| t.worker_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Strategy of the plan that drove execution, if any ran.
    pub fn execution_strategy(&self) -> Option<ExecutionStrategy> {
        self.plan.as_ref().map(|p| p.strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::entities::Task;

    fn ctx() -> RunContext {
        RunContext::new("check my code", RunMode::Auto, 2)
    }

    #[test]
    fn test_new_run_seeds_message_log() {
        let ctx = ctx();
        assert_eq!(ctx.status, RunStatus::Pending);
        assert_eq!(ctx.replan_count, 0);
        assert_eq!(ctx.message_log.len(), 1);
        assert_eq!(ctx.message_log[0].role, MessageRole::User);
        assert!(!ctx.run_id.is_empty());
    }

    #[test]
    fn test_record_validation_routes_status() {
        let mut ctx = ctx();
        ctx.record_validation(Validation {
            valid: false,
            reason: "Off-topic request".to_string(),
        });
        assert_eq!(ctx.status, RunStatus::Rejected);

        let mut ctx = self::ctx();
        ctx.record_validation(Validation {
            valid: true,
            reason: String::new(),
        });
        assert_eq!(ctx.status, RunStatus::Validated);
    }

    #[test]
    fn test_merge_results_newer_wins() {
        let mut ctx = ctx();
        ctx.merge_task_results(vec![Task::new("task_1", "a", "w1", "W").failed("boom")]);
        ctx.merge_task_results(vec![
            Task::new("task_1", "a", "w1", "W").completed("fixed"),
            Task::new("task_2", "b", "w2", "X").completed("done"),
        ]);
        assert_eq!(ctx.task_results.len(), 2);
        assert_eq!(ctx.task_results[0].status, TaskStatus::Completed);
    }

    #[test]
    fn test_workers_used_sorted_unique_completed_only() {
        let mut ctx = ctx();
        ctx.merge_task_results(vec![
            Task::new("task_1", "a", "w2", "Zeta").completed("ok"),
            Task::new("task_2", "b", "w1", "Alpha").completed("ok"),
            Task::new("task_3", "c", "w2", "Zeta").completed("ok"),
            Task::new("task_4", "d", "w3", "Broken").failed("timed out"),
        ]);
        assert_eq!(ctx.workers_used(), vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_finish_records_artifact_and_message() {
        let mut ctx = ctx();
        ctx.finish("all done");
        assert_eq!(ctx.status, RunStatus::Done);
        assert!(ctx.status.is_terminal());
        assert_eq!(ctx.final_response.as_deref(), Some("all done"));
        assert_eq!(ctx.message_log.last().unwrap().role, MessageRole::Assistant);
    }

    #[test]
    fn test_replan_budget() {
        let mut ctx = ctx();
        assert!(ctx.replan_budget_left());
        ctx.replan_count = 2;
        assert!(!ctx.replan_budget_left());
    }
}
