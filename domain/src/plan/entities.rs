//! Plan and task entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the tasks of a plan are dispatched.
///
/// Parallel is only chosen when every task is independent of its siblings;
/// any ordering requirement forces sequential dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStrategy {
    Parallel,
    #[default]
    Sequential,
}

impl ExecutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStrategy::Parallel => "parallel",
            ExecutionStrategy::Sequential => "sequential",
        }
    }
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExecutionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parallel" => Ok(ExecutionStrategy::Parallel),
            "sequential" => Ok(ExecutionStrategy::Sequential),
            _ => Err(format!("Invalid ExecutionStrategy: {}", s)),
        }
    }
}

/// Status of a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single task within a plan.
///
/// `result` is populated exactly when the task completed; `error` exactly
/// when it failed. The `mark_*` transitions maintain that pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Identifier, unique within the owning plan
    pub id: String,
    /// Directive sent to the worker
    pub description: String,
    /// Which worker handles this task (resolvable via the registry)
    pub worker_id: String,
    /// Human-readable worker label, for reporting only
    pub worker_name: String,
    /// Ids of tasks in the same plan that must complete first
    pub dependencies: Vec<String>,
    /// Why this worker was chosen (audit only)
    pub rationale: String,
    pub status: TaskStatus,
    /// Worker's response, present iff status is Completed
    pub result: Option<String>,
    /// Failure detail, present iff status is Failed
    pub error: Option<String>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        worker_id: impl Into<String>,
        worker_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            worker_id: worker_id.into(),
            worker_name: worker_name.into(),
            dependencies: Vec::new(),
            rationale: String::new(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }

    pub fn with_dependency(mut self, task_id: impl Into<String>) -> Self {
        self.dependencies.push(task_id.into());
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn mark_in_progress(&mut self) {
        self.status = TaskStatus::InProgress;
    }

    pub fn mark_completed(&mut self, result: impl Into<String>) {
        self.status = TaskStatus::Completed;
        self.result = Some(result.into());
        self.error = None;
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
        self.result = None;
    }

    /// Consuming variants of the mark transitions, for map/settle pipelines.
    pub fn completed(mut self, result: impl Into<String>) -> Self {
        self.mark_completed(result);
        self
    }

    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.mark_failed(error);
        self
    }
}

/// An execution plan: a DAG of tasks targeted at a registry snapshot.
///
/// Immutable once created by the planner. Task results accumulate on the
/// run context, not on the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub strategy: ExecutionStrategy,
    /// Planner's free-text rationale for the decomposition
    pub analysis: String,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    pub fn new(strategy: ExecutionStrategy, analysis: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            strategy,
            analysis: analysis.into(),
            tasks,
            created_at: Utc::now(),
        }
    }

    /// A plan with no tasks. Produced when no workers are available or the
    /// planner LLM output could not be used; execute over it is a no-op.
    pub fn empty(analysis: impl Into<String>) -> Self {
        Self::new(ExecutionStrategy::Sequential, analysis, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse_and_display() {
        assert_eq!(
            "parallel".parse::<ExecutionStrategy>().ok(),
            Some(ExecutionStrategy::Parallel)
        );
        assert_eq!(
            "SEQUENTIAL".parse::<ExecutionStrategy>().ok(),
            Some(ExecutionStrategy::Sequential)
        );
        assert!("fanout".parse::<ExecutionStrategy>().is_err());
        assert_eq!(ExecutionStrategy::Parallel.to_string(), "parallel");
    }

    #[test]
    fn test_task_status_terminal() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_mark_completed_clears_error() {
        let mut task = Task::new("task_1", "check syntax", "w1", "QuickWorker");
        task.mark_failed("transport error");
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.is_some());
        assert!(task.result.is_none());

        task.mark_completed("all good");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.result.as_deref(), Some("all good"));
        assert!(task.error.is_none());
    }

    #[test]
    fn test_empty_plan() {
        let plan = Plan::empty("No workers available to handle this request");
        assert!(plan.is_empty());
        assert_eq!(plan.strategy, ExecutionStrategy::Sequential);
    }

    #[test]
    fn test_plan_task_lookup() {
        let plan = Plan::new(
            ExecutionStrategy::Sequential,
            "one step",
            vec![Task::new("task_1", "do it", "w1", "Worker")],
        );
        assert!(plan.task("task_1").is_some());
        assert!(plan.task("task_2").is_none());
    }
}
