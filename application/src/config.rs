//! Execution parameters for the router.

use std::time::Duration;

/// Run-wide knobs with the platform defaults.
///
/// Loaded from configuration at the composition root; every field has a
/// builder method so tests can tighten timeouts without a config file.
#[derive(Debug, Clone)]
pub struct RouterParams {
    /// Replan budget per run
    pub max_replans: u32,
    /// Wall-clock deadline for a single worker dispatch
    pub task_timeout: Duration,
    /// Deadline for a single LLM call
    pub llm_timeout: Duration,
    /// Overall run deadline; None disables the check
    pub run_deadline: Option<Duration>,
    /// Cap on concurrent dispatches within a parallel frontier;
    /// None means unbounded
    pub max_parallel_tasks: Option<usize>,
}

impl Default for RouterParams {
    fn default() -> Self {
        Self {
            max_replans: 2,
            task_timeout: Duration::from_secs(300),
            llm_timeout: Duration::from_secs(60),
            run_deadline: Some(Duration::from_secs(900)),
            max_parallel_tasks: None,
        }
    }
}

impl RouterParams {
    pub fn with_max_replans(mut self, max_replans: u32) -> Self {
        self.max_replans = max_replans;
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    pub fn with_run_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.run_deadline = deadline;
        self
    }

    pub fn with_max_parallel_tasks(mut self, cap: Option<usize>) -> Self {
        self.max_parallel_tasks = cap;
        self
    }
}
