//! Worker client port
//!
//! The RPC boundary to remote specialist workers. The executor classifies
//! each failure variant into the owning task's error field; no worker
//! failure ever propagates past the task boundary.

use async_trait::async_trait;
use thiserror::Error;

/// One dispatch to a remote worker.
#[derive(Debug, Clone)]
pub struct WorkerRequest {
    /// Rendered textual payload for the worker
    pub payload: String,
    /// Correlation id, equal to the task id
    pub correlation_id: String,
    /// Run-scoped conversation thread id
    pub thread_id: String,
}

/// Classified failures from worker invocation
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Worker not found: {0}")]
    NotFound(String),

    #[error("execution timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("worker returned error: {0}")]
    Remote(String),

    #[error("cancelled")]
    Cancelled,
}

/// Client for invoking remote workers over RPC
///
/// Holds no run-scoped mutable state; safe to invoke from many tasks
/// concurrently.
#[async_trait]
pub trait WorkerClient: Send + Sync {
    /// Dispatch a payload to the worker and return its textual result
    async fn invoke(&self, worker_id: &str, request: WorkerRequest) -> Result<String, WorkerError>;
}
