//! Worker registry port
//!
//! Discovery of remote workers and their capability cards. Failure to
//! reach the control plane yields an empty list, not an error, so the
//! planner can report "no workers available" as a normal outcome.

use async_trait::async_trait;
use fleet_domain::WorkerCapability;
use thiserror::Error;

/// Errors from card lookup
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Worker not found: {0}")]
    NotFound(String),

    #[error("Control plane unreachable: {0}")]
    Unreachable(String),
}

/// Registry of currently-known workers
#[async_trait]
pub trait WorkerRegistry: Send + Sync {
    /// Enumerate available workers. May be empty; never fails.
    async fn list_workers(&self) -> Vec<WorkerCapability>;

    /// Fetch a single worker's capability card
    async fn get_card(&self, worker_id: &str) -> Result<WorkerCapability, RegistryError>;
}
