//! Run persistence trait
//!
//! The driver saves the run context at every phase boundary and at the
//! interactive suspension point, so that a resume is a pure function of
//! (stored state, answer). Implementations live in the infrastructure
//! layer; the in-memory store is the single-process default.

use crate::run::entities::RunContext;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from the run store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(String),

    #[error("Stored run is corrupt: {0}")]
    Corrupt(String),
}

/// Repository for suspended and in-flight runs
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Persist the current snapshot of a run, replacing any previous one
    async fn save(&self, ctx: &RunContext) -> Result<(), StoreError>;

    /// Load a run snapshot by id
    async fn load(&self, run_id: &str) -> Result<Option<RunContext>, StoreError>;
}
