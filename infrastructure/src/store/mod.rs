//! In-memory run store.
//!
//! The single-process default for suspend/resume: snapshots live behind an
//! async RwLock for the lifetime of the process. Interactive deployments
//! that must survive restarts would swap in a persistent implementation of
//! the same trait.

use async_trait::async_trait;
use fleet_domain::{RunContext, RunRepository, StoreError};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Run store backed by a process-local map
#[derive(Default)]
pub struct InMemoryRunStore {
    runs: RwLock<HashMap<String, RunContext>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunRepository for InMemoryRunStore {
    async fn save(&self, ctx: &RunContext) -> Result<(), StoreError> {
        self.runs
            .write()
            .await
            .insert(ctx.run_id.clone(), ctx.clone());
        Ok(())
    }

    async fn load(&self, run_id: &str) -> Result<Option<RunContext>, StoreError> {
        Ok(self.runs.read().await.get(run_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_domain::{RunMode, RunStatus};

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let store = InMemoryRunStore::new();
        let ctx = RunContext::new("check my code", RunMode::Interactive, 2);
        let run_id = ctx.run_id.clone();

        store.save(&ctx).await.unwrap();
        let loaded = store.load(&run_id).await.unwrap().unwrap();
        assert_eq!(loaded.original_request, "check my code");
        assert_eq!(loaded.mode, RunMode::Interactive);
        assert_eq!(loaded.status, RunStatus::Pending);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let store = InMemoryRunStore::new();
        let mut ctx = RunContext::new("check my code", RunMode::Auto, 2);
        store.save(&ctx).await.unwrap();

        ctx.finish("done");
        store.save(&ctx).await.unwrap();

        let loaded = store.load(&ctx.run_id).await.unwrap().unwrap();
        assert_eq!(loaded.status, RunStatus::Done);
        assert_eq!(loaded.final_response.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_load_unknown_run_is_none() {
        let store = InMemoryRunStore::new();
        assert!(store.load("missing").await.unwrap().is_none());
    }
}
