//! Shared stub ports for use-case tests.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::worker_client::{WorkerClient, WorkerError, WorkerRequest};
use crate::ports::worker_registry::{RegistryError, WorkerRegistry};
use async_trait::async_trait;
use fleet_domain::WorkerCapability;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Gateway stub that replays a scripted sequence of replies.
pub struct StubGateway {
    replies: Mutex<Vec<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl StubGateway {
    /// Every call succeeds with the next reply in order.
    pub fn replies(items: Vec<&str>) -> Self {
        Self::script(items.into_iter().map(Ok).collect())
    }

    /// Mixed script: Ok replies and Err gateway failures, consumed in order.
    pub fn script(items: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                items
                    .into_iter()
                    .rev()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Every call fails.
    pub fn failing() -> Self {
        Self::script(Vec::new())
    }

    /// Sleep before answering each call, for in-flight cancellation tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmGateway for StubGateway {
    async fn complete(
        &self,
        _system: &str,
        user: &str,
        _temperature: f32,
    ) -> Result<String, GatewayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(user.to_string());
        match self.replies.lock().unwrap().pop() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(msg)) => Err(GatewayError::RequestFailed(msg)),
            None => Err(GatewayError::Other("gateway script exhausted".to_string())),
        }
    }
}

/// Per-worker behaviour for the stub client.
#[derive(Clone)]
pub enum WorkerBehavior {
    Succeed(String),
    /// Sleep before succeeding, for concurrency and timeout tests
    Delay(Duration, String),
    Transport(String),
    Remote(String),
}

/// Worker client stub with scripted per-worker behaviour.
#[derive(Default)]
pub struct StubWorkerClient {
    behaviors: HashMap<String, WorkerBehavior>,
    invocations: Mutex<Vec<(String, String)>>,
}

impl StubWorkerClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(mut self, worker_id: &str, behavior: WorkerBehavior) -> Self {
        self.behaviors.insert(worker_id.to_string(), behavior);
        self
    }

    /// `(worker_id, payload)` pairs in dispatch order.
    pub fn invocations(&self) -> Vec<(String, String)> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }
}

#[async_trait]
impl WorkerClient for StubWorkerClient {
    async fn invoke(&self, worker_id: &str, request: WorkerRequest) -> Result<String, WorkerError> {
        self.invocations
            .lock()
            .unwrap()
            .push((worker_id.to_string(), request.payload.clone()));

        match self.behaviors.get(worker_id) {
            None => Ok(format!("done by {}", worker_id)),
            Some(WorkerBehavior::Succeed(text)) => Ok(text.clone()),
            Some(WorkerBehavior::Delay(duration, text)) => {
                tokio::time::sleep(*duration).await;
                Ok(text.clone())
            }
            Some(WorkerBehavior::Transport(msg)) => Err(WorkerError::Transport(msg.clone())),
            Some(WorkerBehavior::Remote(msg)) => Err(WorkerError::Remote(msg.clone())),
        }
    }
}

/// Registry stub over a fixed capability list.
pub struct StubRegistry {
    workers: Vec<WorkerCapability>,
}

impl StubRegistry {
    pub fn new(workers: Vec<WorkerCapability>) -> Self {
        Self { workers }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl WorkerRegistry for StubRegistry {
    async fn list_workers(&self) -> Vec<WorkerCapability> {
        self.workers.clone()
    }

    async fn get_card(&self, worker_id: &str) -> Result<WorkerCapability, RegistryError> {
        self.workers
            .iter()
            .find(|w| w.worker_id == worker_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(worker_id.to_string()))
    }
}

/// Minimal in-memory run store for driver tests.
#[derive(Default)]
pub struct MemoryStore {
    runs: Mutex<HashMap<String, fleet_domain::RunContext>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored run snapshot.
    pub fn all(&self) -> Vec<fleet_domain::RunContext> {
        self.runs.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl fleet_domain::RunRepository for MemoryStore {
    async fn save(&self, ctx: &fleet_domain::RunContext) -> Result<(), fleet_domain::StoreError> {
        self.runs
            .lock()
            .unwrap()
            .insert(ctx.run_id.clone(), ctx.clone());
        Ok(())
    }

    async fn load(
        &self,
        run_id: &str,
    ) -> Result<Option<fleet_domain::RunContext>, fleet_domain::StoreError> {
        Ok(self.runs.lock().unwrap().get(run_id).cloned())
    }
}

/// Convenience capability-card builder for tests.
pub fn capability(worker_id: &str, name: &str) -> WorkerCapability {
    WorkerCapability {
        worker_id: worker_id.to_string(),
        name: name.to_string(),
        description: format!("{} test worker", name),
        capabilities: vec!["general".to_string()],
        skills: Vec::new(),
    }
}
