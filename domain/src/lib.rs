//! Domain layer for fleet-router
//!
//! Core entities and pure orchestration logic: the run lifecycle, plans and
//! their dependency graphs, worker capability records, prompt templates,
//! and parsing of structured LLM output. No I/O lives here; adapters for
//! LLM providers, worker RPC, and persistence are in the infrastructure
//! layer, behind ports defined in the application layer.

pub mod core;
pub mod plan;
pub mod prompt;
pub mod run;
pub mod scope;
pub mod util;
pub mod verdict;
pub mod worker;

// Re-export commonly used types at the crate root
pub use crate::core::error::DomainError;
pub use crate::plan::entities::{ExecutionStrategy, Plan, Task, TaskStatus};
pub use crate::plan::graph;
pub use crate::plan::parser::{PlanDraft, TaskDraft};
pub use crate::prompt::router::RouterPromptTemplate;
pub use crate::run::entities::{Message, MessageRole, RunContext, RunStatus, Validation};
pub use crate::run::mode::RunMode;
pub use crate::run::repository::{RunRepository, StoreError};
pub use crate::scope::ScopePolicy;
pub use crate::verdict::{AnalysisVerdict, ValidationVerdict};
pub use crate::worker::WorkerCapability;
