//! Application layer for fleet-router
//!
//! Use cases for each orchestration phase (validate, plan, execute,
//! analyse, aggregate), the state-machine driver that wires them together,
//! and the ports the infrastructure layer implements (LLM gateway, worker
//! client, worker registry).

pub mod config;
pub mod ports;
pub mod use_cases;

pub use config::RouterParams;
pub use ports::llm_gateway::{GatewayError, LlmGateway};
pub use ports::worker_client::{WorkerClient, WorkerError, WorkerRequest};
pub use ports::worker_registry::{RegistryError, WorkerRegistry};
pub use use_cases::aggregate_results::AggregateResultsUseCase;
pub use use_cases::analyze_results::AnalyzeResultsUseCase;
pub use use_cases::execute_plan::ExecutePlanUseCase;
pub use use_cases::generate_plan::GeneratePlanUseCase;
pub use use_cases::route_request::{
    RouteError, RouteRequestUseCase, RouterInput, RouterOutcome, RouterOutput,
};
pub use use_cases::validate_request::ValidateRequestUseCase;
