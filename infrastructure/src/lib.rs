//! Infrastructure layer for fleet-router
//!
//! Adapters behind the application-layer ports: HTTP gateways for the LLM
//! providers, control-plane worker discovery, the worker RPC client, the
//! in-memory run store, and figment-based configuration loading.

pub mod config;
pub mod discovery;
pub mod llm;
pub mod store;
pub mod worker;

pub use config::file_config::FileConfig;
pub use config::loader::ConfigLoader;
pub use discovery::HttpWorkerRegistry;
pub use llm::{build_gateway, LlmSetupError};
pub use store::InMemoryRunStore;
pub use worker::HttpWorkerClient;
