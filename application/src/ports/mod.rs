//! Ports: interfaces the infrastructure layer implements

pub mod llm_gateway;
pub mod worker_client;
pub mod worker_registry;
