//! Prompt templates for the router's LLM call sites

pub mod router;
