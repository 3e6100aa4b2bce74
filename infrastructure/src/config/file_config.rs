//! Configuration file schema.
//!
//! Mirrors the TOML layout of `fleet.toml`:
//!
//! ```toml
//! [llm]
//! provider = "anthropic"
//! model = "claude-3-5-sonnet-20241022"
//! timeout_secs = 60
//!
//! [control_plane]
//! base_url = "http://localhost:2024"
//!
//! [router]
//! max_replans = 2
//! task_timeout_secs = 300
//! run_deadline_secs = 900
//!
//! [scope]
//! summary = "IT engineering productivity tasks"
//! domains = ["..."]
//! ```

use fleet_application::RouterParams;
use fleet_domain::ScopePolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub control_plane: ControlPlaneConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub scope: ScopeConfig,
}

/// LLM provider selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "anthropic" or "openai"
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Provider-specific model name; None uses the provider default
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

/// Where workers are discovered and invoked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Run-wide orchestration defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default = "default_max_replans")]
    pub max_replans: u32,
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
    /// 0 disables the overall run deadline
    #[serde(default = "default_run_deadline_secs")]
    pub run_deadline_secs: u64,
    /// 0 means unbounded parallel fan-out
    #[serde(default)]
    pub max_parallel_tasks: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_replans: default_max_replans(),
            task_timeout_secs: default_task_timeout_secs(),
            run_deadline_secs: default_run_deadline_secs(),
            max_parallel_tasks: 0,
        }
    }
}

/// Validation scope; empty domains fall back to the platform defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeConfig {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub domains: Vec<String>,
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_base_url() -> String {
    "http://localhost:2024".to_string()
}

fn default_max_replans() -> u32 {
    2
}

fn default_task_timeout_secs() -> u64 {
    300
}

fn default_run_deadline_secs() -> u64 {
    900
}

impl FileConfig {
    /// Orchestration parameters derived from the `[router]` and `[llm]`
    /// sections.
    pub fn router_params(&self) -> RouterParams {
        RouterParams::default()
            .with_max_replans(self.router.max_replans)
            .with_task_timeout(Duration::from_secs(self.router.task_timeout_secs))
            .with_llm_timeout(Duration::from_secs(self.llm.timeout_secs))
            .with_run_deadline(match self.router.run_deadline_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            })
            .with_max_parallel_tasks(match self.router.max_parallel_tasks {
                0 => None,
                cap => Some(cap),
            })
    }

    /// Scope policy from the `[scope]` section, defaulting per-field.
    pub fn scope_policy(&self) -> ScopePolicy {
        let defaults = ScopePolicy::default();
        ScopePolicy {
            summary: self
                .scope
                .summary
                .clone()
                .unwrap_or(defaults.summary),
            domains: if self.scope.domains.is_empty() {
                defaults.domains
            } else {
                self.scope.domains.clone()
            },
        }
    }
}
