//! Run mode definitions: the single user-facing approval axis.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the approval gate behaves for a run.
///
/// - **Auto** (default): fully autonomous, the gate is bypassed entirely.
/// - **Review**: the plan is rendered into the conversation, then
///   auto-approved; transparency without a pause.
/// - **Interactive**: the run suspends after planning and waits for an
///   external `resume(run_id, answer)` before executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Auto,
    Interactive,
    Review,
}

impl RunMode {
    /// Whether planning must pass through the approval gate.
    pub fn requires_approval(&self) -> bool {
        !matches!(self, RunMode::Auto)
    }

    /// Whether the gate suspends the run awaiting an external answer.
    pub fn suspends(&self) -> bool {
        matches!(self, RunMode::Interactive)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Auto => "auto",
            RunMode::Interactive => "interactive",
            RunMode::Review => "review",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" | "a" => Ok(RunMode::Auto),
            "interactive" | "i" => Ok(RunMode::Interactive),
            "review" | "r" => Ok(RunMode::Review),
            _ => Err(format!("Invalid RunMode: {}", s)),
        }
    }
}
