//! Worker capability records

use serde::{Deserialize, Serialize};

/// Capability card advertised by a remote worker.
///
/// The registry returns records of identical shape for every worker;
/// differences between workers are captured solely in the capability and
/// skill tags and at the RPC level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerCapability {
    pub worker_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl WorkerCapability {
    /// Render this worker for the planning prompt.
    pub fn prompt_summary(&self) -> String {
        format!(
            "- {} (ID: {}):\n  Capabilities: {}\n  Skills: {}\n  Description: {}",
            self.name,
            self.worker_id,
            self.capabilities.join(", "),
            self.skills.join(", "),
            self.description
        )
    }
}
