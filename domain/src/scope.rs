//! Scope policy for the validation gate.
//!
//! The router only accepts requests inside its configured problem domain.
//! The policy feeds both the validation prompt and the rejection artifact
//! shown to the user when a request is declined.

use serde::{Deserialize, Serialize};

/// The domain allow-list the validation gate classifies against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopePolicy {
    /// One-line summary of what the platform is for
    pub summary: String,
    /// Concrete in-scope areas, shown to the user on rejection
    pub domains: Vec<String>,
}

impl Default for ScopePolicy {
    fn default() -> Self {
        Self {
            summary: "IT engineering productivity tasks".to_string(),
            domains: vec![
                "Software development productivity".to_string(),
                "Code quality analysis (SonarQube)".to_string(),
                "CI/CD issues (Jenkins, build failures, deployments)".to_string(),
                "Issue tracking (JIRA tickets)".to_string(),
                "Code repository operations (Git, GitHub, pull requests)".to_string(),
                "Development workflow automation".to_string(),
            ],
        }
    }
}

impl ScopePolicy {
    /// Bullet list of in-scope domains for prompts and rejection text.
    pub fn domain_list(&self) -> String {
        self.domains
            .iter()
            .map(|d| format!("- {}", d))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The terminal artifact for an out-of-scope request.
    pub fn rejection_artifact(&self, reason: &str) -> String {
        format!(
            "I apologize, but I'm unable to help with this request.\n\n\
             Reason: {}\n\n\
             I'm specifically designed to assist with {} including:\n{}\n\n\
             Please rephrase your request to focus on one of these areas, \
             or reach out to the appropriate support channel for your needs.",
            reason,
            self.summary,
            self.domain_list()
        )
    }
}
