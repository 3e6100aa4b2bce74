//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Orchestration failures inside a phase (worker errors, LLM errors) are
/// not errors at this level; they degrade into task state or fallback
/// artifacts. These variants cover misuse of the run lifecycle itself.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No user message provided")]
    EmptyRequest,

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Run {0} is not awaiting approval")]
    NotAwaitingApproval(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            DomainError::EmptyRequest.to_string(),
            "No user message provided"
        );
        assert_eq!(
            DomainError::RunNotFound("r1".to_string()).to_string(),
            "Run not found: r1"
        );
        assert_eq!(
            DomainError::NotAwaitingApproval("r1".to_string()).to_string(),
            "Run r1 is not awaiting approval"
        );
        assert_eq!(DomainError::Cancelled.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::EmptyRequest.is_cancelled());
        assert!(!DomainError::RunNotFound("r1".to_string()).is_cancelled());
    }
}
