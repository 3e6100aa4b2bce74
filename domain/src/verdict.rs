//! Gate judgements parsed from LLM replies.
//!
//! Two call sites return a structured verdict: the validation gate and the
//! replan analyser. Both must tolerate fenced JSON, missing fields, and
//! outright garbage; each has a safe default direction (validation fails
//! closed, analysis fails forward) enforced by the use cases, not here.

use crate::util::extract_json_payload;
use serde::Deserialize;

/// Scope classification from the validation gate.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationVerdict {
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub reasoning: String,
}

impl ValidationVerdict {
    /// Parse a verdict from a model response. `None` means the reply was
    /// not decodable; the validator treats that as a rejection.
    pub fn parse(response: &str) -> Option<Self> {
        serde_json::from_str(extract_json_payload(response)).ok()
    }
}

/// Sufficiency judgement from the replan analyser.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisVerdict {
    #[serde(default = "default_sufficient")]
    pub is_sufficient: bool,
    #[serde(default)]
    pub reasoning: String,
    /// Suggested approach for the next planning cycle, when insufficient.
    #[serde(default)]
    pub replan_strategy: Option<String>,
}

fn default_sufficient() -> bool {
    true
}

impl AnalysisVerdict {
    /// Parse a verdict from a model response. `None` means undecodable;
    /// the analyser treats that as "sufficient" and proceeds to aggregation.
    pub fn parse(response: &str) -> Option<Self> {
        serde_json::from_str(extract_json_payload(response)).ok()
    }

    /// The reason to hand the planner: the explicit strategy when present,
    /// otherwise the reasoning text.
    pub fn replan_reason(&self) -> String {
        self.replan_strategy
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.reasoning.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_verdict_plain() {
        let v = ValidationVerdict::parse(r#"{"is_valid": true, "reasoning": "on-topic"}"#).unwrap();
        assert!(v.is_valid);
        assert_eq!(v.reasoning, "on-topic");
    }

    #[test]
    fn test_validation_verdict_fenced() {
        let v = ValidationVerdict::parse("```json\n{\"is_valid\": false, \"reasoning\": \"weather\"}\n```")
            .unwrap();
        assert!(!v.is_valid);
    }

    #[test]
    fn test_validation_verdict_missing_fields_reject() {
        // is_valid defaults to false; absent field never approves
        let v = ValidationVerdict::parse(r#"{"reasoning": "hmm"}"#).unwrap();
        assert!(!v.is_valid);
    }

    #[test]
    fn test_validation_verdict_garbage() {
        assert!(ValidationVerdict::parse("yes, looks fine to me").is_none());
    }

    #[test]
    fn test_analysis_verdict_insufficient_with_strategy() {
        let v = AnalysisVerdict::parse(
            r#"{"is_sufficient": false, "reasoning": "no verification", "replan_strategy": "add verification step"}"#,
        )
        .unwrap();
        assert!(!v.is_sufficient);
        assert_eq!(v.replan_reason(), "add verification step");
    }

    #[test]
    fn test_analysis_verdict_falls_back_to_reasoning() {
        let v = AnalysisVerdict::parse(r#"{"is_sufficient": false, "reasoning": "gaps remain"}"#)
            .unwrap();
        assert_eq!(v.replan_reason(), "gaps remain");
    }

    #[test]
    fn test_analysis_verdict_defaults_sufficient() {
        let v = AnalysisVerdict::parse(r#"{"reasoning": "partial"}"#).unwrap();
        assert!(v.is_sufficient);
    }
}
