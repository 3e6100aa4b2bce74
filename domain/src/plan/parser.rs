//! Plan parsing from LLM responses.
//!
//! The planner LLM replies with a JSON object describing the decomposition.
//! This module extracts that object into a [`PlanDraft`]: the raw shape
//! before the planner assigns task ids, validates worker ids against the
//! registry snapshot, and resolves dependency references.

use crate::plan::entities::ExecutionStrategy;
use crate::util::extract_json_payload;
use serde::Deserialize;

/// A task as proposed by the planner LLM, before id assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskDraft {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub worker_id: String,
    #[serde(default)]
    pub worker_name: String,
    /// Raw dependency references: ids, ordinals, or anything else the
    /// model produced. Resolved by the planner.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub rationale: String,
}

/// The planner LLM's raw decomposition.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanDraft {
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub execution_strategy: ExecutionStrategy,
    #[serde(default)]
    pub tasks: Vec<TaskDraft>,
}

/// Parse a plan draft out of a model response.
///
/// Tolerates fenced code blocks and surrounding prose. Returns `None` when
/// no JSON object can be decoded; the planner treats that as a failed plan.
pub fn parse_plan_draft(response: &str) -> Option<PlanDraft> {
    let payload = extract_json_payload(response);
    serde_json::from_str(payload).ok()
}

/// Resolve one raw dependency reference against the ids assigned to a plan.
///
/// Accepted forms, in order:
/// 1. an exact assigned id (`task_3`);
/// 2. an ordinal (`3`, `#3`, or `task 3`) mapped 1-based onto
///    `assigned_ids`;
/// 3. anything else is unresolvable and must be dropped by the caller.
pub fn resolve_dependency(reference: &str, assigned_ids: &[String]) -> Option<String> {
    let reference = reference.trim();

    if assigned_ids.iter().any(|id| id == reference) {
        return Some(reference.to_string());
    }

    let ordinal = reference
        .strip_prefix("task_")
        .or_else(|| reference.strip_prefix("task "))
        .or_else(|| reference.strip_prefix('#'))
        .unwrap_or(reference);

    if let Ok(n) = ordinal.parse::<usize>()
        && n >= 1
        && n <= assigned_ids.len()
    {
        return Some(assigned_ids[n - 1].clone());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN_JSON: &str = r#"{
        "analysis": "Two independent checks",
        "execution_strategy": "parallel",
        "tasks": [
            {
                "description": "Validate code syntax",
                "worker_id": "quick",
                "worker_name": "QuickWorker",
                "dependencies": [],
                "rationale": "Fast syntax checks are its specialty"
            },
            {
                "description": "Fix SonarQube violations",
                "worker_id": "sonar",
                "worker_name": "SonarWorker",
                "dependencies": [],
                "rationale": "Owns code-quality remediation"
            }
        ]
    }"#;

    #[test]
    fn test_parse_plain_plan() {
        let draft = parse_plan_draft(PLAN_JSON).unwrap();
        assert_eq!(draft.execution_strategy, ExecutionStrategy::Parallel);
        assert_eq!(draft.tasks.len(), 2);
        assert_eq!(draft.tasks[0].worker_id, "quick");
    }

    #[test]
    fn test_parse_fenced_plan() {
        let response = format!("Here is the plan:\n```json\n{}\n```", PLAN_JSON);
        let draft = parse_plan_draft(&response).unwrap();
        assert_eq!(draft.tasks.len(), 2);
    }

    #[test]
    fn test_parse_missing_fields_default() {
        let draft = parse_plan_draft(r#"{"tasks": [{"description": "x"}]}"#).unwrap();
        assert_eq!(draft.execution_strategy, ExecutionStrategy::Sequential);
        assert!(draft.analysis.is_empty());
        assert!(draft.tasks[0].worker_id.is_empty());
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(parse_plan_draft("I could not produce a plan, sorry.").is_none());
    }

    #[test]
    fn test_resolve_exact_id() {
        let ids = vec!["task_1".to_string(), "task_2".to_string()];
        assert_eq!(resolve_dependency("task_2", &ids).as_deref(), Some("task_2"));
    }

    #[test]
    fn test_resolve_ordinal_forms() {
        let ids = vec!["task_1".to_string(), "task_2".to_string()];
        assert_eq!(resolve_dependency("1", &ids).as_deref(), Some("task_1"));
        assert_eq!(resolve_dependency("#2", &ids).as_deref(), Some("task_2"));
        assert_eq!(resolve_dependency("task 2", &ids).as_deref(), Some("task_2"));
    }

    #[test]
    fn test_resolve_out_of_range_or_unknown() {
        let ids = vec!["task_1".to_string()];
        assert!(resolve_dependency("3", &ids).is_none());
        assert!(resolve_dependency("0", &ids).is_none());
        assert!(resolve_dependency("the first one", &ids).is_none());
    }
}
