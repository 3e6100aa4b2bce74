//! Dependency-graph logic for plans.
//!
//! Pure functions over a plan's tasks: cycle detection, dependency
//! satisfaction, and the ready frontier used by the parallel executor.

use crate::plan::entities::{Task, TaskStatus};
use std::collections::HashMap;

/// Check that the dependency graph formed by `tasks` is acyclic.
///
/// Dependencies referencing ids outside the plan are ignored here; the
/// planner drops them before a plan is built.
pub fn is_acyclic(tasks: &[Task]) -> bool {
    let index: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();

    // 0 = unvisited, 1 = on stack, 2 = done
    let mut state = vec![0u8; tasks.len()];

    fn visit(
        node: usize,
        tasks: &[Task],
        index: &HashMap<&str, usize>,
        state: &mut [u8],
    ) -> bool {
        match state[node] {
            1 => return false,
            2 => return true,
            _ => {}
        }
        state[node] = 1;
        for dep in &tasks[node].dependencies {
            if let Some(&next) = index.get(dep.as_str())
                && !visit(next, tasks, index, state)
            {
                return false;
            }
        }
        state[node] = 2;
        true
    }

    (0..tasks.len()).all(|i| visit(i, tasks, &index, &mut state))
}

/// Check whether every dependency of `task` is present in `completed` with
/// a successful outcome.
pub fn dependencies_met(task: &Task, completed: &HashMap<String, Task>) -> bool {
    task.dependencies.iter().all(|dep_id| {
        completed
            .get(dep_id)
            .is_some_and(|dep| dep.status == TaskStatus::Completed)
    })
}

/// The ready frontier: tasks not yet executed whose dependencies have all
/// completed successfully.
///
/// The parallel executor dispatches exactly this set once per invocation;
/// deeper layers of the DAG are reached by replan cycles, not by iterative
/// expansion.
pub fn ready_frontier<'a>(tasks: &'a [Task], completed: &HashMap<String, Task>) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| !completed.contains_key(&t.id) && dependencies_met(t, completed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::entities::Task;

    fn task(id: &str, deps: &[&str]) -> Task {
        let mut t = Task::new(id, format!("task {}", id), "w1", "Worker");
        t.dependencies = deps.iter().map(|d| d.to_string()).collect();
        t
    }

    fn completed_map(tasks: Vec<Task>) -> HashMap<String, Task> {
        tasks.into_iter().map(|t| (t.id.clone(), t)).collect()
    }

    #[test]
    fn test_empty_graph_is_acyclic() {
        assert!(is_acyclic(&[]));
    }

    #[test]
    fn test_linear_chain_is_acyclic() {
        let tasks = vec![
            task("task_1", &[]),
            task("task_2", &["task_1"]),
            task("task_3", &["task_2"]),
        ];
        assert!(is_acyclic(&tasks));
    }

    #[test]
    fn test_diamond_is_acyclic() {
        let tasks = vec![
            task("task_1", &[]),
            task("task_2", &["task_1"]),
            task("task_3", &["task_1"]),
            task("task_4", &["task_2", "task_3"]),
        ];
        assert!(is_acyclic(&tasks));
    }

    #[test]
    fn test_self_loop_is_cyclic() {
        let tasks = vec![task("task_1", &["task_1"])];
        assert!(!is_acyclic(&tasks));
    }

    #[test]
    fn test_two_node_cycle() {
        let tasks = vec![task("task_1", &["task_2"]), task("task_2", &["task_1"])];
        assert!(!is_acyclic(&tasks));
    }

    #[test]
    fn test_unknown_dependency_ignored() {
        // References outside the plan do not count as edges
        let tasks = vec![task("task_1", &["elsewhere"])];
        assert!(is_acyclic(&tasks));
    }

    #[test]
    fn test_dependencies_met_requires_success() {
        let t = task("task_2", &["task_1"]);

        let done = completed_map(vec![task("task_1", &[]).completed("ok")]);
        assert!(dependencies_met(&t, &done));

        let failed = completed_map(vec![task("task_1", &[]).failed("boom")]);
        assert!(!dependencies_met(&t, &failed));

        assert!(!dependencies_met(&t, &HashMap::new()));
    }

    #[test]
    fn test_no_dependencies_always_met() {
        assert!(dependencies_met(&task("task_1", &[]), &HashMap::new()));
    }

    #[test]
    fn test_ready_frontier_skips_completed_and_blocked() {
        let tasks = vec![
            task("task_1", &[]),
            task("task_2", &["task_1"]),
            task("task_3", &[]),
        ];
        let done = completed_map(vec![task("task_1", &[]).completed("ok")]);

        let frontier = ready_frontier(&tasks, &done);
        let ids: Vec<&str> = frontier.iter().map(|t| t.id.as_str()).collect();
        // task_1 already done, task_2 unblocked by it, task_3 independent
        assert_eq!(ids, vec!["task_2", "task_3"]);
    }

    #[test]
    fn test_ready_frontier_excludes_dependents_of_failures() {
        let tasks = vec![task("task_1", &[]), task("task_2", &["task_1"])];
        let done = completed_map(vec![task("task_1", &[]).failed("transport error")]);

        let frontier = ready_frontier(&tasks, &done);
        assert!(frontier.is_empty());
    }
}
