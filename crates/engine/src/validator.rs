//! Contract Validator — checks that a `(WorkflowDefinition, Vec<WorkflowStep>)`
//! pair is executable before it ever reaches the scheduler or executor.
//!
//! Errors are collected, never short-circuited, and returned in a fixed
//! deterministic order: workflow-level and per-step structural errors in
//! declaration order, then dependency errors in declaration order, then a
//! single cycle error last.

use std::collections::{HashMap, HashSet};

use serde_json::json;

use contract::{ExecutionMode, StepType, ValidationError, ValidationErrors, WorkflowDefinition, WorkflowStep};

/// Verify that `def` and `steps` together describe an executable workflow.
///
/// An empty `steps` list is always valid (§4.1) — it produces an
/// immediate `COMPLETED` result once it reaches the executor.
pub fn validate(def: &WorkflowDefinition, steps: &[WorkflowStep]) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    // ---- workflow-level + per-step structural checks, declaration order ----
    if def.name.trim().is_empty() {
        errors.push(ValidationError::new(
            "workflow name must not be empty",
            json!({ "workflow_id": def.workflow_id }),
        ));
    }

    if matches!(def.execution_mode, ExecutionMode::Conditional | ExecutionMode::Streaming) {
        errors.push(ValidationError::new(
            format!("execution_mode {:?} is reserved and not implemented", def.execution_mode),
            json!({ "workflow_id": def.workflow_id }),
        ));
    }

    let mut seen_ids: HashSet<&str> = HashSet::new();
    for step in steps {
        if step.step_type == StepType::Conditional {
            errors.push(ValidationError::new(
                format!("step '{}' has reserved step_type 'conditional'", step.step_id),
                json!({ "step_id": step.step_id }),
            ));
        }

        if step.timeout_ms < 100 {
            errors.push(ValidationError::new(
                format!("step '{}' timeout_ms {} is below the minimum of 100", step.step_id, step.timeout_ms),
                json!({ "step_id": step.step_id, "timeout_ms": step.timeout_ms }),
            ));
        }

        if !seen_ids.insert(step.step_id.as_str()) {
            errors.push(ValidationError::new(
                format!("duplicate step_id '{}'", step.step_id),
                json!({ "step_id": step.step_id }),
            ));
        }
    }

    // ---- dependency checks, declaration order ----
    let known_ids: HashSet<&str> = steps.iter().map(|s| s.step_id.as_str()).collect();
    for step in steps {
        for dep in &step.depends_on {
            if !known_ids.contains(dep.as_str()) {
                errors.push(ValidationError::new(
                    format!("step '{}' depends_on unknown step_id '{}'", step.step_id, dep),
                    json!({ "step_id": step.step_id, "depends_on": dep }),
                ));
            }
        }
    }

    // ---- cycle check, enabled subgraph only, last ----
    if has_cycle_in_enabled_subgraph(steps) {
        errors.push(ValidationError::new(
            "workflow graph contains a cycle among enabled steps",
            json!({ "workflow_id": def.workflow_id }),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// DFS cycle detection over the subgraph induced by `depends_on` edges
/// between *enabled* steps only (§4.1 DAG-invariance rule, GLOSSARY). A
/// disabled step is treated as a satisfied dependency, so it never
/// contributes an edge to this graph in either direction.
fn has_cycle_in_enabled_subgraph(steps: &[WorkflowStep]) -> bool {
    let enabled: HashSet<&str> = steps
        .iter()
        .filter(|s| s.enabled)
        .map(|s| s.step_id.as_str())
        .collect();

    let adjacency: HashMap<&str, Vec<&str>> = steps
        .iter()
        .filter(|s| s.enabled)
        .map(|s| {
            let deps: Vec<&str> = s
                .depends_on
                .iter()
                .map(|d| d.as_str())
                .filter(|d| enabled.contains(d))
                .collect();
            (s.step_id.as_str(), deps)
        })
        .collect();

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut marks: HashMap<&str, Mark> = enabled.iter().map(|&id| (id, Mark::Unvisited)).collect();

    fn visit<'a>(
        node: &'a str,
        adjacency: &HashMap<&'a str, Vec<&'a str>>,
        marks: &mut HashMap<&'a str, Mark>,
    ) -> bool {
        match marks.get(node) {
            Some(Mark::InProgress) => return true,
            Some(Mark::Done) => return false,
            _ => {}
        }

        marks.insert(node, Mark::InProgress);
        if let Some(deps) = adjacency.get(node) {
            for &dep in deps {
                if visit(dep, adjacency, marks) {
                    return true;
                }
            }
        }
        marks.insert(node, Mark::Done);
        false
    }

    for &id in enabled.iter() {
        if marks.get(id) == Some(&Mark::Unvisited) {
            if visit(id, &adjacency, &mut marks) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_definition, sample_step};

    #[test]
    fn empty_step_list_is_valid() {
        let def = sample_definition("noop", ExecutionMode::Sequential);
        assert!(validate(&def, &[]).is_ok());
    }

    #[test]
    fn empty_name_is_rejected() {
        let def = sample_definition("", ExecutionMode::Sequential);
        let err = validate(&def, &[]).unwrap_err();
        assert_eq!(err.0.len(), 1);
    }

    #[test]
    fn conditional_mode_is_rejected() {
        let def = sample_definition("wf", ExecutionMode::Conditional);
        assert!(validate(&def, &[]).is_err());
    }

    #[test]
    fn conditional_step_type_is_rejected() {
        let def = sample_definition("wf", ExecutionMode::Sequential);
        let mut step = sample_step("a", 0, vec![]);
        step.step_type = StepType::Conditional;
        let err = validate(&def, &[step]).unwrap_err();
        assert!(err.0.iter().any(|e| e.message.contains("conditional")));
    }

    #[test]
    fn duplicate_step_id_is_rejected() {
        let def = sample_definition("wf", ExecutionMode::Sequential);
        let a = sample_step("a", 0, vec![]);
        let a2 = sample_step("a", 1, vec![]);
        let err = validate(&def, &[a, a2]).unwrap_err();
        assert!(err.0.iter().any(|e| e.message.contains("duplicate")));
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let def = sample_definition("wf", ExecutionMode::Sequential);
        let a = sample_step("a", 0, vec!["ghost".into()]);
        let err = validate(&def, &[a]).unwrap_err();
        assert!(err.0.iter().any(|e| e.message.contains("unknown step_id")));
    }

    #[test]
    fn cycle_among_enabled_steps_is_rejected() {
        let def = sample_definition("wf", ExecutionMode::Sequential);
        let a = sample_step("a", 0, vec!["b".into()]);
        let b = sample_step("b", 1, vec!["a".into()]);
        let err = validate(&def, &[a, b]).unwrap_err();
        assert!(err.0.last().unwrap().message.contains("cycle"));
    }

    #[test]
    fn cycle_through_disabled_step_is_not_a_cycle() {
        let def = sample_definition("wf", ExecutionMode::Sequential);
        let a = sample_step("a", 0, vec!["b".into()]);
        let mut b = sample_step("b", 1, vec!["a".into()]);
        b.enabled = false;
        assert!(validate(&def, &[a, b]).is_ok());
    }

    #[test]
    fn timeout_below_minimum_is_rejected() {
        let def = sample_definition("wf", ExecutionMode::Sequential);
        let mut a = sample_step("a", 0, vec![]);
        a.timeout_ms = 50;
        let err = validate(&def, &[a]).unwrap_err();
        assert!(err.0.iter().any(|e| e.message.contains("timeout_ms")));
    }

    #[test]
    fn errors_are_ordered_structural_then_dependency_then_cycle() {
        let def = sample_definition("wf", ExecutionMode::Sequential);
        let mut a = sample_step("a", 0, vec!["b".into(), "ghost".into()]);
        a.timeout_ms = 1;
        let b = sample_step("b", 1, vec!["a".into()]);
        let err = validate(&def, &[a, b]).unwrap_err();
        // structural (timeout) first, then dependency (ghost), cycle last
        assert!(err.0[0].message.contains("timeout_ms"));
        assert!(err.0.iter().any(|e| e.message.contains("ghost")));
        assert!(err.0.last().unwrap().message.contains("cycle"));
    }
}
