//! Workflow Executor — the pure heart of the system (§4.3).
//!
//! `execute` never raises for execution-time problems: a non-serializable
//! payload, an unmet dependency, an explicit step failure, or a blown
//! global timeout all land in `WorkflowResult::failed_steps`, never as a
//! panic or `Result::Err`. It performs no I/O and does not mutate its
//! inputs; it calls `scheduler::schedule` internally but never
//! `validator::validate` — validating the input pair is the caller's
//! separate, prior step.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use contract::{
    Action, ActionType, ExecutionMode, ExecutionStatus, IdSource, WorkflowDefinition,
    WorkflowResult, WorkflowStep,
};

use crate::scheduler::schedule;

/// Run `def`/`steps` to completion and return the terminal result.
///
/// `mode_override` takes precedence over `def.execution_mode` (§4.3.1);
/// `def.workflow_metadata`'s advisory execution-mode hint, if any, is
/// never read — `execution_mode` is always populated on `def` and is
/// therefore always authoritative over it.
#[instrument(skip(def, steps, id_source), fields(workflow_id = %workflow_id))]
pub fn execute(
    def: &WorkflowDefinition,
    steps: &[WorkflowStep],
    workflow_id: uuid::Uuid,
    mode_override: Option<ExecutionMode>,
    id_source: &dyn IdSource,
) -> WorkflowResult {
    let started = Instant::now();
    let mode = mode_override.unwrap_or(def.execution_mode);
    // Read once and reuse for every emitted action, per `IdSource::now`'s
    // contract — otherwise two calls sharing a seeded source but racing
    // the wall clock would stamp different `created_at` values (§8
    // Determinism).
    let now = id_source.now();

    if steps.is_empty() {
        info!("empty step list, returning immediate COMPLETED result");
        return WorkflowResult {
            workflow_id,
            status: ExecutionStatus::Completed,
            completed_steps: Vec::new(),
            failed_steps: Vec::new(),
            skipped_steps: Vec::new(),
            actions_emitted: Vec::new(),
            execution_time_ms: 0,
            metadata: Value::Null,
        };
    }

    let waves = schedule(steps);
    let step_by_id: HashMap<&str, &WorkflowStep> =
        steps.iter().map(|s| (s.step_id.as_str(), s)).collect();

    let mut completed_steps: Vec<String> = Vec::new();
    let mut failed_steps: Vec<String> = Vec::new();
    let mut skipped_steps: Vec<String> = Vec::new();
    let mut actions_emitted: Vec<Action> = Vec::new();

    let mut action_id_by_step: HashMap<&str, uuid::Uuid> = HashMap::new();
    // Disabled steps are treated as a satisfied dependency and never enter
    // this set; failed steps AND steps skipped via skip_on_failure cascade
    // both leave their dependents with an unmet dependency (§4.3.5 table).
    let mut failed_like: HashSet<&str> = HashSet::new();

    let mut terminated_early = false;
    let mut last_wave_size = 0usize;
    let mut last_wave_index = 0usize;
    let global_timeout = std::time::Duration::from_millis(def.global_timeout_ms);

    'waves: for (wave_index, wave) in waves.iter().enumerate() {
        last_wave_size = wave.len();
        last_wave_index = wave_index;

        if started.elapsed() >= global_timeout {
            warn!(wave_index, "global timeout elapsed — marking all unprocessed steps failed");
            for remaining in &waves[wave_index..] {
                for step_id in remaining {
                    failed_steps.push(step_id.clone());
                    failed_like.insert(step_id.as_str());
                }
            }
            last_wave_size = waves[wave_index].len();
            last_wave_index = wave_index;
            terminated_early = true;
            break 'waves;
        }

        let mut halt_rest_of_wave = false;

        for step_id in wave {
            let step = step_by_id[step_id.as_str()];

            if halt_rest_of_wave {
                skipped_steps.push(step_id.clone());
                continue;
            }

            if !step.enabled {
                skipped_steps.push(step_id.clone());
                continue;
            }

            if has_unmet_dependency(step, &failed_like) {
                if step.skip_on_failure {
                    skipped_steps.push(step_id.clone());
                    // A skip-on-failure cascade still leaves an unmet
                    // dependency for *its* dependents — it joins
                    // `failed_like`, not `disabled_or_satisfied`, so the
                    // cascade keeps propagating (§4.3.5 table: "depended
                    // step failed/skipped-due-to-skip_on_failure").
                    failed_like.insert(step_id.as_str());
                } else {
                    failed_steps.push(step_id.clone());
                    failed_like.insert(step_id.as_str());
                    if step.error_action == contract::ErrorAction::Stop {
                        halt_rest_of_wave = true;
                        terminated_early = true;
                    }
                }
                continue;
            }

            match serde_json::to_vec(&step.payload) {
                Err(_) => {
                    failed_steps.push(step_id.clone());
                    failed_like.insert(step_id.as_str());
                    if step.error_action == contract::ErrorAction::Stop {
                        halt_rest_of_wave = true;
                        terminated_early = true;
                    }
                }
                Ok(_) => {
                    let action = derive_action(step, &action_id_by_step, id_source, now);
                    action_id_by_step.insert(step_id.as_str(), action.action_id);
                    actions_emitted.push(action);
                    completed_steps.push(step_id.clone());
                }
            }
        }

        if terminated_early {
            break 'waves;
        }
    }

    let status = if !failed_steps.is_empty() {
        ExecutionStatus::Failed
    } else {
        ExecutionStatus::Completed
    };

    let metadata = if mode == ExecutionMode::Batch {
        json!({ "batch": { "batch_size": last_wave_size, "batch_index": last_wave_index } })
    } else {
        Value::Null
    };

    info!(
        completed = completed_steps.len(),
        failed = failed_steps.len(),
        skipped = skipped_steps.len(),
        "workflow execution finished"
    );

    WorkflowResult {
        workflow_id,
        status,
        completed_steps,
        failed_steps,
        skipped_steps,
        actions_emitted,
        execution_time_ms: started.elapsed().as_millis() as u64,
        metadata,
    }
}

/// A step has an unmet dependency when it depends on a step that is itself
/// failed, or skipped via a `skip_on_failure` cascade — both leave a gap a
/// disabled dependency never would (§4.3.5 table).
fn has_unmet_dependency(step: &WorkflowStep, failed_like: &HashSet<&str>) -> bool {
    step.depends_on.iter().any(|dep| failed_like.contains(dep.as_str()))
}

/// Build the `Action` emitted for one completed step (§4.3.2).
fn derive_action(
    step: &WorkflowStep,
    action_id_by_step: &HashMap<&str, uuid::Uuid>,
    id_source: &dyn IdSource,
    now: DateTime<Utc>,
) -> Action {
    let action_type = ActionType::from(step.step_type);
    let dependencies = step
        .depends_on
        .iter()
        .filter_map(|dep| action_id_by_step.get(dep.as_str()).copied())
        .collect();

    Action {
        action_id: id_source.next_id(),
        action_type,
        target_node_type: contract::action::target_node_type(action_type).to_string(),
        payload: step.payload.clone(),
        dependencies,
        priority: step.priority.min(10),
        timeout_ms: step.timeout_ms,
        lease_id: id_source.next_id(),
        epoch: 0,
        retry_count: step.retry_count,
        metadata: json!({
            "step_name": step.step_name,
            "correlation_id": step.correlation_id,
        }),
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_definition, sample_step};
    use contract::SeededIdSource;

    fn ids(n: usize) -> SeededIdSource {
        SeededIdSource::new((0..n).map(|_| uuid::Uuid::new_v4()))
    }

    #[test]
    fn empty_workflow_completes_immediately() {
        let def = sample_definition("noop", ExecutionMode::Sequential);
        let result = execute(&def, &[], def.workflow_id, None, &ids(0));
        assert_eq!(result.status, ExecutionStatus::Completed);
        assert!(result.actions_emitted.is_empty());
        assert!(result.completed_steps.is_empty());
    }

    #[test]
    fn linear_chain_emits_actions_in_order_with_remapped_dependencies() {
        let def = sample_definition("chain", ExecutionMode::Sequential);
        let a = sample_step("a", 0, vec![]);
        let b = sample_step("b", 1, vec!["a".into()]);
        let c = sample_step("c", 2, vec!["b".into()]);
        let result = execute(&def, &[a, b, c], def.workflow_id, None, &ids(6));

        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(result.completed_steps, vec!["a", "b", "c"]);
        assert_eq!(result.actions_emitted.len(), 3);
        assert_eq!(result.actions_emitted[1].dependencies, vec![result.actions_emitted[0].action_id]);
        assert_eq!(result.actions_emitted[2].dependencies, vec![result.actions_emitted[1].action_id]);
        for action in &result.actions_emitted {
            assert_eq!(action.priority, 5);
        }
    }

    #[test]
    fn diamond_parallel_clamps_priority_and_remaps_dependencies() {
        let def = sample_definition("diamond", ExecutionMode::Parallel);
        let mut a = sample_step("a", 0, vec![]);
        a.priority = 500;
        let mut b = sample_step("b", 1, vec!["a".into()]);
        b.priority = 100;
        let mut c = sample_step("c", 2, vec!["a".into()]);
        c.priority = 100;
        let mut d = sample_step("d", 3, vec!["b".into(), "c".into()]);
        d.priority = 1;

        let result = execute(&def, &[a, b, c, d], def.workflow_id, None, &ids(8));

        assert_eq!(result.completed_steps, vec!["a", "b", "c", "d"]);
        let priorities: Vec<u32> = result.actions_emitted.iter().map(|a| a.priority).collect();
        assert_eq!(priorities, vec![10, 10, 10, 1]);

        let d_action = &result.actions_emitted[3];
        let b_id = result.actions_emitted[1].action_id;
        let c_id = result.actions_emitted[2].action_id;
        assert_eq!(d_action.dependencies, vec![b_id, c_id]);
    }

    #[test]
    fn disabled_middle_step_is_skipped_and_dependency_dropped() {
        let def = sample_definition("disabled-middle", ExecutionMode::Sequential);
        let a = sample_step("a", 0, vec![]);
        let mut b = sample_step("b", 1, vec!["a".into()]);
        b.enabled = false;
        let c = sample_step("c", 2, vec!["b".into()]);

        let result = execute(&def, &[a, b, c], def.workflow_id, None, &ids(4));

        assert_eq!(result.completed_steps, vec!["a", "c"]);
        assert_eq!(result.skipped_steps, vec!["b"]);
        assert_eq!(result.actions_emitted.len(), 2);
        assert!(result.actions_emitted[1].dependencies.is_empty());
    }

    #[test]
    fn blown_global_timeout_fails_all_unprocessed_steps() {
        let mut def = sample_definition("timeout", ExecutionMode::Sequential);
        def.global_timeout_ms = 0;
        let a = sample_step("a", 0, vec![]);
        let b = sample_step("b", 1, vec!["a".into()]);

        let result = execute(&def, &[a, b], def.workflow_id, None, &ids(4));

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(result.failed_steps, vec!["a", "b"]);
        assert!(result.completed_steps.is_empty());
    }

    #[test]
    fn unmet_dependency_cascades_through_a_skip_on_failure_chain() {
        // B's skip-on-failure skip must not read as "satisfied" to C:
        // only a *disabled* step does that (§4.3.5 table).
        let b_failed_like: HashSet<&str> = ["a"].into_iter().collect();
        let c_failed_like: HashSet<&str> = ["b"].into_iter().collect();

        let b = sample_step("b", 1, vec!["a".into()]);
        assert!(has_unmet_dependency(&b, &b_failed_like));

        let c = sample_step("c", 2, vec!["b".into()]);
        assert!(has_unmet_dependency(&c, &c_failed_like));
    }

    #[test]
    fn batch_mode_records_last_wave_metadata() {
        let def = sample_definition("batch", ExecutionMode::Batch);
        let a = sample_step("a", 0, vec![]);
        let b = sample_step("b", 1, vec!["a".into()]);
        let result = execute(&def, &[a, b], def.workflow_id, None, &ids(4));
        assert_eq!(result.metadata["batch"]["batch_size"], json!(1));
        assert_eq!(result.metadata["batch"]["batch_index"], json!(1));
    }

    #[test]
    fn same_inputs_and_a_seeded_id_source_yield_byte_identical_results() {
        let def = sample_definition("deterministic", ExecutionMode::Parallel);
        let a = sample_step("a", 0, vec![]);
        let b = sample_step("b", 1, vec!["a".into()]);
        let c = sample_step("c", 2, vec!["a".into()]);

        let fixed_ids: Vec<uuid::Uuid> = (0..6).map(|_| uuid::Uuid::new_v4()).collect();
        let first = execute(
            &def,
            &[a.clone(), b.clone(), c.clone()],
            def.workflow_id,
            None,
            &contract::SeededIdSource::new(fixed_ids.clone()),
        );
        let second = execute(
            &def,
            &[a, b, c],
            def.workflow_id,
            None,
            &contract::SeededIdSource::new(fixed_ids),
        );

        assert_eq!(first.status, second.status);
        assert_eq!(first.completed_steps, second.completed_steps);
        assert_eq!(first.failed_steps, second.failed_steps);
        assert_eq!(first.skipped_steps, second.skipped_steps);
        assert_eq!(first.metadata, second.metadata);
        assert_eq!(
            serde_json::to_value(&first.actions_emitted).unwrap(),
            serde_json::to_value(&second.actions_emitted).unwrap(),
            "actions_emitted, including every created_at, must be byte-identical"
        );
    }

    #[test]
    fn mode_override_takes_precedence_over_definition_mode() {
        let def = sample_definition("override", ExecutionMode::Sequential);
        let a = sample_step("a", 0, vec![]);
        let result = execute(&def, &[a], def.workflow_id, Some(ExecutionMode::Batch), &ids(2));
        assert!(result.metadata.get("batch").is_some());
    }
}
