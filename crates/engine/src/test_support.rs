//! Shared fixture builders for `validator`, `scheduler`, and `executor`
//! unit tests. Not part of the public API.

use serde_json::{json, Value};
use uuid::Uuid;

use contract::{
    CoordinationRules, ErrorAction, ExecutionMode, StepType, WorkflowDefinition, WorkflowStep,
};

pub fn sample_definition(name: &str, mode: ExecutionMode) -> WorkflowDefinition {
    WorkflowDefinition {
        workflow_id: Uuid::new_v4(),
        name: name.to_string(),
        version: "1".to_string(),
        execution_mode: mode,
        global_timeout_ms: 60_000,
        coordination_rules: CoordinationRules {
            failure_recovery_strategy: "stop".to_string(),
            parallel_execution_allowed: true,
            synchronization_points: Value::Null,
            max_retries: 0,
            retry_delay_ms: 0,
        },
        reserved_compensation_enabled: false,
        reserved_saga_pattern: None,
        reserved_checkpoint_enabled: false,
        reserved_execution_graph: None,
        workflow_metadata: Value::Null,
    }
}

pub fn sample_step(id: &str, order_index: i64, depends_on: Vec<String>) -> WorkflowStep {
    WorkflowStep {
        step_id: id.to_string(),
        step_name: id.to_string(),
        step_type: StepType::Compute,
        timeout_ms: 1_000,
        retry_count: 0,
        priority: 5,
        enabled: true,
        skip_on_failure: false,
        continue_on_error: false,
        error_action: ErrorAction::Stop,
        depends_on,
        parallel_group: None,
        order_index,
        correlation_id: Uuid::new_v4(),
        metadata: Value::Null,
        payload: json!({}),
        compensation_action: None,
        checkpoint_required: false,
        idempotency_key: None,
    }
}
