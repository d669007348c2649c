//! Workflow definition and step types — the input side of the contract.
//!
//! These types are the source of truth for what a workflow looks like in
//! memory. They are plain immutable values: nothing here executes
//! anything. Serialisation round-trips through the JSONB `definition`
//! column of the `workflow_definitions` table (see the `db` crate).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ExecutionMode
// ---------------------------------------------------------------------------

/// How the executor walks the scheduled waves.
///
/// `Conditional` and `Streaming` are part of the wire representation (so a
/// caller's serialized definition round-trips even if it names one) but are
/// always rejected by the validator — see `engine::validator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionMode {
    Sequential,
    Parallel,
    Batch,
    Conditional,
    Streaming,
}

// ---------------------------------------------------------------------------
// StepType
// ---------------------------------------------------------------------------

/// Declares which kind of downstream node a step's emitted Action targets.
///
/// `Conditional` exists only so a malformed wire definition deserializes
/// instead of failing at the JSON layer; the validator rejects it (see
/// validation rules §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Compute,
    Effect,
    Reducer,
    Orchestrator,
    Custom,
    Parallel,
    Conditional,
}

// ---------------------------------------------------------------------------
// ErrorAction
// ---------------------------------------------------------------------------

/// What the executor does when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorAction {
    Stop,
    Continue,
    Retry,
    Compensate,
}

// ---------------------------------------------------------------------------
// WorkflowStep
// ---------------------------------------------------------------------------

/// A single step in the workflow DAG.
///
/// `step_id` is externally assigned and stable; the executor never
/// generates or rewrites it. `depends_on` is semantically a set — order
/// within it carries no meaning — but is stored as a `Vec` to preserve the
/// caller's serialized representation byte-for-byte.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub step_id: String,
    pub step_name: String,
    pub step_type: StepType,
    pub timeout_ms: u64,
    pub retry_count: u32,
    pub priority: u32,
    pub enabled: bool,
    pub skip_on_failure: bool,
    pub continue_on_error: bool,
    pub error_action: ErrorAction,
    pub depends_on: Vec<String>,
    /// Opaque metadata; only string-equality comparisons are permitted on it.
    pub parallel_group: Option<String>,
    /// Preserved for round-trip; has no effect on scheduling (§4.2).
    pub order_index: i64,
    pub correlation_id: Uuid,
    pub metadata: Value,
    pub payload: Value,

    /// Reserved/forward-compat (§6): round-tripped, never interpreted by
    /// the validator, scheduler, or executor — no compensation support.
    #[serde(default)]
    pub compensation_action: Option<Value>,
    /// Reserved/forward-compat (§6): round-tripped, never interpreted —
    /// no checkpointing support.
    #[serde(default)]
    pub checkpoint_required: bool,
    /// Reserved/forward-compat (§6): round-tripped, never interpreted —
    /// the executor does not dedupe actions by it.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

// ---------------------------------------------------------------------------
// CoordinationRules
// ---------------------------------------------------------------------------

/// Workflow-level coordination policy.
///
/// `synchronization_points`, `max_retries`, and `retry_delay_ms` are
/// reserved: preserved on round-trip, never interpreted by the core (the
/// per-step `error_action` always takes precedence — §4.3.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationRules {
    pub failure_recovery_strategy: String,
    pub parallel_execution_allowed: bool,
    pub synchronization_points: Value,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

// ---------------------------------------------------------------------------
// WorkflowDefinition
// ---------------------------------------------------------------------------

/// A complete, immutable workflow definition.
///
/// The four `compensation_enabled`/`saga_pattern`/`checkpoint_enabled`/
/// `execution_graph` fields are forward-compat slots, named and wire-typed
/// per §3/§6: round-tripped through serialisation, never read by the
/// validator, scheduler, or executor (§9 Non-goals: no
/// compensation/saga/checkpoint support).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub workflow_id: Uuid,
    pub name: String,
    pub version: String,
    pub execution_mode: ExecutionMode,
    pub global_timeout_ms: u64,
    pub coordination_rules: CoordinationRules,

    #[serde(default, rename = "compensation_enabled")]
    pub reserved_compensation_enabled: bool,
    #[serde(default, rename = "saga_pattern")]
    pub reserved_saga_pattern: Option<String>,
    #[serde(default, rename = "checkpoint_enabled")]
    pub reserved_checkpoint_enabled: bool,
    #[serde(default, rename = "execution_graph")]
    pub reserved_execution_graph: Option<Value>,

    /// Advisory-only fallback for mode selection (§4.3.1) — read only if
    /// neither a caller override nor `execution_mode` is authoritative,
    /// which in this contract it always is; kept for forward compat with
    /// callers that still populate it.
    #[serde(default)]
    pub workflow_metadata: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> WorkflowDefinition {
        WorkflowDefinition {
            workflow_id: Uuid::new_v4(),
            name: "wf".to_string(),
            version: "1".to_string(),
            execution_mode: ExecutionMode::Sequential,
            global_timeout_ms: 60_000,
            coordination_rules: CoordinationRules {
                failure_recovery_strategy: "stop".to_string(),
                parallel_execution_allowed: true,
                synchronization_points: Value::Null,
                max_retries: 0,
                retry_delay_ms: 0,
            },
            reserved_compensation_enabled: true,
            reserved_saga_pattern: Some("two-phase".to_string()),
            reserved_checkpoint_enabled: true,
            reserved_execution_graph: Some(json!({"nodes": []})),
            workflow_metadata: Value::Null,
        }
    }

    #[test]
    fn reserved_fields_serialize_under_their_contract_names() {
        let wire = serde_json::to_value(sample()).unwrap();
        assert_eq!(wire["compensation_enabled"], json!(true));
        assert_eq!(wire["saga_pattern"], json!("two-phase"));
        assert_eq!(wire["checkpoint_enabled"], json!(true));
        assert_eq!(wire["execution_graph"], json!({"nodes": []}));
        assert!(wire.get("reserved_compensation_enabled").is_none());
    }

    #[test]
    fn a_definition_authored_under_the_contract_names_round_trips() {
        let wire = json!({
            "workflow_id": Uuid::new_v4(),
            "name": "wf",
            "version": "1",
            "execution_mode": "SEQUENTIAL",
            "global_timeout_ms": 60_000,
            "coordination_rules": {
                "failure_recovery_strategy": "stop",
                "parallel_execution_allowed": true,
                "synchronization_points": null,
                "max_retries": 0,
                "retry_delay_ms": 0,
            },
            "compensation_enabled": true,
            "saga_pattern": "two-phase",
            "checkpoint_enabled": true,
            "execution_graph": {"nodes": []},
        });
        let def: WorkflowDefinition = serde_json::from_value(wire).unwrap();
        assert!(def.reserved_compensation_enabled);
        assert_eq!(def.reserved_saga_pattern.as_deref(), Some("two-phase"));
        assert!(def.reserved_checkpoint_enabled);
        assert_eq!(def.reserved_execution_graph, Some(json!({"nodes": []})));
    }

    #[test]
    fn a_definition_with_no_reserved_fields_still_deserializes() {
        let wire = json!({
            "workflow_id": Uuid::new_v4(),
            "name": "wf",
            "version": "1",
            "execution_mode": "SEQUENTIAL",
            "global_timeout_ms": 60_000,
            "coordination_rules": {
                "failure_recovery_strategy": "stop",
                "parallel_execution_allowed": true,
                "synchronization_points": null,
                "max_retries": 0,
                "retry_delay_ms": 0,
            },
        });
        let def: WorkflowDefinition = serde_json::from_value(wire).unwrap();
        assert!(!def.reserved_compensation_enabled);
        assert_eq!(def.reserved_saga_pattern, None);
    }
}
