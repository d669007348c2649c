//! The `Action` value — a lease-bearing unit of work emitted by the
//! executor for a downstream Effect/Compute/Reducer/Orchestrator node to
//! run. The core never executes an `Action` itself (see
//! §1 Non-goals: Effect-side execution is an external collaborator).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::workflow::StepType;

/// What kind of downstream node an `Action` targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    Compute,
    Effect,
    Reduce,
    Orchestrate,
    Custom,
}

impl From<StepType> for ActionType {
    /// `compute→COMPUTE, effect→EFFECT, reducer→REDUCE,
    /// orchestrator→ORCHESTRATE, custom→CUSTOM` (§4.3.2).
    ///
    /// `StepType::Parallel` and `StepType::Conditional` never reach here:
    /// `Conditional` is rejected at validation and `Parallel` steps carry
    /// their own `step_type` of one of the five mapped variants — the
    /// "parallel" grouping is expressed via `parallel_group`, not via a
    /// distinct action type. Both fall back to `Custom` rather than panic,
    /// since this conversion must remain total.
    fn from(step_type: StepType) -> Self {
        match step_type {
            StepType::Compute => ActionType::Compute,
            StepType::Effect => ActionType::Effect,
            StepType::Reducer => ActionType::Reduce,
            StepType::Orchestrator => ActionType::Orchestrate,
            StepType::Custom | StepType::Parallel | StepType::Conditional => ActionType::Custom,
        }
    }
}

/// The canonical node-type name an `Action` is routed to.
///
/// Mirrors `ActionType` one-for-one; kept as a separate string field
/// because downstream transports address nodes by name, not by the
/// closed `ActionType` enum (new node types can register under a new
/// `target_node_type` without a contract change).
pub fn target_node_type(action_type: ActionType) -> &'static str {
    match action_type {
        ActionType::Compute => "NodeCompute",
        ActionType::Effect => "NodeEffect",
        ActionType::Reduce => "NodeReducer",
        ActionType::Orchestrate => "NodeOrchestrator",
        ActionType::Custom => "NodeCustom",
    }
}

/// A single emitted unit of work, immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub action_id: Uuid,
    pub action_type: ActionType,
    pub target_node_type: String,
    pub payload: Value,
    /// `action_id`s of actions this one depends on — never `step_id`s,
    /// and never an action from a disabled step (§4.3.2).
    pub dependencies: Vec<Uuid>,
    /// Clamped to `[1, 10]`; always `min(step.priority, 10)` (§8).
    pub priority: u32,
    pub timeout_ms: u64,
    pub lease_id: Uuid,
    /// `0` at creation; only a downstream consumer advances this (§5).
    pub epoch: u64,
    pub retry_count: u32,
    pub metadata: Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
