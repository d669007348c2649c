//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models — they carry no domain behaviour.
//! Domain types live in `contract`/`engine`/`registration`; these rows are
//! what a caller gets back after asking `db` to store or fetch one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// workflow_definitions
// ---------------------------------------------------------------------------

/// A persisted `WorkflowDefinition` + its `WorkflowStep` list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowDefinitionRow {
    pub id: Uuid,
    pub name: String,
    /// The `contract::WorkflowDefinition` value, serialised.
    pub definition: serde_json::Value,
    /// The `Vec<contract::WorkflowStep>` value, serialised as a JSON array.
    pub steps: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// workflow_results
// ---------------------------------------------------------------------------

/// A persisted `contract::WorkflowResult`, keyed by its own surrogate id
/// since one `workflow_id` can be executed more than once.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowResultRow {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub status: String,
    pub completed_steps: serde_json::Value,
    pub failed_steps: serde_json::Value,
    pub skipped_steps: serde_json::Value,
    pub execution_time_ms: i64,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// emitted_actions
// ---------------------------------------------------------------------------

/// One `contract::Action` emitted by a `workflow_results` row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmittedActionRow {
    pub id: Uuid,
    pub workflow_result_id: Uuid,
    pub action_type: String,
    pub target_node_type: String,
    pub payload: serde_json::Value,
    pub dependencies: serde_json::Value,
    pub priority: i32,
    pub timeout_ms: i64,
    pub lease_id: Uuid,
    pub epoch: i32,
    pub retry_count: i32,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// registration_records
// ---------------------------------------------------------------------------

/// A persisted snapshot of one node's registration FSM, keyed by `node_id`.
///
/// `context` holds the serialised `contract::RegistrationContext` that the
/// caller must pass back into `registration::reduce` on the next event —
/// the FSM itself never reads or writes this row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RegistrationRecordRow {
    pub id: Uuid,
    pub node_id: Uuid,
    pub state: String,
    pub context: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
