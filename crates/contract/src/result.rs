//! The terminal output of one `engine::execute` call.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::action::Action;

/// Terminal status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// The result of one `execute` call.
///
/// `metadata` must never carry internal bookkeeping (step→action maps,
/// wave structures, dependency graphs) — only externally meaningful
/// facts such as the BATCH-mode `"batch"` entry (see SPEC_FULL §2.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub workflow_id: Uuid,
    pub status: ExecutionStatus,
    /// Step ids that completed, in the order their actions were emitted.
    pub completed_steps: Vec<String>,
    /// Step ids that failed.
    pub failed_steps: Vec<String>,
    /// Step ids skipped (disabled, or cascaded from an upstream failure).
    pub skipped_steps: Vec<String>,
    pub actions_emitted: Vec<Action>,
    pub execution_time_ms: u64,
    pub metadata: Value,
}
