//! Engine-level error types.
//!
//! `EngineError` only ever surfaces validation failures — the pure
//! `execute` entry point never raises for execution-time problems
//! (non-serializable payload, unmet dependency, timeout); those are
//! captured in `WorkflowResult::failed_steps` instead (§7). The executor
//! only raises for bugs: an invariant the validator should have caught.

use thiserror::Error;

use contract::ValidationErrors;

/// Errors produced by the workflow engine (validation only).
#[derive(Debug, Error)]
pub enum EngineError {
    /// `validate` rejected the `(WorkflowDefinition, Vec<WorkflowStep>)` pair.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}
