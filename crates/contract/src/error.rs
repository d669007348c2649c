//! The error taxonomy shared by the validator and the registration reducer
//! (§6 External Interfaces, §7 Error Handling Design).

use serde_json::Value;
use thiserror::Error;

/// One structural or semantic validation failure.
///
/// Always carries `kind == "VALIDATION_ERROR"`; `context` holds whatever
/// identifiers are relevant (step id, dependency id, …) for a caller to
/// render without string-parsing the message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub context: Value,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, context: Value) -> Self {
        Self {
            message: message.into(),
            context,
        }
    }
}

/// All validation failures for one `validate` call, in the deterministic
/// order required by §4.1: step-structural, then dependency, then cycle.
#[derive(Debug, Clone, Error)]
#[error("workflow failed validation with {} error(s)", .0.len())]
pub struct ValidationErrors(pub Vec<ValidationError>);

/// Errors surfaced by `registration::reduce` (§6, §7).
#[derive(Debug, Clone, Error)]
pub enum ReductionError {
    /// The event is not defined for the current state.
    #[error("no transition defined for event {event:?} from state {state:?}")]
    InvalidTransition {
        state: crate::registration::RegistrationState,
        event: crate::registration::RegistrationEvent,
    },

    /// The event is defined for the state, but context doesn't match what
    /// the transition expects (e.g. `POSTGRES_SUCCEEDED` with
    /// `postgres_applied == false`).
    #[error("state mismatch: {0}")]
    StateMismatch(String),

    /// A `RETRY`/`RETRY_POSTGRES` was rejected because `retry_count` has
    /// already reached the bound (§8 Retry bound).
    #[error("retry exhausted after {attempted} attempts (max {max})")]
    RetryExhausted { attempted: u32, max: u32 },

    /// A guard evaluated to `false`.
    #[error("guard failed: {0}")]
    GuardFailed(String),

    /// A guard referenced an operator the reducer doesn't implement.
    #[error("guard evaluation error: unsupported operator '{0}'")]
    GuardEvaluationError(String),

    /// A guard compared values of incompatible types.
    #[error("guard type error: {0}")]
    GuardTypeError(String),
}
