//! `contract` — immutable value types shared by `engine`, `registration`,
//! `nodes`, `db`, and `api`.
//!
//! Nothing in this crate executes anything: no I/O, no async, no
//! behavior beyond simple derivations (`From`/`PartialEq`/helper
//! constructors). Validation, scheduling, and execution behavior live in
//! `engine`; FSM transition behavior lives in `registration`.

pub mod action;
pub mod error;
pub mod id;
pub mod registration;
pub mod result;
pub mod workflow;

pub use action::{Action, ActionType};
pub use error::{ReductionError, ValidationError, ValidationErrors};
pub use id::{IdSource, SeededIdSource, UuidIdSource};
pub use registration::{
    ConsulHealthCheck, Intent, PostgresRecord, RegistrationContext, RegistrationEvent,
    RegistrationOutcome, RegistrationPayload, RegistrationState, MAX_REGISTRATION_RETRIES,
};
pub use result::{ExecutionStatus, WorkflowResult};
pub use workflow::{CoordinationRules, ErrorAction, ExecutionMode, StepType, WorkflowDefinition, WorkflowStep};
