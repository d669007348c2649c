//! Dual-registry (Postgres + Consul) registration lifecycle types.
//!
//! Consumed and produced by `registration::reduce`; the reducer itself is
//! the only place these types get behavior attached to them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RegistrationPayload
// ---------------------------------------------------------------------------

/// Optional Consul health-check definition attached to a registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsulHealthCheck {
    pub http: Option<String>,
    pub interval: Option<String>,
    pub timeout: Option<String>,
}

/// The row this registration will upsert into Postgres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresRecord {
    pub table: String,
    pub record: Value,
}

/// Everything needed to drive one node through the registration lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationPayload {
    pub node_id: Uuid,
    pub deployment_id: Uuid,
    pub environment: String,
    pub network_id: String,
    pub consul_service_id: String,
    pub consul_service_name: String,
    #[serde(default)]
    pub consul_tags: Vec<String>,
    #[serde(default)]
    pub consul_health_check: Option<ConsulHealthCheck>,
    pub postgres_record: PostgresRecord,
}

impl RegistrationPayload {
    /// Structural validation performed before the FSM is entered (§3).
    ///
    /// This is distinct from, and prior to, the FSM's own `validating`
    /// state, which models an (external) async validation round-trip —
    /// this check only guards against a malformed value reaching the
    /// reducer at all.
    pub fn is_structurally_valid(&self) -> bool {
        !self.consul_service_id.trim().is_empty() && !self.consul_service_name.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// RegistrationState
// ---------------------------------------------------------------------------

/// One of the 10 named states of the dual-registration lifecycle (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    Unregistered,
    Validating,
    RegisteringPostgres,
    PostgresRegistered,
    RegisteringConsul,
    Registered,
    PartialRegistered,
    Deregistering,
    Deregistered,
    Failed,
}

impl RegistrationState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, RegistrationState::Deregistered)
    }
}

// ---------------------------------------------------------------------------
// RegistrationEvent
// ---------------------------------------------------------------------------

/// One of the 15 named triggers that can advance the FSM (§4.4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationEvent {
    Register,
    ValidationPassed,
    ValidationFailed,
    PostgresSucceeded,
    PostgresFailed,
    Continue,
    ConsulSucceeded,
    ConsulFailed,
    Retry,
    RetryPostgres,
    RecoveryComplete,
    Deregister,
    DeregistrationComplete,
    Abandon,
    FatalError,
}

// ---------------------------------------------------------------------------
// RegistrationContext
// ---------------------------------------------------------------------------

/// Mutable-by-replacement context threaded through successive `reduce` calls.
///
/// The reducer never mutates a `RegistrationContext` in place; each call
/// returns a new one as part of its output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationContext {
    pub postgres_applied: bool,
    pub consul_applied: bool,
    pub retry_count: u32,
    pub payload: RegistrationPayload,
    pub correlation_id: Uuid,
}

/// Retry ceiling enforced on `RETRY` / `RETRY_POSTGRES` (§4.4.2, §8).
pub const MAX_REGISTRATION_RETRIES: u32 = 3;

// ---------------------------------------------------------------------------
// RegistrationOutcome
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of a registration, returned to external
/// callers after a `reduce` call — not consumed by the reducer itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    pub state: RegistrationState,
    pub postgres_applied: bool,
    pub consul_applied: bool,
    pub retry_count: u32,
}

impl RegistrationOutcome {
    pub fn new(state: RegistrationState, ctx: &RegistrationContext) -> Self {
        Self {
            state,
            postgres_applied: ctx.postgres_applied,
            consul_applied: ctx.consul_applied,
            retry_count: ctx.retry_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// The declarative description of a side effect the reducer wants an
/// external Effect collaborator to perform. The reducer never performs
/// I/O itself — it only emits these (§4.4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    #[serde(rename = "consul.register")]
    ConsulRegister {
        correlation_id: Uuid,
        service_id: String,
        service_name: String,
        tags: Vec<String>,
        health_check: Option<ConsulHealthCheck>,
    },
    #[serde(rename = "consul.deregister")]
    ConsulDeregister {
        correlation_id: Uuid,
        service_id: String,
    },
    #[serde(rename = "postgres.upsert_registration")]
    PostgresUpsertRegistration {
        correlation_id: Uuid,
        record: PostgresRecord,
    },
    #[serde(rename = "postgres.delete_registration")]
    PostgresDeleteRegistration {
        correlation_id: Uuid,
        node_id: Uuid,
    },
    LogEvent {
        correlation_id: Uuid,
        message: String,
    },
    LogMetric {
        correlation_id: Uuid,
        name: String,
        value: f64,
    },
}

impl Intent {
    pub fn correlation_id(&self) -> Uuid {
        match self {
            Intent::ConsulRegister { correlation_id, .. }
            | Intent::ConsulDeregister { correlation_id, .. }
            | Intent::PostgresUpsertRegistration { correlation_id, .. }
            | Intent::PostgresDeleteRegistration { correlation_id, .. }
            | Intent::LogEvent { correlation_id, .. }
            | Intent::LogMetric { correlation_id, .. } => *correlation_id,
        }
    }
}
