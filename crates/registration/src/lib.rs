//! `registration` crate — the Registration FSM Reducer (§4.4).
//!
//! `reduce` is a pure `(state, event, context) -> (state', context',
//! intents)` transition function over the 10-state dual-registry
//! (Postgres + Consul) enrollment lifecycle. It performs no I/O; Postgres
//! and Consul are driven entirely by the `Intent` values it emits for an
//! external Effect collaborator to execute, whose outcome feeds back as
//! the next event.
//!
//! One transition per call: `postgres_registered`'s `CONTINUE` and
//! `registering_consul`'s re-entry via `RETRY` are ordinary table rows
//! like any other, not internally chained — the happy-path scenario (§8
//! scenario 7) lists `CONTINUE` as its own step in the event sequence.

use contract::{
    ConsulHealthCheck, IdSource, Intent, PostgresRecord, ReductionError, RegistrationContext,
    RegistrationEvent, RegistrationState, MAX_REGISTRATION_RETRIES,
};
use tracing::{info, instrument};

/// Advance the registration FSM by one event.
///
/// Returns the new state, the new context (with `retry_count` bookkeeping
/// applied per §4.4.2), and any intents the transition emits. A guard
/// failure or an event undefined for `state` returns `Err` and the
/// caller's state/context are left untouched — a rejected transition
/// never mutates anything (§7).
#[instrument(skip(context, _id_source), fields(correlation_id = %context.correlation_id))]
pub fn reduce(
    state: RegistrationState,
    event: RegistrationEvent,
    context: &RegistrationContext,
    _id_source: &dyn IdSource,
) -> Result<(RegistrationState, RegistrationContext, Vec<Intent>), ReductionError> {
    use RegistrationEvent as E;
    use RegistrationState as S;

    // FATAL_ERROR is defined from every non-terminal state (row 16,
    // "priority 0") and always wins, regardless of what table row the
    // (state, event) pair would otherwise match.
    if matches!(event, E::FatalError) {
        if state.is_terminal() {
            return Err(ReductionError::InvalidTransition { state, event });
        }
        info!(?state, "fatal error — transitioning to failed");
        return Ok((S::Failed, carry_forward(context), Vec::new()));
    }

    match (state, event) {
        (S::Unregistered, E::Register) => {
            if !context.payload.is_structurally_valid() {
                return Err(ReductionError::GuardFailed(
                    "registration payload is not structurally valid".into(),
                ));
            }
            Ok((S::Validating, carry_forward(context), Vec::new()))
        }

        (S::Validating, E::ValidationPassed) => {
            let next_ctx = RegistrationContext { retry_count: 0, ..carry_forward(context) };
            Ok((S::RegisteringPostgres, next_ctx, vec![postgres_upsert_intent(context)]))
        }

        (S::Validating, E::ValidationFailed) => Ok((S::Failed, carry_forward(context), Vec::new())),

        (S::RegisteringPostgres, E::PostgresSucceeded) => {
            if !context.postgres_applied {
                return Err(ReductionError::StateMismatch(
                    "POSTGRES_SUCCEEDED received but context.postgres_applied is false".into(),
                ));
            }
            Ok((S::PostgresRegistered, carry_forward(context), Vec::new()))
        }

        (S::RegisteringPostgres, E::PostgresFailed) => {
            if context.postgres_applied {
                return Err(ReductionError::StateMismatch(
                    "POSTGRES_FAILED received but context.postgres_applied is true".into(),
                ));
            }
            Ok((S::Failed, carry_forward(context), Vec::new()))
        }

        (S::PostgresRegistered, E::Continue) => {
            Ok((S::RegisteringConsul, carry_forward(context), vec![consul_register_intent(context)]))
        }

        (S::RegisteringConsul, E::ConsulSucceeded) => {
            if !context.consul_applied {
                return Err(ReductionError::StateMismatch(
                    "CONSUL_SUCCEEDED received but context.consul_applied is false".into(),
                ));
            }
            let next_ctx = RegistrationContext { retry_count: 0, ..carry_forward(context) };
            Ok((S::Registered, next_ctx, Vec::new()))
        }

        (S::RegisteringConsul, E::ConsulFailed) => {
            if context.consul_applied {
                return Err(ReductionError::StateMismatch(
                    "CONSUL_FAILED received but context.consul_applied is true".into(),
                ));
            }
            Ok((S::PartialRegistered, carry_forward(context), Vec::new()))
        }

        (S::PartialRegistered, E::Retry) => {
            if !context.postgres_applied {
                return Err(ReductionError::GuardFailed(
                    "RETRY from partial_registered requires postgres_applied".into(),
                ));
            }
            if context.retry_count >= MAX_REGISTRATION_RETRIES {
                return Err(ReductionError::RetryExhausted {
                    attempted: context.retry_count,
                    max: MAX_REGISTRATION_RETRIES,
                });
            }
            let next_ctx = RegistrationContext { retry_count: context.retry_count + 1, ..carry_forward(context) };
            Ok((S::RegisteringConsul, next_ctx, vec![consul_register_intent(context)]))
        }

        (S::PartialRegistered, E::RetryPostgres) => {
            if !context.consul_applied {
                return Err(ReductionError::GuardFailed(
                    "RETRY_POSTGRES from partial_registered requires consul_applied".into(),
                ));
            }
            if context.retry_count >= MAX_REGISTRATION_RETRIES {
                return Err(ReductionError::RetryExhausted {
                    attempted: context.retry_count,
                    max: MAX_REGISTRATION_RETRIES,
                });
            }
            let next_ctx = RegistrationContext { retry_count: context.retry_count + 1, ..carry_forward(context) };
            Ok((S::RegisteringPostgres, next_ctx, vec![postgres_upsert_intent(context)]))
        }

        (S::PartialRegistered, E::RecoveryComplete) => {
            if !(context.postgres_applied && context.consul_applied) {
                return Err(ReductionError::GuardFailed(
                    "RECOVERY_COMPLETE requires both postgres_applied and consul_applied".into(),
                ));
            }
            Ok((S::Registered, carry_forward(context), Vec::new()))
        }

        (S::Registered, E::Deregister) => {
            Ok((
                S::Deregistering,
                carry_forward(context),
                vec![consul_deregister_intent(context), postgres_delete_intent(context)],
            ))
        }

        (S::Deregistering, E::DeregistrationComplete) => Ok((S::Deregistered, carry_forward(context), Vec::new())),

        (S::Failed, E::Retry) => {
            if context.retry_count >= MAX_REGISTRATION_RETRIES {
                return Err(ReductionError::RetryExhausted {
                    attempted: context.retry_count,
                    max: MAX_REGISTRATION_RETRIES,
                });
            }
            let next_ctx = RegistrationContext { retry_count: context.retry_count + 1, ..carry_forward(context) };
            Ok((S::Validating, next_ctx, Vec::new()))
        }

        (S::Failed, E::Abandon) => Ok((S::Deregistered, carry_forward(context), Vec::new())),

        // Idempotent on the terminal state (§8): any event received while
        // already `deregistered` simply has no defined transition.
        (from, ev) => Err(ReductionError::InvalidTransition { state: from, event: ev }),
    }
}

fn carry_forward(context: &RegistrationContext) -> RegistrationContext {
    context.clone()
}

fn postgres_upsert_intent(context: &RegistrationContext) -> Intent {
    Intent::PostgresUpsertRegistration {
        correlation_id: context.correlation_id,
        record: PostgresRecord {
            table: context.payload.postgres_record.table.clone(),
            record: context.payload.postgres_record.record.clone(),
        },
    }
}

fn consul_register_intent(context: &RegistrationContext) -> Intent {
    Intent::ConsulRegister {
        correlation_id: context.correlation_id,
        service_id: context.payload.consul_service_id.clone(),
        service_name: context.payload.consul_service_name.clone(),
        tags: context.payload.consul_tags.clone(),
        health_check: context.payload.consul_health_check.clone().map(|h| ConsulHealthCheck {
            http: h.http,
            interval: h.interval,
            timeout: h.timeout,
        }),
    }
}

fn consul_deregister_intent(context: &RegistrationContext) -> Intent {
    Intent::ConsulDeregister {
        correlation_id: context.correlation_id,
        service_id: context.payload.consul_service_id.clone(),
    }
}

fn postgres_delete_intent(context: &RegistrationContext) -> Intent {
    Intent::PostgresDeleteRegistration {
        correlation_id: context.correlation_id,
        node_id: context.payload.node_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract::{PostgresRecord as Rec, RegistrationPayload, UuidIdSource};
    use serde_json::json;
    use uuid::Uuid;

    fn ctx(postgres_applied: bool, consul_applied: bool, retry_count: u32) -> RegistrationContext {
        RegistrationContext {
            postgres_applied,
            consul_applied,
            retry_count,
            correlation_id: Uuid::new_v4(),
            payload: RegistrationPayload {
                node_id: Uuid::new_v4(),
                deployment_id: Uuid::new_v4(),
                environment: "prod".into(),
                network_id: "net-1".into(),
                consul_service_id: "svc-1".into(),
                consul_service_name: "svc".into(),
                consul_tags: vec![],
                consul_health_check: None,
                postgres_record: Rec { table: "nodes".into(), record: json!({}) },
            },
        }
    }

    #[test]
    fn happy_path_reaches_registered_and_emits_expected_intents() {
        let source = UuidIdSource;
        let c0 = ctx(false, false, 0);

        let (s1, c1, i1) = reduce(RegistrationState::Unregistered, RegistrationEvent::Register, &c0, &source).unwrap();
        assert_eq!(s1, RegistrationState::Validating);
        assert!(i1.is_empty());

        let (s2, c2, i2) = reduce(s1, RegistrationEvent::ValidationPassed, &c1, &source).unwrap();
        assert_eq!(s2, RegistrationState::RegisteringPostgres);
        assert_eq!(i2.len(), 1);
        assert!(matches!(i2[0], Intent::PostgresUpsertRegistration { .. }));

        let c2 = RegistrationContext { postgres_applied: true, ..c2 };
        let (s3, c3, i3) = reduce(s2, RegistrationEvent::PostgresSucceeded, &c2, &source).unwrap();
        assert_eq!(s3, RegistrationState::PostgresRegistered);
        assert!(i3.is_empty());

        let (s4, c4, i4) = reduce(s3, RegistrationEvent::Continue, &c3, &source).unwrap();
        assert_eq!(s4, RegistrationState::RegisteringConsul);
        assert_eq!(i4.len(), 1);
        assert!(matches!(i4[0], Intent::ConsulRegister { .. }));

        let c4 = RegistrationContext { consul_applied: true, ..c4 };
        let (s5, _c5, i5) = reduce(s4, RegistrationEvent::ConsulSucceeded, &c4, &source).unwrap();
        assert_eq!(s5, RegistrationState::Registered);
        assert!(i5.is_empty());

        for intent in i2.into_iter().chain(i4.into_iter()) {
            assert_eq!(intent.correlation_id(), c0.correlation_id);
        }
    }

    #[test]
    fn partial_recovery_retries_consul_then_succeeds() {
        let source = UuidIdSource;
        let c = ctx(true, false, 0);
        let (s, c, intents) = reduce(RegistrationState::PartialRegistered, RegistrationEvent::Retry, &c, &source).unwrap();
        assert_eq!(s, RegistrationState::RegisteringConsul);
        assert_eq!(c.retry_count, 1);
        assert_eq!(intents.len(), 1);

        let c = RegistrationContext { consul_applied: true, ..c };
        let (s2, _c2, _) = reduce(s, RegistrationEvent::ConsulSucceeded, &c, &source).unwrap();
        assert_eq!(s2, RegistrationState::Registered);
    }

    #[test]
    fn retry_is_rejected_once_bound_is_reached() {
        let source = UuidIdSource;
        let c = ctx(true, false, MAX_REGISTRATION_RETRIES);
        let err = reduce(RegistrationState::PartialRegistered, RegistrationEvent::Retry, &c, &source).unwrap_err();
        assert!(matches!(err, ReductionError::RetryExhausted { .. }));
    }

    #[test]
    fn deregister_emits_exactly_two_intents() {
        let source = UuidIdSource;
        let c = ctx(true, true, 0);
        let (s, _c, intents) = reduce(RegistrationState::Registered, RegistrationEvent::Deregister, &c, &source).unwrap();
        assert_eq!(s, RegistrationState::Deregistering);
        assert_eq!(intents.len(), 2);
        assert!(matches!(intents[0], Intent::ConsulDeregister { .. }));
        assert!(matches!(intents[1], Intent::PostgresDeleteRegistration { .. }));
    }

    #[test]
    fn abandon_is_only_defined_from_failed() {
        let source = UuidIdSource;
        let c = ctx(true, false, 0);
        let err = reduce(RegistrationState::PartialRegistered, RegistrationEvent::Abandon, &c, &source).unwrap_err();
        assert!(matches!(err, ReductionError::InvalidTransition { .. }));

        let (s, _c, intents) = reduce(RegistrationState::Failed, RegistrationEvent::Abandon, &c, &source).unwrap();
        assert_eq!(s, RegistrationState::Deregistered);
        assert!(intents.is_empty());
    }

    #[test]
    fn deregistered_is_terminal_and_idempotent_under_any_event() {
        let source = UuidIdSource;
        let c = ctx(true, true, 0);
        let err = reduce(RegistrationState::Deregistered, RegistrationEvent::Register, &c, &source).unwrap_err();
        assert!(matches!(err, ReductionError::InvalidTransition { .. }));
        let err = reduce(RegistrationState::Deregistered, RegistrationEvent::FatalError, &c, &source).unwrap_err();
        assert!(matches!(err, ReductionError::InvalidTransition { .. }));
    }

    #[test]
    fn fatal_error_transitions_any_non_terminal_state_to_failed() {
        let source = UuidIdSource;
        let c = ctx(false, false, 0);
        let (s, _c, intents) = reduce(RegistrationState::RegisteringConsul, RegistrationEvent::FatalError, &c, &source).unwrap();
        assert_eq!(s, RegistrationState::Failed);
        assert!(intents.is_empty());
    }

    #[test]
    fn state_mismatch_is_rejected_without_mutating_state() {
        let source = UuidIdSource;
        let c = ctx(false, false, 0); // postgres_applied false
        let err = reduce(RegistrationState::RegisteringPostgres, RegistrationEvent::PostgresSucceeded, &c, &source).unwrap_err();
        assert!(matches!(err, ReductionError::StateMismatch(_)));
    }
}
