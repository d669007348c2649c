//! `POST /registrations/:node_id/events` — drive one step of the
//! Registration FSM Reducer and persist the resulting snapshot.
//!
//! `registration::reduce` is pure; this handler owns the load-context →
//! reduce → persist sequence, the same shape `executions` uses around
//! `engine::execute`. The first event for a node must be `REGISTER` with
//! a `payload` attached — every later event drives the context already
//! on file.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use contract::{
    Intent, RegistrationContext, RegistrationEvent, RegistrationOutcome, RegistrationPayload,
    RegistrationState, UuidIdSource,
};
use db::repository::registrations;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegistrationEventDto {
    pub event: RegistrationEvent,
    /// Set by the caller once an external Effect collaborator reports
    /// the Postgres upsert outcome; read before the transition guard
    /// for `POSTGRES_SUCCEEDED`/`POSTGRES_FAILED` is evaluated.
    #[serde(default)]
    pub postgres_applied: Option<bool>,
    /// Same, for the Consul registration outcome.
    #[serde(default)]
    pub consul_applied: Option<bool>,
    /// Required only for the initial `REGISTER` event on an unseen node.
    #[serde(default)]
    pub payload: Option<RegistrationPayload>,
    #[serde(default)]
    pub correlation_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationEventResponse {
    pub outcome: RegistrationOutcome,
    pub intents: Vec<Intent>,
}

pub async fn submit_event(
    Path(node_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(dto): Json<RegistrationEventDto>,
) -> Result<Json<RegistrationEventResponse>, StatusCode> {
    let existing = registrations::get_registration(&state.pool, node_id).await;

    let (current_state, mut context, is_new) = match existing {
        Ok(row) => {
            let current_state: RegistrationState =
                serde_json::from_value(serde_json::Value::String(row.state))
                    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
            let context: RegistrationContext =
                serde_json::from_value(row.context).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
            (current_state, context, false)
        }
        Err(db::DbError::NotFound) => {
            if dto.event != RegistrationEvent::Register {
                return Err(StatusCode::CONFLICT);
            }
            let payload = dto.payload.clone().ok_or(StatusCode::BAD_REQUEST)?;
            let context = RegistrationContext {
                postgres_applied: false,
                consul_applied: false,
                retry_count: 0,
                correlation_id: dto.correlation_id.unwrap_or(node_id),
                payload,
            };
            (RegistrationState::Unregistered, context, true)
        }
        Err(_) => return Err(StatusCode::INTERNAL_SERVER_ERROR),
    };

    if let Some(applied) = dto.postgres_applied {
        context.postgres_applied = applied;
    }
    if let Some(applied) = dto.consul_applied {
        context.consul_applied = applied;
    }

    let id_source = UuidIdSource;
    let (next_state, next_context, intents) = registration::reduce(current_state, dto.event, &context, &id_source)
        .map_err(|_| StatusCode::CONFLICT)?;

    let state_label = serde_json::to_value(next_state)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default();
    let context_value = serde_json::to_value(&next_context).unwrap_or_default();

    if is_new {
        registrations::create_registration(&state.pool, node_id, &state_label, context_value)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    } else {
        registrations::update_registration(&state.pool, node_id, &state_label, context_value)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    }

    let outcome = RegistrationOutcome::new(next_state, &next_context);
    Ok(Json(RegistrationEventResponse { outcome, intents }))
}
