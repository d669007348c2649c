//! `POST /workflows/:id/execute` — load a persisted definition, run it
//! through the pure executor, and persist the result.
//!
//! This handler is the only place in `api` that calls `engine::execute`;
//! it owns the load → execute → persist sequence so the executor itself
//! never touches the database (§4.3.8 "no I/O").

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use contract::{ExecutionMode, UuidIdSource, WorkflowDefinition, WorkflowResult, WorkflowStep};
use db::repository::{definitions, results};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct ExecuteWorkflowDto {
    /// Overrides `definition.execution_mode` for this run only (§4.3.1).
    #[serde(default)]
    pub mode_override: Option<ExecutionMode>,
}

pub async fn execute(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(dto): Json<ExecuteWorkflowDto>,
) -> Result<(StatusCode, Json<WorkflowResult>), StatusCode> {
    let row = match definitions::get_definition(&state.pool, id).await {
        Ok(row) => row,
        Err(db::DbError::NotFound) => return Err(StatusCode::NOT_FOUND),
        Err(_) => return Err(StatusCode::INTERNAL_SERVER_ERROR),
    };

    let definition: WorkflowDefinition =
        serde_json::from_value(row.definition).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let steps: Vec<WorkflowStep> =
        serde_json::from_value(row.steps).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mode_override = dto.mode_override;
    let id_source = UuidIdSource;
    let result = engine::execute(&definition, &steps, definition.workflow_id, mode_override, &id_source);

    persist_result(&state.pool, &result).await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((StatusCode::OK, Json(result)))
}

async fn persist_result(pool: &db::DbPool, result: &WorkflowResult) -> Result<(), db::DbError> {
    let result_row = results::create_result(
        pool,
        Uuid::new_v4(),
        result.workflow_id,
        status_label(result.status),
        serde_json::to_value(&result.completed_steps).unwrap_or_default(),
        serde_json::to_value(&result.failed_steps).unwrap_or_default(),
        serde_json::to_value(&result.skipped_steps).unwrap_or_default(),
        result.execution_time_ms as i64,
        result.metadata.clone(),
    )
    .await?;

    for action in &result.actions_emitted {
        results::insert_emitted_action(
            pool,
            Uuid::new_v4(),
            result_row.id,
            action_type_label(action.action_type),
            &action.target_node_type,
            action.payload.clone(),
            serde_json::to_value(&action.dependencies).unwrap_or_default(),
            action.priority as i32,
            action.timeout_ms as i64,
            action.lease_id,
            action.epoch as i32,
            action.retry_count as i32,
            action.metadata.clone(),
        )
        .await?;
    }

    Ok(())
}

fn status_label(status: contract::ExecutionStatus) -> &'static str {
    use contract::ExecutionStatus::*;
    match status {
        Pending => "PENDING",
        Running => "RUNNING",
        Completed => "COMPLETED",
        Failed => "FAILED",
        Cancelled => "CANCELLED",
    }
}

fn action_type_label(action_type: contract::ActionType) -> &'static str {
    use contract::ActionType::*;
    match action_type {
        Compute => "COMPUTE",
        Effect => "EFFECT",
        Reduce => "REDUCE",
        Orchestrate => "ORCHESTRATE",
        Custom => "CUSTOM",
    }
}
