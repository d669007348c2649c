//! Workflow definition endpoints: validate-then-persist, read, delete.
//!
//! Validation always runs before a definition is written — `api` never
//! stores a `(WorkflowDefinition, Vec<WorkflowStep>)` pair that
//! `engine::validate` would reject.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use contract::{WorkflowDefinition, WorkflowStep};
use db::{models::WorkflowDefinitionRow, repository::definitions};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateWorkflowDto {
    pub definition: WorkflowDefinition,
    pub steps: Vec<WorkflowStep>,
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorBody {
    pub errors: Vec<ValidationErrorEntry>,
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorEntry {
    pub message: String,
    pub context: serde_json::Value,
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkflowDefinitionRow>>, StatusCode> {
    definitions::list_definitions(&state.pool)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn get(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<WorkflowDefinitionRow>, StatusCode> {
    match definitions::get_definition(&state.pool, id).await {
        Ok(row) => Ok(Json(row)),
        Err(db::DbError::NotFound) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkflowDto>,
) -> Result<(StatusCode, Json<WorkflowDefinitionRow>), (StatusCode, Json<ValidationErrorBody>)> {
    if let Err(errors) = engine::validate(&payload.definition, &payload.steps) {
        let body = ValidationErrorBody {
            errors: errors
                .0
                .into_iter()
                .map(|e| ValidationErrorEntry { message: e.message, context: e.context })
                .collect(),
        };
        return Err((StatusCode::BAD_REQUEST, Json(body)));
    }

    let definition_value = serde_json::to_value(&payload.definition).unwrap_or_default();
    let steps_value = serde_json::to_value(&payload.steps).unwrap_or_default();

    let row = definitions::create_definition(
        &state.pool,
        payload.definition.workflow_id,
        &payload.definition.name,
        definition_value,
        steps_value,
    )
    .await
    .map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ValidationErrorBody { errors: Vec::new() }),
        )
    })?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn delete(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, StatusCode> {
    match definitions::delete_definition(&state.pool, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(db::DbError::NotFound) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
