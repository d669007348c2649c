//! Workflow definition CRUD operations.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{models::WorkflowDefinitionRow, DbError};

/// Insert a new workflow definition.
///
/// `definition` and `steps` must be the serialised `contract::WorkflowDefinition`
/// and `Vec<contract::WorkflowStep>` respectively — this layer doesn't
/// validate them, that's `engine::validate`'s job, done before this is called.
pub async fn create_definition(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    definition: serde_json::Value,
    steps: serde_json::Value,
) -> Result<WorkflowDefinitionRow, DbError> {
    let now = Utc::now();

    let row = sqlx::query_as!(
        WorkflowDefinitionRow,
        r#"
        INSERT INTO workflow_definitions (id, name, definition, steps, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, definition, steps, created_at
        "#,
        id,
        name,
        definition,
        steps,
        now,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch a single workflow definition by its primary key.
pub async fn get_definition(pool: &PgPool, id: Uuid) -> Result<WorkflowDefinitionRow, DbError> {
    let row = sqlx::query_as!(
        WorkflowDefinitionRow,
        r#"SELECT id, name, definition, steps, created_at FROM workflow_definitions WHERE id = $1"#,
        id,
    )
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Return all workflow definitions ordered by creation time (newest first).
pub async fn list_definitions(pool: &PgPool) -> Result<Vec<WorkflowDefinitionRow>, DbError> {
    let rows = sqlx::query_as!(
        WorkflowDefinitionRow,
        r#"SELECT id, name, definition, steps, created_at FROM workflow_definitions ORDER BY created_at DESC"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Permanently delete a workflow definition by its primary key.
///
/// Returns `DbError::NotFound` if no row was deleted.
pub async fn delete_definition(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query!("DELETE FROM workflow_definitions WHERE id = $1", id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
