//! Workflow result and emitted-action repository functions.
//!
//! A `contract::WorkflowResult` and its `actions_emitted` are persisted
//! together: the result row first, then one `emitted_actions` row per
//! `Action`, in the order the executor produced them.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{EmittedActionRow, WorkflowResultRow},
    DbError,
};

/// Insert a `WorkflowResult` row.
#[allow(clippy::too_many_arguments)]
pub async fn create_result(
    pool: &PgPool,
    id: Uuid,
    workflow_id: Uuid,
    status: &str,
    completed_steps: serde_json::Value,
    failed_steps: serde_json::Value,
    skipped_steps: serde_json::Value,
    execution_time_ms: i64,
    metadata: serde_json::Value,
) -> Result<WorkflowResultRow, DbError> {
    let now = Utc::now();

    let row = sqlx::query_as!(
        WorkflowResultRow,
        r#"
        INSERT INTO workflow_results
            (id, workflow_id, status, completed_steps, failed_steps, skipped_steps, execution_time_ms, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, workflow_id, status, completed_steps, failed_steps, skipped_steps, execution_time_ms, metadata, created_at
        "#,
        id,
        workflow_id,
        status,
        completed_steps,
        failed_steps,
        skipped_steps,
        execution_time_ms,
        metadata,
        now,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch a single workflow result by its primary key.
pub async fn get_result(pool: &PgPool, id: Uuid) -> Result<WorkflowResultRow, DbError> {
    let row = sqlx::query_as!(
        WorkflowResultRow,
        r#"
        SELECT id, workflow_id, status, completed_steps, failed_steps, skipped_steps, execution_time_ms, metadata, created_at
        FROM workflow_results WHERE id = $1
        "#,
        id,
    )
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Return every result recorded for a given `workflow_id`, newest first.
pub async fn list_results_for_workflow(
    pool: &PgPool,
    workflow_id: Uuid,
) -> Result<Vec<WorkflowResultRow>, DbError> {
    let rows = sqlx::query_as!(
        WorkflowResultRow,
        r#"
        SELECT id, workflow_id, status, completed_steps, failed_steps, skipped_steps, execution_time_ms, metadata, created_at
        FROM workflow_results WHERE workflow_id = $1 ORDER BY created_at DESC
        "#,
        workflow_id,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Insert one emitted-action row, associated with `workflow_result_id`.
#[allow(clippy::too_many_arguments)]
pub async fn insert_emitted_action(
    pool: &PgPool,
    id: Uuid,
    workflow_result_id: Uuid,
    action_type: &str,
    target_node_type: &str,
    payload: serde_json::Value,
    dependencies: serde_json::Value,
    priority: i32,
    timeout_ms: i64,
    lease_id: Uuid,
    epoch: i32,
    retry_count: i32,
    metadata: serde_json::Value,
) -> Result<EmittedActionRow, DbError> {
    let now = Utc::now();

    let row = sqlx::query_as!(
        EmittedActionRow,
        r#"
        INSERT INTO emitted_actions
            (id, workflow_result_id, action_type, target_node_type, payload, dependencies,
             priority, timeout_ms, lease_id, epoch, retry_count, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING id, workflow_result_id, action_type, target_node_type, payload, dependencies,
                  priority, timeout_ms, lease_id, epoch, retry_count, metadata, created_at
        "#,
        id,
        workflow_result_id,
        action_type,
        target_node_type,
        payload,
        dependencies,
        priority,
        timeout_ms,
        lease_id,
        epoch,
        retry_count,
        metadata,
        now,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Return every action emitted as part of one result, in insertion order.
pub async fn list_actions_for_result(
    pool: &PgPool,
    workflow_result_id: Uuid,
) -> Result<Vec<EmittedActionRow>, DbError> {
    let rows = sqlx::query_as!(
        EmittedActionRow,
        r#"
        SELECT id, workflow_result_id, action_type, target_node_type, payload, dependencies,
               priority, timeout_ms, lease_id, epoch, retry_count, metadata, created_at
        FROM emitted_actions WHERE workflow_result_id = $1 ORDER BY created_at ASC
        "#,
        workflow_result_id,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
