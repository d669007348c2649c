//! Registration record repository functions.
//!
//! The FSM itself (`registration::reduce`) is pure and holds no state;
//! these functions are how a caller persists the `(RegistrationState,
//! RegistrationContext)` pair between successive `reduce` calls for a
//! given node.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{models::RegistrationRecordRow, DbError};

/// Insert the initial `unregistered` record for a node.
pub async fn create_registration(
    pool: &PgPool,
    node_id: Uuid,
    state: &str,
    context: serde_json::Value,
) -> Result<RegistrationRecordRow, DbError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as!(
        RegistrationRecordRow,
        r#"
        INSERT INTO registration_records (id, node_id, state, context, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, node_id, state, context, updated_at
        "#,
        id,
        node_id,
        state,
        context,
        now,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch the current registration record for a node.
pub async fn get_registration(pool: &PgPool, node_id: Uuid) -> Result<RegistrationRecordRow, DbError> {
    let row = sqlx::query_as!(
        RegistrationRecordRow,
        r#"SELECT id, node_id, state, context, updated_at FROM registration_records WHERE node_id = $1"#,
        node_id,
    )
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Overwrite a node's registration record with the FSM's latest
/// `(state, context)` pair after a successful `reduce` call.
pub async fn update_registration(
    pool: &PgPool,
    node_id: Uuid,
    state: &str,
    context: serde_json::Value,
) -> Result<(), DbError> {
    let result = sqlx::query!(
        r#"
        UPDATE registration_records
        SET state = $1, context = $2, updated_at = $3
        WHERE node_id = $4
        "#,
        state,
        context,
        Utc::now(),
        node_id,
    )
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
