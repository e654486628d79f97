//! SQL for the `clients` table.

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::error::DbResult;
use dairy_core::Client;

const SELECT_CLIENT: &str = r#"
    SELECT
        id, tenant_id, name, email, phone,
        is_active, total_purchases_cents,
        created_at, updated_at
    FROM clients
"#;

pub async fn find<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    id: &str,
) -> DbResult<Option<Client>> {
    let sql = format!("{SELECT_CLIENT} WHERE tenant_id = ?1 AND id = ?2");

    let client = sqlx::query_as::<_, Client>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(exec)
        .await?;

    Ok(client)
}

/// Oldest active client with this email (case-insensitive).
pub async fn find_active_by_email<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    email: &str,
) -> DbResult<Option<Client>> {
    let sql = format!(
        "{SELECT_CLIENT} WHERE tenant_id = ?1 AND lower(email) = lower(?2) AND is_active = 1 \
         ORDER BY created_at ASC LIMIT 1"
    );

    let client = sqlx::query_as::<_, Client>(&sql)
        .bind(tenant_id)
        .bind(email.trim())
        .fetch_optional(exec)
        .await?;

    Ok(client)
}

pub async fn insert<'e>(exec: impl SqliteExecutor<'e>, client: &Client) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO clients (
            id, tenant_id, name, email, phone,
            is_active, total_purchases_cents,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&client.id)
    .bind(&client.tenant_id)
    .bind(&client.name)
    .bind(&client.email)
    .bind(&client.phone)
    .bind(client.is_active)
    .bind(client.total_purchases_cents)
    .bind(client.created_at)
    .bind(client.updated_at)
    .execute(exec)
    .await?;

    Ok(())
}

/// Soft delete. Returns false when no such client exists in the tenant.
pub async fn deactivate<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    id: &str,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE clients SET is_active = 0, updated_at = ?3 WHERE tenant_id = ?1 AND id = ?2",
    )
    .bind(tenant_id)
    .bind(id)
    .bind(now)
    .execute(exec)
    .await?;

    Ok(result.rows_affected() > 0)
}
