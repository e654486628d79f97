//! SQL for `client_addresses`.
//!
//! Rows are owned by either a client or a user; [`AddressOwner::column`]
//! picks the owning column. The partial unique indexes in the schema reject a
//! second default, so callers clear siblings with [`clear_default`] before
//! marking a new one.

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::error::DbResult;
use dairy_core::{AddressOwner, ClientAddress};

const SELECT_ADDRESS: &str = r#"
    SELECT
        id, tenant_id, client_id, user_id, label, is_default,
        name, phone, line1, line2, city, state, postal_code, country,
        created_at, updated_at
    FROM client_addresses
"#;

/// An address scoped to tenant and owner; another owner's row is `None`.
pub async fn find<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    owner: &AddressOwner,
    id: &str,
) -> DbResult<Option<ClientAddress>> {
    let sql = format!(
        "{SELECT_ADDRESS} WHERE tenant_id = ?1 AND {} = ?2 AND id = ?3",
        owner.column()
    );

    let address = sqlx::query_as::<_, ClientAddress>(&sql)
        .bind(tenant_id)
        .bind(owner.id())
        .bind(id)
        .fetch_optional(exec)
        .await?;

    Ok(address)
}

/// Default first, then newest first.
pub async fn list<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    owner: &AddressOwner,
) -> DbResult<Vec<ClientAddress>> {
    let sql = format!(
        "{SELECT_ADDRESS} WHERE tenant_id = ?1 AND {} = ?2 \
         ORDER BY is_default DESC, created_at DESC, id DESC",
        owner.column()
    );

    let addresses = sqlx::query_as::<_, ClientAddress>(&sql)
        .bind(tenant_id)
        .bind(owner.id())
        .fetch_all(exec)
        .await?;

    Ok(addresses)
}

pub async fn count<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    owner: &AddressOwner,
) -> DbResult<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM client_addresses WHERE tenant_id = ?1 AND {} = ?2",
        owner.column()
    );

    let count: i64 = sqlx::query_scalar(&sql)
        .bind(tenant_id)
        .bind(owner.id())
        .fetch_one(exec)
        .await?;

    Ok(count)
}

pub async fn insert<'e>(exec: impl SqliteExecutor<'e>, address: &ClientAddress) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO client_addresses (
            id, tenant_id, client_id, user_id, label, is_default,
            name, phone, line1, line2, city, state, postal_code, country,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        "#,
    )
    .bind(&address.id)
    .bind(&address.tenant_id)
    .bind(&address.client_id)
    .bind(&address.user_id)
    .bind(&address.label)
    .bind(address.is_default)
    .bind(&address.name)
    .bind(&address.phone)
    .bind(&address.line1)
    .bind(&address.line2)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.postal_code)
    .bind(&address.country)
    .bind(address.created_at)
    .bind(address.updated_at)
    .execute(exec)
    .await?;

    Ok(())
}

/// Rewrites the editable fields. Does not touch `is_default`.
pub async fn update_fields<'e>(
    exec: impl SqliteExecutor<'e>,
    address: &ClientAddress,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE client_addresses SET
            label = ?3, name = ?4, phone = ?5, line1 = ?6, line2 = ?7,
            city = ?8, state = ?9, postal_code = ?10, country = ?11,
            updated_at = ?12
        WHERE tenant_id = ?1 AND id = ?2
        "#,
    )
    .bind(&address.tenant_id)
    .bind(&address.id)
    .bind(&address.label)
    .bind(&address.name)
    .bind(&address.phone)
    .bind(&address.line1)
    .bind(&address.line2)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.postal_code)
    .bind(&address.country)
    .bind(address.updated_at)
    .execute(exec)
    .await?;

    Ok(())
}

/// Clears `is_default` on every address of the owner.
pub async fn clear_default<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    owner: &AddressOwner,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let sql = format!(
        "UPDATE client_addresses SET is_default = 0, updated_at = ?3 \
         WHERE tenant_id = ?1 AND {} = ?2 AND is_default = 1",
        owner.column()
    );

    sqlx::query(&sql)
        .bind(tenant_id)
        .bind(owner.id())
        .bind(now)
        .execute(exec)
        .await?;

    Ok(())
}

pub async fn mark_default<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    id: &str,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        "UPDATE client_addresses SET is_default = 1, updated_at = ?3 WHERE tenant_id = ?1 AND id = ?2",
    )
    .bind(tenant_id)
    .bind(id)
    .bind(now)
    .execute(exec)
    .await?;

    Ok(())
}

pub async fn delete<'e>(exec: impl SqliteExecutor<'e>, tenant_id: &str, id: &str) -> DbResult<()> {
    sqlx::query("DELETE FROM client_addresses WHERE tenant_id = ?1 AND id = ?2")
        .bind(tenant_id)
        .bind(id)
        .execute(exec)
        .await?;

    Ok(())
}

/// Most recently created address of the owner, if any.
pub async fn most_recent_id<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    owner: &AddressOwner,
) -> DbResult<Option<String>> {
    let sql = format!(
        "SELECT id FROM client_addresses WHERE tenant_id = ?1 AND {} = ?2 \
         ORDER BY created_at DESC, id DESC LIMIT 1",
        owner.column()
    );

    let id: Option<String> = sqlx::query_scalar(&sql)
        .bind(tenant_id)
        .bind(owner.id())
        .fetch_optional(exec)
        .await?;

    Ok(id)
}
