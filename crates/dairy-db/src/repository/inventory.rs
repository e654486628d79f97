//! SQL for the append-only `inventory_transactions` ledger.
//!
//! There is no update or delete here; the schema's triggers reject both.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::error::DbResult;
use dairy_core::inventory::TransactionFilter;
use dairy_core::InventoryTransaction;

/// Fields of a new ledger row; the id is assigned by SQLite.
#[derive(Debug, Clone)]
pub struct NewTransaction<'a> {
    pub tenant_id: &'a str,
    pub product_id: &'a str,
    pub quantity_delta: i64,
    pub reason: &'a str,
    pub reference_type: &'a str,
    pub reference_id: Option<&'a str>,
    pub note: Option<&'a str>,
    pub created_by: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

pub async fn insert<'e>(
    exec: impl SqliteExecutor<'e>,
    entry: &NewTransaction<'_>,
) -> DbResult<InventoryTransaction> {
    let row = sqlx::query_as::<_, InventoryTransaction>(
        r#"
        INSERT INTO inventory_transactions (
            tenant_id, product_id, quantity_delta, reason,
            reference_type, reference_id, note, created_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        RETURNING
            id, tenant_id, product_id, quantity_delta, reason,
            reference_type, reference_id, note, created_by, created_at
        "#,
    )
    .bind(entry.tenant_id)
    .bind(entry.product_id)
    .bind(entry.quantity_delta)
    .bind(entry.reason)
    .bind(entry.reference_type)
    .bind(entry.reference_id)
    .bind(entry.note)
    .bind(entry.created_by)
    .bind(entry.created_at)
    .fetch_one(exec)
    .await?;

    Ok(row)
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Sqlite>, tenant_id: &'a str, filter: &'a TransactionFilter) {
    builder.push(" WHERE tenant_id = ");
    builder.push_bind(tenant_id);

    if let Some(product_id) = &filter.product_id {
        builder.push(" AND product_id = ");
        builder.push_bind(product_id);
    }
    if let Some(from) = filter.from {
        builder.push(" AND created_at >= ");
        builder.push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND created_at <= ");
        builder.push_bind(to);
    }
}

/// One page of history, newest first.
pub async fn list<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    filter: &TransactionFilter,
    limit: i64,
    offset: i64,
) -> DbResult<Vec<InventoryTransaction>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, tenant_id, product_id, quantity_delta, reason, \
         reference_type, reference_id, note, created_by, created_at \
         FROM inventory_transactions",
    );
    push_filter(&mut builder, tenant_id, filter);
    builder.push(" ORDER BY id DESC LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);

    let rows = builder
        .build_query_as::<InventoryTransaction>()
        .fetch_all(exec)
        .await?;

    Ok(rows)
}

pub async fn count<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    filter: &TransactionFilter,
) -> DbResult<i64> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM inventory_transactions");
    push_filter(&mut builder, tenant_id, filter);

    let count: i64 = builder.build_query_scalar().fetch_one(exec).await?;
    Ok(count)
}

/// Sum of deltas for a product.
pub async fn balance<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    product_id: &str,
) -> DbResult<i64> {
    let sum: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(quantity_delta), 0)
        FROM inventory_transactions
        WHERE tenant_id = ?1 AND product_id = ?2
        "#,
    )
    .bind(tenant_id)
    .bind(product_id)
    .fetch_one(exec)
    .await?;

    Ok(sum)
}
