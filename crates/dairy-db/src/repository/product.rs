//! # Product Queries
//!
//! SQL for the `products` table.
//!
//! `quantity` is only written by [`apply_delta`], which the inventory ledger
//! calls inside its transaction. Catalog edits go through [`update_details`]
//! and never touch it.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};
use tracing::debug;

use crate::error::DbResult;
use dairy_core::Product;

const SELECT_PRODUCT: &str = r#"
    SELECT
        id, tenant_id, name, sku,
        price_cents, cost_price_cents, quantity,
        product_type, unit, is_active,
        created_at, updated_at
    FROM products
"#;

/// Gets a product scoped to its tenant.
pub async fn find<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    id: &str,
) -> DbResult<Option<Product>> {
    let sql = format!("{SELECT_PRODUCT} WHERE tenant_id = ?1 AND id = ?2");

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(exec)
        .await?;

    Ok(product)
}

/// Gets several products in one round-trip. Missing ids are simply absent.
pub async fn find_many<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    ids: &[String],
) -> DbResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_PRODUCT);
    builder.push(" WHERE tenant_id = ");
    builder.push_bind(tenant_id);
    builder.push(" AND id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let products = builder.build_query_as::<Product>().fetch_all(exec).await?;

    debug!(requested = ids.len(), found = products.len(), "Batch product lookup");
    Ok(products)
}

/// Inserts a product row as given, quantity included.
///
/// Only product creation uses this; the quantity it writes is matched by an
/// "InitialStock" ledger entry in the same transaction.
pub async fn insert<'e>(exec: impl SqliteExecutor<'e>, product: &Product) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO products (
            id, tenant_id, name, sku,
            price_cents, cost_price_cents, quantity,
            product_type, unit, is_active,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&product.id)
    .bind(&product.tenant_id)
    .bind(&product.name)
    .bind(&product.sku)
    .bind(product.price_cents)
    .bind(product.cost_price_cents)
    .bind(product.quantity)
    .bind(&product.product_type)
    .bind(&product.unit)
    .bind(product.is_active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(exec)
    .await?;

    Ok(())
}

/// Writes every catalog field except quantity.
pub async fn update_details<'e>(exec: impl SqliteExecutor<'e>, product: &Product) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE products SET
            name = ?3,
            sku = ?4,
            price_cents = ?5,
            cost_price_cents = ?6,
            product_type = ?7,
            unit = ?8,
            is_active = ?9,
            updated_at = ?10
        WHERE tenant_id = ?1 AND id = ?2
        "#,
    )
    .bind(&product.tenant_id)
    .bind(&product.id)
    .bind(&product.name)
    .bind(&product.sku)
    .bind(product.price_cents)
    .bind(product.cost_price_cents)
    .bind(&product.product_type)
    .bind(&product.unit)
    .bind(product.is_active)
    .bind(product.updated_at)
    .execute(exec)
    .await?;

    Ok(())
}

/// Moves on-hand stock by `delta` and returns the new quantity.
///
/// Unless `allow_negative`, the update only applies when the result stays
/// at or above zero; `None` means the floor blocked it. The condition is part
/// of the UPDATE so a concurrent debit cannot slip under it.
pub async fn apply_delta<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    id: &str,
    delta: i64,
    allow_negative: bool,
    now: DateTime<Utc>,
) -> DbResult<Option<i64>> {
    let quantity: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET quantity = quantity + ?3, updated_at = ?5
        WHERE tenant_id = ?1 AND id = ?2
          AND (?4 OR quantity + ?3 >= 0)
        RETURNING quantity
        "#,
    )
    .bind(tenant_id)
    .bind(id)
    .bind(delta)
    .bind(allow_negative)
    .bind(now)
    .fetch_optional(exec)
    .await?;

    Ok(quantity)
}

/// Number of products in a tenant's catalog.
pub async fn count<'e>(exec: impl SqliteExecutor<'e>, tenant_id: &str) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE tenant_id = ?1")
        .bind(tenant_id)
        .fetch_one(exec)
        .await?;

    Ok(count)
}
