//! # Order Queries
//!
//! SQL for `orders` and `order_items`.
//!
//! ```text
//! orders (1) ──── (n) order_items      ON DELETE CASCADE
//!    │
//!    └── legacy product_id / quantity / unit_price_cents mirror the first item
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::error::DbResult;
use dairy_core::{InvoiceStatus, Order, OrderItem, OrderStatus};

const SELECT_ORDER: &str = r#"
    SELECT
        id, tenant_id, order_number, client_id,
        product_id, quantity, unit_price_cents,
        total_cents, status, payment_method, invoice_status, amount_paid_cents,
        shipping_name, shipping_phone, shipping_line1, shipping_line2,
        shipping_city, shipping_state, shipping_postal_code, shipping_country,
        billing_name, billing_phone, billing_line1, billing_line2,
        billing_city, billing_state, billing_postal_code, billing_country,
        notes, created_by, created_at, updated_at
    FROM orders
"#;

pub async fn find<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    id: &str,
) -> DbResult<Option<Order>> {
    let sql = format!("{SELECT_ORDER} WHERE tenant_id = ?1 AND id = ?2");

    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(exec)
        .await?;

    Ok(order)
}

/// Items in insertion order.
pub async fn items<'e>(exec: impl SqliteExecutor<'e>, order_id: &str) -> DbResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT
            id, order_id, product_id, product_name,
            quantity, unit_price_cents, discount_cents, line_total_cents,
            created_at
        FROM order_items
        WHERE order_id = ?1
        ORDER BY rowid
        "#,
    )
    .bind(order_id)
    .fetch_all(exec)
    .await?;

    Ok(items)
}

/// Lexicographically last order number of a tenant.
pub async fn latest_number<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
) -> DbResult<Option<String>> {
    let number: Option<String> = sqlx::query_scalar(
        "SELECT order_number FROM orders WHERE tenant_id = ?1 ORDER BY order_number DESC LIMIT 1",
    )
    .bind(tenant_id)
    .fetch_optional(exec)
    .await?;

    Ok(number)
}

pub async fn insert<'e>(exec: impl SqliteExecutor<'e>, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, tenant_id, order_number, client_id,
            product_id, quantity, unit_price_cents,
            total_cents, status, payment_method, invoice_status, amount_paid_cents,
            shipping_name, shipping_phone, shipping_line1, shipping_line2,
            shipping_city, shipping_state, shipping_postal_code, shipping_country,
            billing_name, billing_phone, billing_line1, billing_line2,
            billing_city, billing_state, billing_postal_code, billing_country,
            notes, created_by, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6, ?7,
            ?8, ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16,
            ?17, ?18, ?19, ?20,
            ?21, ?22, ?23, ?24,
            ?25, ?26, ?27, ?28,
            ?29, ?30, ?31, ?32
        )
        "#,
    )
    .bind(&order.id)
    .bind(&order.tenant_id)
    .bind(&order.order_number)
    .bind(&order.client_id)
    .bind(&order.product_id)
    .bind(order.quantity)
    .bind(order.unit_price_cents)
    .bind(order.total_cents)
    .bind(order.status)
    .bind(order.payment_method)
    .bind(order.invoice_status)
    .bind(order.amount_paid_cents)
    .bind(&order.shipping_name)
    .bind(&order.shipping_phone)
    .bind(&order.shipping_line1)
    .bind(&order.shipping_line2)
    .bind(&order.shipping_city)
    .bind(&order.shipping_state)
    .bind(&order.shipping_postal_code)
    .bind(&order.shipping_country)
    .bind(&order.billing_name)
    .bind(&order.billing_phone)
    .bind(&order.billing_line1)
    .bind(&order.billing_line2)
    .bind(&order.billing_city)
    .bind(&order.billing_state)
    .bind(&order.billing_postal_code)
    .bind(&order.billing_country)
    .bind(&order.notes)
    .bind(&order.created_by)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(exec)
    .await?;

    Ok(())
}

pub async fn insert_item<'e>(exec: impl SqliteExecutor<'e>, item: &OrderItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, product_id, product_name,
            quantity, unit_price_cents, discount_cents, line_total_cents,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(&item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.discount_cents)
    .bind(item.line_total_cents)
    .bind(item.created_at)
    .execute(exec)
    .await?;

    Ok(())
}

/// Overwrites the single line of an edited order.
pub async fn update_item<'e>(exec: impl SqliteExecutor<'e>, item: &OrderItem) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE order_items SET
            product_id = ?2, product_name = ?3, quantity = ?4,
            unit_price_cents = ?5, discount_cents = ?6, line_total_cents = ?7
        WHERE id = ?1
        "#,
    )
    .bind(&item.id)
    .bind(&item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.discount_cents)
    .bind(item.line_total_cents)
    .execute(exec)
    .await?;

    Ok(())
}

pub async fn update_status<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    id: &str,
    status: OrderStatus,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query("UPDATE orders SET status = ?3, updated_at = ?4 WHERE tenant_id = ?1 AND id = ?2")
        .bind(tenant_id)
        .bind(id)
        .bind(status)
        .bind(now)
        .execute(exec)
        .await?;

    Ok(())
}

pub async fn update_payment<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    id: &str,
    amount_paid_cents: i64,
    invoice_status: InvoiceStatus,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE orders
        SET amount_paid_cents = ?3, invoice_status = ?4, updated_at = ?5
        WHERE tenant_id = ?1 AND id = ?2
        "#,
    )
    .bind(tenant_id)
    .bind(id)
    .bind(amount_paid_cents)
    .bind(invoice_status)
    .bind(now)
    .execute(exec)
    .await?;

    Ok(())
}

/// Writes the edited line, totals, payment method and notes of an order.
pub async fn update_line<'e>(exec: impl SqliteExecutor<'e>, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE orders SET
            product_id = ?3, quantity = ?4, unit_price_cents = ?5,
            total_cents = ?6, invoice_status = ?7,
            payment_method = ?8, notes = ?9, updated_at = ?10
        WHERE tenant_id = ?1 AND id = ?2
        "#,
    )
    .bind(&order.tenant_id)
    .bind(&order.id)
    .bind(&order.product_id)
    .bind(order.quantity)
    .bind(order.unit_price_cents)
    .bind(order.total_cents)
    .bind(order.invoice_status)
    .bind(order.payment_method)
    .bind(&order.notes)
    .bind(order.updated_at)
    .execute(exec)
    .await?;

    Ok(())
}

/// Hard delete; items go with it.
pub async fn delete<'e>(exec: impl SqliteExecutor<'e>, tenant_id: &str, id: &str) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM orders WHERE tenant_id = ?1 AND id = ?2")
        .bind(tenant_id)
        .bind(id)
        .execute(exec)
        .await?;

    Ok(result.rows_affected() > 0)
}
