//! SQL for `invoices`. Rows are inserted once; afterwards only `status` moves.

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::error::DbResult;
use dairy_core::{Invoice, InvoiceStatus};

pub async fn insert<'e>(exec: impl SqliteExecutor<'e>, invoice: &Invoice) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoices (
            id, tenant_id, invoice_number, order_id,
            amount_cents, payment_method, status,
            reference_number, notes, created_by,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&invoice.id)
    .bind(&invoice.tenant_id)
    .bind(&invoice.invoice_number)
    .bind(&invoice.order_id)
    .bind(invoice.amount_cents)
    .bind(invoice.payment_method)
    .bind(invoice.status)
    .bind(&invoice.reference_number)
    .bind(&invoice.notes)
    .bind(&invoice.created_by)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .execute(exec)
    .await?;

    Ok(())
}

/// Invoice rows of an order, oldest first.
pub async fn list_for_order<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    order_id: &str,
) -> DbResult<Vec<Invoice>> {
    let invoices = sqlx::query_as::<_, Invoice>(
        r#"
        SELECT
            id, tenant_id, invoice_number, order_id,
            amount_cents, payment_method, status,
            reference_number, notes, created_by,
            created_at, updated_at
        FROM invoices
        WHERE tenant_id = ?1 AND order_id = ?2
        ORDER BY invoice_number ASC
        "#,
    )
    .bind(tenant_id)
    .bind(order_id)
    .fetch_all(exec)
    .await?;

    Ok(invoices)
}

/// Lexicographically last invoice number across all tenants.
pub async fn latest_number<'e>(exec: impl SqliteExecutor<'e>) -> DbResult<Option<String>> {
    let number: Option<String> = sqlx::query_scalar(
        "SELECT invoice_number FROM invoices ORDER BY invoice_number DESC LIMIT 1",
    )
    .fetch_optional(exec)
    .await?;

    Ok(number)
}

/// Moves the order's outstanding (not yet paid) rows to `status`, except
/// `skip_id`.
pub async fn settle_outstanding<'e>(
    exec: impl SqliteExecutor<'e>,
    tenant_id: &str,
    order_id: &str,
    skip_id: &str,
    status: InvoiceStatus,
    now: DateTime<Utc>,
) -> DbResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE invoices SET status = ?4, updated_at = ?5
        WHERE tenant_id = ?1 AND order_id = ?2 AND id <> ?3 AND status <> 'paid'
        "#,
    )
    .bind(tenant_id)
    .bind(order_id)
    .bind(skip_id)
    .bind(status)
    .bind(now)
    .execute(exec)
    .await?;

    Ok(result.rows_affected())
}
