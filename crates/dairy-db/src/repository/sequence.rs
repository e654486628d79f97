//! # Document Number Sequences
//!
//! Monotonic counters behind `O####` and `INV####`.
//!
//! ```text
//! number_sequences
//! ┌──────────────────┬────────────┐
//! │ name             │ last_value │
//! ├──────────────────┼────────────┤
//! │ order:{tenant}   │         41 │  ← one per tenant
//! │ invoice          │        107 │  ← shared by all tenants
//! └──────────────────┴────────────┘
//!
//! next:  UPDATE … SET last_value = last_value + 1 … RETURNING last_value
//! ```
//!
//! The increment runs on the caller's transaction connection, so the write
//! lock it takes serialises concurrent allocations. On first use a counter is
//! seeded from the highest number already stored, which keeps numbering
//! monotonic over data written before the counter existed.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{invoice, order};
use dairy_core::numbering::{
    format_number, order_sequence, parse_number, INVOICE_PREFIX, INVOICE_SEQUENCE, ORDER_PREFIX,
};

/// Which counter to draw from.
#[derive(Debug, Clone, Copy)]
pub enum NumberSequence<'a> {
    /// Per-tenant order numbers.
    Order { tenant_id: &'a str },
    /// Invoice numbers, one counter for every tenant.
    Invoice,
}

impl NumberSequence<'_> {
    fn key(&self) -> String {
        match self {
            NumberSequence::Order { tenant_id } => order_sequence(tenant_id),
            NumberSequence::Invoice => INVOICE_SEQUENCE.to_string(),
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            NumberSequence::Order { .. } => ORDER_PREFIX,
            NumberSequence::Invoice => INVOICE_PREFIX,
        }
    }

    async fn latest_existing(&self, conn: &mut SqliteConnection) -> DbResult<Option<String>> {
        match self {
            NumberSequence::Order { tenant_id } => order::latest_number(&mut *conn, tenant_id).await,
            NumberSequence::Invoice => invoice::latest_number(&mut *conn).await,
        }
    }
}

/// Allocates the next formatted number.
pub async fn next_number(conn: &mut SqliteConnection, sequence: NumberSequence<'_>) -> DbResult<String> {
    let key = sequence.key();

    let exists: Option<i64> =
        sqlx::query_scalar("SELECT last_value FROM number_sequences WHERE name = ?1")
            .bind(&key)
            .fetch_optional(&mut *conn)
            .await?;

    if exists.is_none() {
        let start = sequence
            .latest_existing(conn)
            .await?
            .and_then(|latest| parse_number(sequence.prefix(), &latest))
            .unwrap_or(0);

        debug!(sequence = %key, start, "Seeding number sequence");

        sqlx::query("INSERT OR IGNORE INTO number_sequences (name, last_value) VALUES (?1, ?2)")
            .bind(&key)
            .bind(start)
            .execute(&mut *conn)
            .await?;
    }

    let value: i64 = sqlx::query_scalar(
        "UPDATE number_sequences SET last_value = last_value + 1 WHERE name = ?1 RETURNING last_value",
    )
    .bind(&key)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::Internal(format!("number sequence '{}' missing", key)))?;

    Ok(format_number(sequence.prefix(), value))
}
