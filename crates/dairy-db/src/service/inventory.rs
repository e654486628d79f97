//! # Inventory Ledger
//!
//! The only way product stock changes.
//!
//! ## One Adjustment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  adjust_stock(tenant, {productId, delta, reason, ...}, user)            │
//! │       │                                                                 │
//! │       ├── delta == 0 ───────────────────────────────► InvalidDelta     │
//! │       ├── product not in tenant ────────────────────► ProductNotFound  │
//! │       ├── floor: on_hand + delta < 0                                   │
//! │       │   and reason != "Correction" and !allowNegative ► Insufficient │
//! │       │                                                                 │
//! │       ▼  (one transaction)                                             │
//! │  UPDATE products SET quantity = quantity + delta   (floor re-checked)  │
//! │  INSERT INTO inventory_transactions (...)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Context
//! [`adjust_stock_in`] runs on a connection the caller already holds inside
//! a transaction (the order service does this per line). [`InventoryLedger::adjust_stock`]
//! opens and commits its own.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::ServiceResult;
use crate::repository::inventory::{self as ledger, NewTransaction};
use crate::repository::product;
use crate::service::begin_write;
use dairy_core::inventory::{check_floor, is_correction, StockAdjustment, TransactionFilter};
use dairy_core::validation::clamp_page;
use dairy_core::{CoreError, InventoryTransaction, Page};

#[derive(Debug, Clone)]
pub struct InventoryLedger {
    pool: SqlitePool,
}

impl InventoryLedger {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryLedger { pool }
    }

    /// Applies one adjustment in its own transaction.
    pub async fn adjust_stock(
        &self,
        tenant_id: &str,
        adjustment: &StockAdjustment,
        user_id: Option<&str>,
    ) -> ServiceResult<InventoryTransaction> {
        let mut tx = begin_write(&self.pool).await?;
        let entry = adjust_stock_in(&mut tx, tenant_id, adjustment, user_id).await?;
        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            product_id = %entry.product_id,
            delta = entry.quantity_delta,
            reason = %entry.reason,
            transaction_id = entry.id,
            "Stock adjusted"
        );
        Ok(entry)
    }

    /// Ledger history, newest first.
    pub async fn list_transactions(
        &self,
        tenant_id: &str,
        filter: &TransactionFilter,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> ServiceResult<Page<InventoryTransaction>> {
        let (page, page_size) = clamp_page(page, page_size);
        let offset = i64::from(page - 1) * i64::from(page_size);

        let total = ledger::count(&self.pool, tenant_id, filter).await?;
        let items = ledger::list(&self.pool, tenant_id, filter, i64::from(page_size), offset).await?;

        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Sum of all deltas recorded for a product.
    pub async fn ledger_balance(&self, tenant_id: &str, product_id: &str) -> ServiceResult<i64> {
        if product::find(&self.pool, tenant_id, product_id).await?.is_none() {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }
        Ok(ledger::balance(&self.pool, tenant_id, product_id).await?)
    }
}

/// Applies one adjustment on the caller's transaction connection.
pub async fn adjust_stock_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    adjustment: &StockAdjustment,
    user_id: Option<&str>,
) -> ServiceResult<InventoryTransaction> {
    let delta = adjustment.quantity_delta;
    if delta == 0 {
        return Err(CoreError::InvalidDelta.into());
    }

    let product_id = adjustment.product_id.as_str();
    let product = product::find(&mut *conn, tenant_id, product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    let bypass_floor = adjustment.allow_negative || is_correction(&adjustment.reason);

    if let Err(err) = check_floor(
        product_id,
        product.quantity,
        delta,
        &adjustment.reason,
        adjustment.allow_negative,
    ) {
        warn!(
            tenant_id = %tenant_id,
            product_id = %product_id,
            on_hand = product.quantity,
            delta,
            reason = %adjustment.reason,
            "Stock adjustment blocked by floor"
        );
        return Err(err.into());
    }

    let now = Utc::now();
    let on_hand = product::apply_delta(&mut *conn, tenant_id, product_id, delta, bypass_floor, now)
        .await?
        .ok_or_else(|| CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            available: product.quantity,
            requested: -delta,
        })?;

    let entry = ledger::insert(
        &mut *conn,
        &NewTransaction {
            tenant_id,
            product_id,
            quantity_delta: delta,
            reason: adjustment.reason.trim(),
            reference_type: adjustment.reference_type(),
            reference_id: adjustment.reference_id.as_deref(),
            note: adjustment.note.as_deref(),
            created_by: user_id,
            created_at: now,
        },
    )
    .await?;

    debug!(
        product_id = %product_id,
        delta,
        on_hand,
        transaction_id = entry.id,
        "Ledger entry appended"
    );
    Ok(entry)
}

// =============================================================================
// Tests
// =============================================================================
