//! # Invoice / Payment Ledger
//!
//! Records payments against orders.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_invoice(tenant, {orderId, amount, method, ref?, notes?})       │
//! │       │                                                                 │
//! │       ├── order missing ─────────────────────────► OrderNotFound       │
//! │       ├── order.invoice_status == Paid ──────────► OrderFullyPaid      │
//! │       ├── amount <= 0 ───────────────────────────► InvalidAmount       │
//! │       ├── amount > total − paid ─────────────────► AmountExceedsBalance│
//! │       ▼  (one transaction)                                             │
//! │  next INV####, INSERT invoice (Paid, amount)                           │
//! │  UPDATE orders  amount_paid += amount, invoice_status                  │
//! │  UPDATE outstanding bill rows of the order to the new status           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::ServiceResult;
use crate::repository::sequence::{next_number, NumberSequence};
use crate::repository::{invoice, order};
use crate::service::begin_write;
use dairy_core::order::{apply_payment, RecordPaymentRequest};
use dairy_core::{new_id, CoreError, Invoice, InvoiceStatus, Money};

#[derive(Debug, Clone)]
pub struct PaymentLedger {
    pool: SqlitePool,
}

impl PaymentLedger {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentLedger { pool }
    }

    /// Records one payment. The returned row is the payment itself, always
    /// `Paid`; the order carries the running status.
    pub async fn create_invoice(
        &self,
        tenant_id: &str,
        request: &RecordPaymentRequest,
        user_id: Option<&str>,
    ) -> ServiceResult<Invoice> {
        let mut tx = begin_write(&self.pool).await?;

        let target = order::find(&mut *tx, tenant_id, &request.order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(request.order_id.clone()))?;

        let outcome = apply_payment(&target, Money::from_cents(request.amount_cents))?;

        let now = Utc::now();
        let payment = Invoice {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            invoice_number: next_number(&mut tx, NumberSequence::Invoice).await?,
            order_id: target.id.clone(),
            amount_cents: request.amount_cents,
            payment_method: request.payment_method,
            status: InvoiceStatus::Paid,
            reference_number: request.reference_number.clone(),
            notes: request.notes.clone(),
            created_by: user_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        invoice::insert(&mut *tx, &payment).await?;

        order::update_payment(
            &mut *tx,
            tenant_id,
            &target.id,
            outcome.amount_paid.cents(),
            outcome.invoice_status,
            now,
        )
        .await?;

        invoice::settle_outstanding(&mut *tx, tenant_id, &target.id, &payment.id, outcome.invoice_status, now)
            .await?;

        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            order_id = %target.id,
            invoice_number = %payment.invoice_number,
            amount = %Money::from_cents(payment.amount_cents),
            paid_to_date = %outcome.amount_paid,
            status = ?outcome.invoice_status,
            "Payment recorded"
        );
        Ok(payment)
    }
}
