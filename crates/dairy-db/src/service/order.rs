//! # Order Orchestrator
//!
//! Creates orders and moves them through their lifecycle. Every operation
//! that touches more than one row runs in a single transaction; an error
//! anywhere returns through `?`, the uncommitted transaction is dropped and
//! SQLite rolls everything back.
//!
//! ## Create Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request ─► order_lines / client_lookup / shipping_choice  (no I/O)    │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   ├── resolve or create client                                         │
//! │   ├── price lines, validate_stock = true                               │
//! │   ├── resolve or create shipping address                               │
//! │   ├── next O#### (per tenant)                                          │
//! │   ├── INSERT order  (billing = copy of shipping)                       │
//! │   ├── per line: INSERT order_item, ledger debit −qty "OrderPlaced"     │
//! │   ├── next INV#### (global)                                            │
//! │   └── INSERT invoice  amount = total, Unpaid                           │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cancel / Delete
//! Cancelling from Pending restores every line through the ledger with
//! reason "OrderCancelled" before the status write, in one transaction.
//! Deleting restores the same way unless the order is already Cancelled.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::ServiceResult;
use crate::repository::sequence::{next_number, NumberSequence};
use crate::repository::{invoice, order, product};
use crate::service::address::resolve_shipping_in;
use crate::service::begin_write;
use crate::service::clients::resolve_client_in;
use crate::service::inventory::adjust_stock_in;
use crate::service::pricing::price_in;
use dairy_core::inventory::{reason, reference, StockAdjustment};
use dairy_core::order::{
    check_editable, plan_transition, restores_stock_on_delete, CreateOrderRequest,
    CreateOrderResult, OrderStatusResult, Transition, UpdateOrderRequest,
};
use dairy_core::validation::{validate_price_cents, validate_quantity};
use dairy_core::{
    new_id, CoreError, Invoice, InvoiceStatus, Money, Order, OrderItem, OrderStatus,
    OrderWithItems, ValidationError,
};

#[derive(Debug, Clone)]
pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    pub fn new(pool: SqlitePool) -> Self {
        OrderService { pool }
    }

    /// Places an order: client, pricing, shipping, order, items, stock
    /// debits and the bill row, all or nothing.
    pub async fn create_order(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        request: &CreateOrderRequest,
    ) -> ServiceResult<CreateOrderResult> {
        let order_lines = request.order_lines()?;
        let legacy = order_lines.is_legacy();
        let lines = order_lines.into_cart_lines();
        let lookup = request.client_lookup()?;
        let shipping_choice = request.shipping_choice()?;

        let mut tx = begin_write(&self.pool).await?;

        let client = resolve_client_in(&mut tx, tenant_id, &lookup).await?;
        let pricing = price_in(&mut tx, tenant_id, &lines, true).await?;
        let shipping = resolve_shipping_in(&mut tx, tenant_id, &client.id, &shipping_choice)
            .await?
            .snapshot();

        let order_number = next_number(&mut tx, NumberSequence::Order { tenant_id }).await?;

        let now = Utc::now();
        let first = pricing.lines.first();
        let placed = Order {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            order_number,
            client_id: client.id.clone(),
            product_id: first.map(|l| l.product_id.clone()),
            quantity: first.map(|l| l.quantity),
            unit_price_cents: first.map(|l| l.unit_price_cents),
            total_cents: pricing.total_cents,
            status: OrderStatus::Pending,
            payment_method: request.payment_method.unwrap_or_default(),
            invoice_status: InvoiceStatus::Unpaid,
            amount_paid_cents: 0,
            shipping_name: shipping.name.clone(),
            shipping_phone: shipping.phone.clone(),
            shipping_line1: shipping.line1.clone(),
            shipping_line2: shipping.line2.clone(),
            shipping_city: shipping.city.clone(),
            shipping_state: shipping.state.clone(),
            shipping_postal_code: shipping.postal_code.clone(),
            shipping_country: shipping.country.clone(),
            billing_name: shipping.name.clone(),
            billing_phone: shipping.phone.clone(),
            billing_line1: shipping.line1.clone(),
            billing_line2: shipping.line2.clone(),
            billing_city: shipping.city.clone(),
            billing_state: shipping.state.clone(),
            billing_postal_code: shipping.postal_code.clone(),
            billing_country: shipping.country.clone(),
            notes: request.notes.clone(),
            created_by: user_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        order::insert(&mut *tx, &placed).await?;

        for line in &pricing.lines {
            let item = OrderItem {
                id: new_id(),
                order_id: placed.id.clone(),
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                discount_cents: line.discount_cents,
                line_total_cents: line.line_net_cents,
                created_at: now,
            };
            order::insert_item(&mut *tx, &item).await?;

            let debit = StockAdjustment::new(&line.product_id, -line.quantity, reason::ORDER_PLACED)
                .referencing(reference::ORDER, placed.id.clone());
            adjust_stock_in(&mut tx, tenant_id, &debit, user_id).await?;
        }

        let invoice_number = next_number(&mut tx, NumberSequence::Invoice).await?;
        let bill = Invoice {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            invoice_number,
            order_id: placed.id.clone(),
            amount_cents: placed.total_cents,
            payment_method: placed.payment_method,
            status: InvoiceStatus::Unpaid,
            reference_number: None,
            notes: None,
            created_by: user_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        invoice::insert(&mut *tx, &bill).await?;

        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            order_id = %placed.id,
            order_number = %placed.order_number,
            invoice_number = %bill.invoice_number,
            client_id = %client.id,
            lines = pricing.lines.len(),
            total = %placed.total(),
            legacy,
            "Order created"
        );

        Ok(CreateOrderResult {
            order_id: placed.id,
            order_number: placed.order_number,
            invoice_number: bill.invoice_number,
            client_id: client.id,
            status: placed.status,
            total_cents: placed.total_cents,
            lines: pricing.lines,
            shipping,
        })
    }

    /// The order with its lines.
    pub async fn get_order(&self, tenant_id: &str, id: &str) -> ServiceResult<OrderWithItems> {
        let mut conn = self.pool.acquire().await?;
        load_in(&mut conn, tenant_id, id).await
    }

    /// Moves an order to `status`.
    ///
    /// A repeat cancel and Pending → Pending return `changed: false` and
    /// write nothing.
    pub async fn update_order_status(
        &self,
        tenant_id: &str,
        id: &str,
        status: OrderStatus,
        user_id: Option<&str>,
    ) -> ServiceResult<OrderStatusResult> {
        let mut tx = begin_write(&self.pool).await?;
        let current = load_in(&mut tx, tenant_id, id).await?;
        let previous = current.order.status;

        let restore_stock = match plan_transition(id, previous, status)? {
            Transition::NoOp => {
                debug!(order_id = %id, status = %previous, "Status update is a no-op");
                return Ok(OrderStatusResult {
                    order_id: id.to_string(),
                    previous_status: previous,
                    status: previous,
                    changed: false,
                    restored_lines: 0,
                });
            }
            Transition::Apply { restore_stock } => restore_stock,
        };

        let restored_lines = if restore_stock {
            restore_stock_in(&mut tx, tenant_id, &current, user_id).await?
        } else {
            0
        };

        order::update_status(&mut *tx, tenant_id, id, status, Utc::now()).await?;
        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            order_id = %id,
            from = %previous,
            to = %status,
            restored_lines,
            "Order status updated"
        );

        Ok(OrderStatusResult {
            order_id: id.to_string(),
            previous_status: previous,
            status,
            changed: true,
            restored_lines,
        })
    }

    /// Hard-deletes an order, restoring its stock unless it was cancelled.
    ///
    /// Returns `false` when no such order exists. Invoice rows are kept.
    pub async fn delete_order(
        &self,
        tenant_id: &str,
        id: &str,
        user_id: Option<&str>,
    ) -> ServiceResult<bool> {
        let mut tx = begin_write(&self.pool).await?;

        let current = match load_in(&mut tx, tenant_id, id).await {
            Ok(current) => current,
            Err(err) if matches!(err.as_domain(), Some(CoreError::OrderNotFound(_))) => return Ok(false),
            Err(err) => return Err(err),
        };

        let restored_lines = if restores_stock_on_delete(current.order.status) {
            restore_stock_in(&mut tx, tenant_id, &current, user_id).await?
        } else {
            0
        };

        let deleted = order::delete(&mut *tx, tenant_id, id).await?;
        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            order_id = %id,
            order_number = %current.order.order_number,
            restored_lines,
            "Order deleted"
        );
        Ok(deleted)
    }

    /// Full edit of a pending single-line order.
    ///
    /// A product or quantity change reverses the old line and debits the new
    /// one through the ledger. The line's discount is dropped and the total
    /// becomes unit price × quantity.
    pub async fn update_order(
        &self,
        tenant_id: &str,
        id: &str,
        request: &UpdateOrderRequest,
        user_id: Option<&str>,
    ) -> ServiceResult<OrderWithItems> {
        let mut tx = begin_write(&self.pool).await?;
        let OrderWithItems { order: mut edited, items } = load_in(&mut tx, tenant_id, id).await?;
        check_editable(&edited, items.len())?;

        let existing_item = items.into_iter().next();
        let current_product = existing_item
            .as_ref()
            .map(|i| i.product_id.clone())
            .or_else(|| edited.product_id.clone());
        let current_quantity = existing_item.as_ref().map(|i| i.quantity).or(edited.quantity);
        let current_price = existing_item
            .as_ref()
            .map(|i| i.unit_price_cents)
            .or(edited.unit_price_cents);

        let product_id = request
            .product_id
            .clone()
            .or_else(|| current_product.clone())
            .ok_or_else(|| ValidationError::Required {
                field: "productId".to_string(),
            })?;
        let quantity = request
            .quantity
            .or(current_quantity)
            .ok_or_else(|| ValidationError::Required {
                field: "quantity".to_string(),
            })?;
        validate_quantity(quantity)?;

        let catalog_product = product::find(&mut *tx, tenant_id, &product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.clone()))?;

        let product_changed = current_product.as_deref() != Some(product_id.as_str());
        let unit_price_cents = match (request.unit_price_cents, current_price) {
            (Some(price), _) => price,
            (None, Some(price)) if !product_changed => price,
            _ => catalog_product.price_cents,
        };
        validate_price_cents(unit_price_cents)?;

        let total = Money::from_cents(unit_price_cents)
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| CoreError::InvalidQuantity {
                product_id: product_id.clone(),
                quantity,
            })?;

        if product_changed || current_quantity != Some(quantity) {
            if let (Some(old_product), Some(old_quantity)) = (&current_product, current_quantity) {
                let reversal = StockAdjustment::new(old_product, old_quantity, reason::ORDER_CANCELLED)
                    .referencing(reference::ORDER, id);
                adjust_stock_in(&mut tx, tenant_id, &reversal, user_id).await?;
            }
            let debit = StockAdjustment::new(&product_id, -quantity, reason::ORDER_PLACED)
                .referencing(reference::ORDER, id);
            adjust_stock_in(&mut tx, tenant_id, &debit, user_id).await?;
        }

        let now = Utc::now();
        let item = OrderItem {
            id: existing_item.as_ref().map(|i| i.id.clone()).unwrap_or_else(new_id),
            order_id: id.to_string(),
            product_id: product_id.clone(),
            product_name: catalog_product.name.clone(),
            quantity,
            unit_price_cents,
            discount_cents: 0,
            line_total_cents: total.cents(),
            created_at: existing_item.as_ref().map(|i| i.created_at).unwrap_or(now),
        };
        if existing_item.is_some() {
            order::update_item(&mut *tx, &item).await?;
        } else {
            order::insert_item(&mut *tx, &item).await?;
        }

        edited.product_id = Some(product_id);
        edited.quantity = Some(quantity);
        edited.unit_price_cents = Some(unit_price_cents);
        edited.total_cents = total.cents();
        edited.invoice_status = InvoiceStatus::from_amounts(edited.amount_paid(), total);
        if let Some(method) = request.payment_method {
            edited.payment_method = method;
        }
        if let Some(notes) = &request.notes {
            edited.notes = Some(notes.clone());
        }
        edited.updated_at = now;

        order::update_line(&mut *tx, &edited).await?;
        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            order_id = %id,
            quantity,
            total = %total,
            "Order updated"
        );

        Ok(OrderWithItems {
            order: edited,
            items: vec![item],
        })
    }

    /// Invoice rows recorded against an order, oldest first. Rows of a
    /// deleted order are still returned.
    pub async fn list_order_invoices(&self, tenant_id: &str, order_id: &str) -> ServiceResult<Vec<Invoice>> {
        Ok(invoice::list_for_order(&self.pool, tenant_id, order_id).await?)
    }
}

pub(crate) async fn load_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    id: &str,
) -> ServiceResult<OrderWithItems> {
    let found = order::find(&mut *conn, tenant_id, id)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;
    let items = order::items(&mut *conn, id).await?;
    Ok(OrderWithItems { order: found, items })
}

/// Puts every line of `current` back on the shelf. Returns the line count.
async fn restore_stock_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    current: &OrderWithItems,
    user_id: Option<&str>,
) -> ServiceResult<usize> {
    let lines = current.stock_lines();
    for (product_id, quantity) in &lines {
        let credit = StockAdjustment::new(product_id, *quantity, reason::ORDER_CANCELLED)
            .referencing(reference::ORDER, current.order.id.clone());
        adjust_stock_in(&mut *conn, tenant_id, &credit, user_id).await?;
    }
    Ok(lines.len())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use tokio::task::JoinSet;

    use crate::test_support::{address_input, file_db, order_request, seed_client, seed_product, test_db, TENANT};
    use crate::ServiceError;
    use dairy_core::inventory::TransactionFilter;
    use dairy_core::{AddressOwner, CartLine};

    async fn quantity(db: &crate::Database, id: &str) -> i64 {
        db.catalog().get_product(TENANT, id).await.unwrap().quantity
    }

    async fn ledger(db: &crate::Database, product_id: &str) -> Vec<(i64, String)> {
        let filter = TransactionFilter {
            product_id: Some(product_id.to_string()),
            ..Default::default()
        };
        let page = db
            .inventory()
            .list_transactions(TENANT, &filter, None, None)
            .await
            .unwrap();
        let mut rows: Vec<_> = page.items.into_iter().map(|t| (t.quantity_delta, t.reason)).collect();
        rows.reverse();
        rows
    }

    #[tokio::test]
    async fn test_create_order_debits_stock_and_bills() {
        let db = test_db().await;
        let milk = seed_product(&db, TENANT, "MILK-1L", 100, 5).await;
        let client = seed_client(&db, TENANT, "Asha").await;

        let request = order_request(&client.id, vec![CartLine::new(&milk.id, 3)]);
        let created = db.orders().create_order(TENANT, Some("admin-1"), &request).await.unwrap();

        assert_eq!(created.order_number, "O0001");
        assert_eq!(created.invoice_number, "INV0001");
        assert_eq!(created.status, OrderStatus::Pending);
        assert_eq!(created.total_cents, 300);
        assert_eq!(quantity(&db, &milk.id).await, 2);

        let rows = ledger(&db, &milk.id).await;
        assert_eq!(rows.last().unwrap(), &(-3, "OrderPlaced".to_string()));
        assert_eq!(rows.iter().filter(|(_, r)| r == "OrderPlaced").count(), 1);

        let invoices = db.orders().list_order_invoices(TENANT, &created.order_id).await.unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].amount_cents, 300);
        assert_eq!(invoices[0].status, InvoiceStatus::Unpaid);

        let stored = db.orders().get_order(TENANT, &created.order_id).await.unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.order.product_id.as_deref(), Some(milk.id.as_str()));
        assert_eq!(stored.order.shipping_snapshot(), stored.order.billing_snapshot());
        assert_eq!(stored.order.created_by.as_deref(), Some("admin-1"));
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_once() {
        let db = test_db().await;
        let milk = seed_product(&db, TENANT, "MILK-1L", 100, 5).await;
        let client = seed_client(&db, TENANT, "Asha").await;
        let created = db
            .orders()
            .create_order(TENANT, None, &order_request(&client.id, vec![CartLine::new(&milk.id, 3)]))
            .await
            .unwrap();

        let cancelled = db
            .orders()
            .update_order_status(TENANT, &created.order_id, OrderStatus::Cancelled, None)
            .await
            .unwrap();
        assert!(cancelled.changed);
        assert_eq!(cancelled.restored_lines, 1);
        assert_eq!(quantity(&db, &milk.id).await, 5);
        assert_eq!(ledger(&db, &milk.id).await.last().unwrap(), &(3, "OrderCancelled".to_string()));

        let entries_before = ledger(&db, &milk.id).await.len();
        let again = db
            .orders()
            .update_order_status(TENANT, &created.order_id, OrderStatus::Cancelled, None)
            .await
            .unwrap();
        assert!(!again.changed);
        assert_eq!(again.status, OrderStatus::Cancelled);
        assert_eq!(ledger(&db, &milk.id).await.len(), entries_before);
        assert_eq!(quantity(&db, &milk.id).await, 5);
    }

    #[tokio::test]
    async fn test_delivered_order_is_immutable() {
        let db = test_db().await;
        let milk = seed_product(&db, TENANT, "MILK-1L", 100, 5).await;
        let client = seed_client(&db, TENANT, "Asha").await;
        let created = db
            .orders()
            .create_order(TENANT, None, &order_request(&client.id, vec![CartLine::new(&milk.id, 3)]))
            .await
            .unwrap();

        db.orders()
            .update_order_status(TENANT, &created.order_id, OrderStatus::Delivered, None)
            .await
            .unwrap();

        let err = db
            .orders()
            .update_order_status(TENANT, &created.order_id, OrderStatus::Cancelled, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(CoreError::OrderImmutable { status: OrderStatus::Delivered, .. })
        ));

        let stored = db.orders().get_order(TENANT, &created.order_id).await.unwrap();
        assert_eq!(stored.order.status, OrderStatus::Delivered);
        assert_eq!(quantity(&db, &milk.id).await, 2);
    }

    #[tokio::test]
    async fn test_failing_line_rolls_back_everything() {
        let db = test_db().await;
        let milk = seed_product(&db, TENANT, "MILK-1L", 100, 5).await;
        let ghee = seed_product(&db, TENANT, "GHEE-1KG", 65000, 1).await;

        // New client and inline address would be created inside the order.
        let mut request = order_request("", vec![CartLine::new(&milk.id, 2), CartLine::new(&ghee.id, 4)]);
        request.client_id = None;
        request.client_name = Some("Walk-in".into());
        request.shipping_address_id = None;
        request.shipping_address = Some(address_input("Checkout"));

        let err = db.orders().create_order(TENANT, None, &request).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::InsufficientStock { .. })));

        assert_eq!(quantity(&db, &milk.id).await, 5);
        assert_eq!(quantity(&db, &ghee.id).await, 1);
        assert_eq!(ledger(&db, &milk.id).await.len(), 1);

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);
        let invoices: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(invoices, 0);
    }

    #[tokio::test]
    async fn test_legacy_single_line_shape() {
        let db = test_db().await;
        let curd = seed_product(&db, TENANT, "CURD-500", 4500, 10).await;
        let client = seed_client(&db, TENANT, "Asha").await;

        let mut request = order_request(&client.id, vec![]);
        request.items = None;
        request.product_id = Some(curd.id.clone());
        request.quantity = Some(2);
        request.unit_price_cents = Some(4000);

        let created = db.orders().create_order(TENANT, None, &request).await.unwrap();
        assert_eq!(created.total_cents, 8000);
        assert_eq!(created.lines.len(), 1);

        let stored = db.orders().get_order(TENANT, &created.order_id).await.unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.order.quantity, Some(2));
        assert_eq!(stored.order.unit_price_cents, Some(4000));
        assert_eq!(quantity(&db, &curd.id).await, 8);
    }

    #[tokio::test]
    async fn test_numbering_per_tenant_and_global_invoices() {
        let db = test_db().await;
        let milk_a = seed_product(&db, TENANT, "MILK-1L", 100, 10).await;
        let milk_b = seed_product(&db, "tenant-b", "MILK-1L", 100, 10).await;
        let client_a = seed_client(&db, TENANT, "Asha").await;
        let client_b = seed_client(&db, "tenant-b", "Ravi").await;

        let mut numbers = Vec::new();
        for (tenant, client, milk) in [
            (TENANT, &client_a, &milk_a),
            (TENANT, &client_a, &milk_a),
            ("tenant-b", &client_b, &milk_b),
        ] {
            let created = db
                .orders()
                .create_order(tenant, None, &order_request(&client.id, vec![CartLine::new(&milk.id, 1)]))
                .await
                .unwrap();
            numbers.push((created.order_number, created.invoice_number));
        }

        assert_eq!(numbers[0], ("O0001".to_string(), "INV0001".to_string()));
        assert_eq!(numbers[1], ("O0002".to_string(), "INV0002".to_string()));
        assert_eq!(numbers[2], ("O0001".to_string(), "INV0003".to_string()));
    }

    #[tokio::test]
    async fn test_delete_restores_stock_and_keeps_invoices() {
        let db = test_db().await;
        let milk = seed_product(&db, TENANT, "MILK-1L", 100, 5).await;
        let client = seed_client(&db, TENANT, "Asha").await;
        let created = db
            .orders()
            .create_order(TENANT, None, &order_request(&client.id, vec![CartLine::new(&milk.id, 3)]))
            .await
            .unwrap();

        assert!(db.orders().delete_order(TENANT, &created.order_id, None).await.unwrap());
        assert_eq!(quantity(&db, &milk.id).await, 5);
        assert!(!db.orders().delete_order(TENANT, &created.order_id, None).await.unwrap());

        assert!(matches!(
            db.orders().get_order(TENANT, &created.order_id).await,
            Err(ServiceError::Domain(CoreError::OrderNotFound(_)))
        ));
        let invoices = db.orders().list_order_invoices(TENANT, &created.order_id).await.unwrap();
        assert_eq!(invoices.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_cancelled_order_does_not_restore_twice() {
        let db = test_db().await;
        let milk = seed_product(&db, TENANT, "MILK-1L", 100, 5).await;
        let client = seed_client(&db, TENANT, "Asha").await;
        let created = db
            .orders()
            .create_order(TENANT, None, &order_request(&client.id, vec![CartLine::new(&milk.id, 3)]))
            .await
            .unwrap();

        db.orders()
            .update_order_status(TENANT, &created.order_id, OrderStatus::Cancelled, None)
            .await
            .unwrap();
        db.orders().delete_order(TENANT, &created.order_id, None).await.unwrap();

        assert_eq!(quantity(&db, &milk.id).await, 5);
        assert_eq!(
            db.inventory().ledger_balance(TENANT, &milk.id).await.unwrap(),
            5
        );
    }

    #[tokio::test]
    async fn test_update_order_moves_stock() {
        let db = test_db().await;
        let milk = seed_product(&db, TENANT, "MILK-1L", 100, 10).await;
        let curd = seed_product(&db, TENANT, "CURD-500", 4500, 10).await;
        let client = seed_client(&db, TENANT, "Asha").await;
        let created = db
            .orders()
            .create_order(TENANT, None, &order_request(&client.id, vec![CartLine::new(&milk.id, 3)]))
            .await
            .unwrap();

        let edit = UpdateOrderRequest {
            product_id: Some(curd.id.clone()),
            quantity: Some(2),
            ..Default::default()
        };
        let updated = db
            .orders()
            .update_order(TENANT, &created.order_id, &edit, None)
            .await
            .unwrap();

        assert_eq!(updated.order.total_cents, 9000);
        assert_eq!(updated.order.unit_price_cents, Some(4500));
        assert_eq!(updated.items[0].product_name, "CURD-500 product");
        assert_eq!(quantity(&db, &milk.id).await, 10);
        assert_eq!(quantity(&db, &curd.id).await, 8);

        // Notes only: no ledger movement.
        let before = ledger(&db, &curd.id).await.len();
        let notes = UpdateOrderRequest {
            notes: Some("leave at gate".into()),
            ..Default::default()
        };
        let updated = db
            .orders()
            .update_order(TENANT, &created.order_id, &notes, None)
            .await
            .unwrap();
        assert_eq!(updated.order.notes.as_deref(), Some("leave at gate"));
        assert_eq!(updated.order.total_cents, 9000);
        assert_eq!(ledger(&db, &curd.id).await.len(), before);
    }

    #[tokio::test]
    async fn test_update_rejects_multi_line_orders() {
        let db = test_db().await;
        let milk = seed_product(&db, TENANT, "MILK-1L", 100, 10).await;
        let curd = seed_product(&db, TENANT, "CURD-500", 4500, 10).await;
        let client = seed_client(&db, TENANT, "Asha").await;
        let created = db
            .orders()
            .create_order(
                TENANT,
                None,
                &order_request(&client.id, vec![CartLine::new(&milk.id, 1), CartLine::new(&curd.id, 1)]),
            )
            .await
            .unwrap();

        let edit = UpdateOrderRequest {
            quantity: Some(2),
            ..Default::default()
        };
        assert!(matches!(
            db.orders().update_order(TENANT, &created.order_id, &edit, None).await,
            Err(ServiceError::Domain(CoreError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn test_unknown_order_and_foreign_tenant() {
        let db = test_db().await;
        let milk = seed_product(&db, TENANT, "MILK-1L", 100, 5).await;
        let client = seed_client(&db, TENANT, "Asha").await;
        let created = db
            .orders()
            .create_order(TENANT, None, &order_request(&client.id, vec![CartLine::new(&milk.id, 1)]))
            .await
            .unwrap();

        assert!(matches!(
            db.orders()
                .update_order_status("tenant-other", &created.order_id, OrderStatus::Cancelled, None)
                .await,
            Err(ServiceError::Domain(CoreError::OrderNotFound(_)))
        ));
        assert_eq!(quantity(&db, &milk.id).await, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_are_serialised() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_db(&dir, 8).await;
        let client = seed_client(&db, TENANT, "Asha").await;

        let mut products = Vec::new();
        for i in 0..16 {
            products.push(seed_product(&db, TENANT, &format!("MILK-{i:02}"), 100, 5).await);
        }

        let mut checkouts = JoinSet::new();
        for product in &products {
            let db = db.clone();
            let request = order_request(&client.id, vec![CartLine::new(&product.id, 2)]);
            checkouts.spawn(async move { db.orders().create_order(TENANT, None, &request).await });
        }

        let mut order_numbers = HashSet::new();
        let mut invoice_numbers = HashSet::new();
        while let Some(joined) = checkouts.join_next().await {
            let created = joined.unwrap().unwrap();
            order_numbers.insert(created.order_number);
            invoice_numbers.insert(created.invoice_number);
        }

        assert_eq!(order_numbers.len(), 16);
        assert_eq!(invoice_numbers.len(), 16);
        assert!(order_numbers.contains("O0016"));
        for product in &products {
            assert_eq!(quantity(&db, &product.id).await, 3);
        }

        let addresses = db
            .addresses()
            .list(TENANT, &AddressOwner::Client(client.id.clone()))
            .await
            .unwrap();
        assert_eq!(addresses.iter().filter(|a| a.is_default).count(), 1);
    }
}
