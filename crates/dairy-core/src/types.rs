//! # Domain Types
//!
//! Core entities shared by the database layer and the REST API.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Invoice      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku            │   │  order_number   │   │  invoice_number │       │
//! │  │  price_cents    │   │  status         │   │  order_id       │       │
//! │  │  quantity ◄─────┼─┐ │  total_cents    │   │  amount_cents   │       │
//! │  └─────────────────┘ │ └────────┬────────┘   └─────────────────┘       │
//! │                      │          │ 1..n                                  │
//! │  ┌─────────────────┐ │ ┌────────▼────────┐   ┌─────────────────┐       │
//! │  │ InventoryTxn    │─┘ │   OrderItem     │   │ ClientAddress   │       │
//! │  │ (append-only)   │   │  (snapshot)     │   │ (one default)   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, order_number, invoice_number) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// `quantity` is the on-hand stock. It is only ever changed by the inventory
/// ledger; catalog edits leave it alone.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub sku: String,
    /// Selling price in cents.
    pub price_cents: i64,
    /// Purchase cost in cents (for margin reporting).
    pub cost_price_cents: i64,
    /// On-hand stock level.
    pub quantity: i64,
    /// Catalog category, e.g. "Milk", "Paneer", "Ghee".
    pub product_type: String,
    /// Selling unit, e.g. "litre", "kg", "pack".
    pub unit: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Fields for creating a product. `initial_quantity` is booked through the
/// ledger as an "InitialStock" movement.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub price_cents: i64,
    #[serde(default)]
    pub cost_price_cents: i64,
    #[serde(default)]
    pub initial_quantity: i64,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub unit: String,
}

/// Catalog edit. Quantity is deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price_cents: Option<i64>,
    pub cost_price_cents: Option<i64>,
    pub product_type: Option<String>,
    pub unit: Option<String>,
    pub is_active: Option<bool>,
}

// =============================================================================
// Inventory Ledger
// =============================================================================

/// An immutable stock movement.
///
/// For every product, the sum of `quantity_delta` over its transactions equals
/// the product's current quantity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryTransaction {
    /// Monotonic ledger id.
    pub id: i64,
    pub tenant_id: String,
    pub product_id: String,
    /// Signed, never zero.
    pub quantity_delta: i64,
    /// Free-text tag: "OrderPlaced", "OrderCancelled", "Correction", "Manual", ...
    pub reason: String,
    /// What caused the movement, e.g. "Order" or "Manual".
    pub reference_type: String,
    pub reference_id: Option<String>,
    pub note: Option<String>,
    /// `None` for system actions.
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order.
///
/// ```text
/// Pending ──► Delivered   (terminal)
///    │
///    └──────► Cancelled   (terminal; Cancelled → Cancelled is a no-op)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
pub enum OrderStatus {
    Pending,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Delivered and Cancelled orders accept no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Payment state of an order (and of individual invoice rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
pub enum InvoiceStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl InvoiceStatus {
    /// Derives the status from what has been paid against a total.
    ///
    /// ```rust
    /// use dairy_core::{InvoiceStatus, Money};
    ///
    /// let total = Money::from_cents(30000);
    /// assert_eq!(InvoiceStatus::from_amounts(Money::zero(), total), InvoiceStatus::Unpaid);
    /// assert_eq!(InvoiceStatus::from_amounts(Money::from_cents(100), total), InvoiceStatus::PartiallyPaid);
    /// assert_eq!(InvoiceStatus::from_amounts(total, total), InvoiceStatus::Paid);
    /// ```
    pub fn from_amounts(paid: Money, total: Money) -> Self {
        if paid >= total && paid.is_positive() {
            InvoiceStatus::Paid
        } else if paid.is_positive() {
            InvoiceStatus::PartiallyPaid
        } else {
            InvoiceStatus::Unpaid
        }
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Unpaid
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Upi,
    CashOnDelivery,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::CashOnDelivery
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order.
///
/// ## Legacy Columns
/// `product_id` / `quantity` / `unit_price_cents` mirror the first line so
/// single-line consumers keep working. When the order has items, the items
/// are authoritative.
///
/// ## Address Snapshots
/// Shipping and billing are frozen copies of the client address at order
/// time, not live references. Billing is currently always a copy of shipping.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub tenant_id: String,
    /// `O####`, strictly increasing per tenant.
    pub order_number: String,
    pub client_id: String,
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price_cents: Option<i64>,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub invoice_status: InvoiceStatus,
    pub amount_paid_cents: i64,
    pub shipping_name: String,
    pub shipping_phone: Option<String>,
    pub shipping_line1: String,
    pub shipping_line2: Option<String>,
    pub shipping_city: String,
    pub shipping_state: Option<String>,
    pub shipping_postal_code: Option<String>,
    pub shipping_country: Option<String>,
    pub billing_name: String,
    pub billing_phone: Option<String>,
    pub billing_line1: String,
    pub billing_line2: Option<String>,
    pub billing_city: String,
    pub billing_state: Option<String>,
    pub billing_postal_code: Option<String>,
    pub billing_country: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    /// Outstanding amount (never negative).
    pub fn balance(&self) -> Money {
        (self.total() - self.amount_paid()).clamp_non_negative()
    }

    /// The shipping snapshot as a standalone value.
    pub fn shipping_snapshot(&self) -> AddressSnapshot {
        AddressSnapshot {
            name: self.shipping_name.clone(),
            phone: self.shipping_phone.clone(),
            line1: self.shipping_line1.clone(),
            line2: self.shipping_line2.clone(),
            city: self.shipping_city.clone(),
            state: self.shipping_state.clone(),
            postal_code: self.shipping_postal_code.clone(),
            country: self.shipping_country.clone(),
        }
    }

    /// The billing snapshot as a standalone value.
    pub fn billing_snapshot(&self) -> AddressSnapshot {
        AddressSnapshot {
            name: self.billing_name.clone(),
            phone: self.billing_phone.clone(),
            line1: self.billing_line1.clone(),
            line2: self.billing_line2.clone(),
            city: self.billing_city.clone(),
            state: self.billing_state.clone(),
            postal_code: self.billing_postal_code.clone(),
            country: self.billing_country.clone(),
        }
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line of an order. Name and price are frozen at order time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of order (frozen).
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
    /// unit_price × quantity − discount.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// An order with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    /// (product_id, quantity) pairs to restore on cancellation.
    ///
    /// Items win when present; otherwise the legacy single-line columns.
    pub fn stock_lines(&self) -> Vec<(String, i64)> {
        if !self.items.is_empty() {
            return self
                .items
                .iter()
                .map(|i| (i.product_id.clone(), i.quantity))
                .collect();
        }

        match (&self.order.product_id, self.order.quantity) {
            (Some(product_id), Some(qty)) if qty > 0 => vec![(product_id.clone(), qty)],
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// One billing or payment event against an order.
///
/// `amount_cents` is the amount of this event, not the order total.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    pub tenant_id: String,
    /// `INV####`, one counter shared by all tenants.
    pub invoice_number: String,
    pub order_id: String,
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: InvoiceStatus,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Client
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Client {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Soft-delete flag.
    pub is_active: bool,
    /// Maintained by sales recording, not by the order flow.
    pub total_purchases_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Addresses
// =============================================================================

/// A saved address owned by a client (admin) or a user (self-service).
///
/// At most one address per owner has `is_default = true`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ClientAddress {
    pub id: String,
    pub tenant_id: String,
    pub client_id: Option<String>,
    pub user_id: Option<String>,
    pub label: Option<String>,
    pub is_default: bool,
    pub name: String,
    pub phone: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ClientAddress {
    pub fn snapshot(&self) -> AddressSnapshot {
        AddressSnapshot {
            name: self.name.clone(),
            phone: self.phone.clone(),
            line1: self.line1.clone(),
            line2: self.line2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
        }
    }
}

/// Inline address payload (storefront checkout, admin address forms).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AddressInput {
    pub label: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    /// Ignored when the owner has no addresses yet (first becomes default).
    #[serde(default)]
    pub is_default: bool,
}

/// Denormalised address copy stored on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AddressSnapshot {
    pub name: String,
    pub phone: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Who owns an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressOwner {
    /// Managed by the admin console on behalf of a client.
    Client(String),
    /// Managed by a storefront user for themselves.
    User(String),
}

impl AddressOwner {
    /// Column that identifies the owner in `client_addresses`.
    pub const fn column(&self) -> &'static str {
        match self {
            AddressOwner::Client(_) => "client_id",
            AddressOwner::User(_) => "user_id",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            AddressOwner::Client(id) | AddressOwner::User(id) => id,
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

// =============================================================================
// Unit Tests
// =============================================================================
