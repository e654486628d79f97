//! # Order Rules
//!
//! Request shapes and the pure decisions of the order lifecycle: which lines
//! a request carries, how its client and shipping address are to be found,
//! which status transitions are legal, and how a payment moves the balance.
//!
//! ## Status Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Pending ──── status update ─────────────► Delivered  (terminal)      │
//! │      │                                                                  │
//! │      └──── status update / cancel / delete ► Cancelled (terminal)      │
//! │                                                  │                      │
//! │                                                  └─► Cancelled: no-op   │
//! │                                                                         │
//! │   Leaving Pending for Cancelled restores every line's stock.           │
//! │   Any other move out of a terminal state → OrderImmutable.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{CartLine, PricedLine};
use crate::types::{
    AddressInput, AddressSnapshot, InvoiceStatus, NewClient, Order, OrderStatus, PaymentMethod,
};
use crate::validation::normalize_email;

// =============================================================================
// Create Order Request
// =============================================================================

/// Checkout payload from the storefront or the admin console.
///
/// Two shapes are accepted: a line list (`items`, alias `lines`) or the legacy
/// single line (`productId` + `quantity` + optional `unitPriceCents`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateOrderRequest {
    pub client_id: Option<String>,
    pub client_email: Option<String>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,

    #[serde(default, alias = "lines")]
    pub items: Option<Vec<CartLine>>,

    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price_cents: Option<i64>,

    pub shipping_address_id: Option<String>,
    pub shipping_address: Option<AddressInput>,

    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

/// The two request shapes, resolved once at the entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderLines {
    LegacyLine(CartLine),
    LineList(Vec<CartLine>),
}

impl OrderLines {
    /// Canonical line list consumed by pricing and the ledger.
    pub fn into_cart_lines(self) -> Vec<CartLine> {
        match self {
            OrderLines::LegacyLine(line) => vec![line],
            OrderLines::LineList(lines) => lines,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, OrderLines::LegacyLine(_))
    }
}

/// How the ordering client is to be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientLookup {
    /// Explicit id; must exist and be active.
    ById(String),
    /// Case-insensitive email match, creating a client when none matches and
    /// a name was supplied.
    ByEmail {
        email: String,
        create: Option<NewClient>,
    },
    /// No id, no email: create from name/phone.
    Create(NewClient),
}

/// Where the shipping snapshot comes from.
#[derive(Debug, Clone)]
pub enum ShippingChoice {
    Saved(String),
    Inline(AddressInput),
}

impl CreateOrderRequest {
    /// Resolves the request shape. Line lists win over the legacy fields.
    pub fn order_lines(&self) -> CoreResult<OrderLines> {
        if let Some(items) = self.items.as_ref().filter(|items| !items.is_empty()) {
            return Ok(OrderLines::LineList(items.clone()));
        }

        match &self.product_id {
            Some(product_id) => Ok(OrderLines::LegacyLine(CartLine {
                product_id: product_id.clone(),
                quantity: self.quantity.unwrap_or(0),
                unit_price_cents: self.unit_price_cents,
                discount_cents: None,
            })),
            None => Err(CoreError::EmptyCart),
        }
    }

    pub fn client_lookup(&self) -> CoreResult<ClientLookup> {
        if let Some(id) = non_blank(&self.client_id) {
            return Ok(ClientLookup::ById(id));
        }

        let name = non_blank(&self.client_name);
        let phone = non_blank(&self.client_phone);

        if let Some(email) = non_blank(&self.client_email) {
            let email = normalize_email(&email);
            let create = name.map(|name| NewClient {
                name,
                email: Some(email.clone()),
                phone,
            });
            return Ok(ClientLookup::ByEmail { email, create });
        }

        match name {
            Some(name) => Ok(ClientLookup::Create(NewClient {
                name,
                email: None,
                phone,
            })),
            None => Err(CoreError::ClientRequired),
        }
    }

    pub fn shipping_choice(&self) -> CoreResult<ShippingChoice> {
        if let Some(id) = non_blank(&self.shipping_address_id) {
            return Ok(ShippingChoice::Saved(id));
        }

        self.shipping_address
            .clone()
            .map(ShippingChoice::Inline)
            .ok_or(CoreError::ShippingAddressRequired)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Returned by order creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateOrderResult {
    pub order_id: String,
    pub order_number: String,
    pub invoice_number: String,
    pub client_id: String,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub lines: Vec<PricedLine>,
    pub shipping: AddressSnapshot,
}

// =============================================================================
// Status Transitions
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// What a status update has to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to write (repeat cancel, Pending → Pending).
    NoOp,
    /// Write the new status, restoring stock first when cancelling.
    Apply { restore_stock: bool },
}

/// Decides a status change.
///
/// ## Example
/// ```rust
/// use dairy_core::order::{plan_transition, Transition};
/// use dairy_core::OrderStatus;
///
/// let t = plan_transition("o1", OrderStatus::Pending, OrderStatus::Cancelled).unwrap();
/// assert_eq!(t, Transition::Apply { restore_stock: true });
///
/// let t = plan_transition("o1", OrderStatus::Cancelled, OrderStatus::Cancelled).unwrap();
/// assert_eq!(t, Transition::NoOp);
///
/// assert!(plan_transition("o1", OrderStatus::Delivered, OrderStatus::Cancelled).is_err());
/// ```
pub fn plan_transition(
    order_id: &str,
    current: OrderStatus,
    next: OrderStatus,
) -> CoreResult<Transition> {
    if current == OrderStatus::Cancelled && next == OrderStatus::Cancelled {
        return Ok(Transition::NoOp);
    }

    if current.is_terminal() {
        return Err(CoreError::OrderImmutable {
            order_id: order_id.to_string(),
            status: current,
        });
    }

    Ok(match next {
        OrderStatus::Pending => Transition::NoOp,
        OrderStatus::Delivered => Transition::Apply {
            restore_stock: false,
        },
        OrderStatus::Cancelled => Transition::Apply {
            restore_stock: true,
        },
    })
}

/// Hard delete restores stock unless the order was already cancelled.
pub fn restores_stock_on_delete(status: OrderStatus) -> bool {
    status != OrderStatus::Cancelled
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderStatusResult {
    pub order_id: String,
    pub previous_status: OrderStatus,
    pub status: OrderStatus,
    /// False for the idempotent repeat-cancel.
    pub changed: bool,
    /// Number of lines whose stock went back on the shelf.
    pub restored_lines: usize,
}

// =============================================================================
// Full Edit
// =============================================================================

/// Admin edit of a single-line order. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateOrderRequest {
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price_cents: Option<i64>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

/// Rejects edits the single-line edit cannot express.
pub fn check_editable(order: &Order, item_count: usize) -> CoreResult<()> {
    if order.status != OrderStatus::Pending {
        return Err(CoreError::OrderImmutable {
            order_id: order.id.clone(),
            status: order.status,
        });
    }

    if item_count > 1 {
        return Err(ValidationError::Unsupported(
            "only single-line orders can be edited".to_string(),
        )
        .into());
    }

    Ok(())
}

// =============================================================================
// Payments
// =============================================================================

/// Admin payment recording.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RecordPaymentRequest {
    pub order_id: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

/// Order payment state after a payment is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub amount_paid: Money,
    pub invoice_status: InvoiceStatus,
}

/// Checks a payment against the order and computes the new paid-to-date.
///
/// Checked in order: already paid, non-positive amount, over the balance.
pub fn apply_payment(order: &Order, amount: Money) -> CoreResult<PaymentOutcome> {
    if order.invoice_status == InvoiceStatus::Paid {
        return Err(CoreError::OrderFullyPaid(order.id.clone()));
    }

    if !amount.is_positive() {
        return Err(CoreError::InvalidAmount(amount.cents()));
    }

    let balance = order.balance();
    if amount > balance {
        return Err(CoreError::AmountExceedsBalance {
            amount_cents: amount.cents(),
            balance_cents: balance.cents(),
        });
    }

    let amount_paid = order.amount_paid() + amount;
    let invoice_status = if amount_paid >= order.total() {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::PartiallyPaid
    };

    Ok(PaymentOutcome {
        amount_paid,
        invoice_status,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
