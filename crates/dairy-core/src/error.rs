//! # Error Types
//!
//! Domain-specific error types for dairy-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dairy-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  dairy-db errors                                                       │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - CoreError | DbError                            │
//! │                                                                         │
//! │  API errors (apps/api)                                                 │
//! │  └── ApiError         - What the frontends see (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenant Isolation
//! A record owned by another tenant is reported exactly like a missing one.
//! There is no "forbidden" variant on purpose: it would leak existence.

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification used by callers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Entity absent or owned by another tenant (404).
    NotFound,
    /// Malformed input: quantity, price, discount, delta, amount (400).
    Validation,
    /// Valid input the current state cannot accept (400).
    Conflict,
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by pricing, the inventory ledger, the
/// order orchestrator and the payment ledger.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Pricing or order creation with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: String, quantity: i64 },

    #[error("Invalid unit price for product {product_id}: {unit_price_cents}")]
    InvalidUnitPrice {
        product_id: String,
        unit_price_cents: i64,
    },

    /// Negative discount, or a discount larger than the line gross.
    #[error("Invalid discount {discount_cents} for product {product_id} (line gross {gross_cents})")]
    InvalidDiscount {
        product_id: String,
        discount_cents: i64,
        gross_cents: i64,
    },

    /// ## When This Occurs
    /// ```text
    /// Checkout (qty: 5)
    ///      │
    ///      ▼
    /// Pricing pre-check or ledger debit: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product_id, available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// A stock adjustment of zero.
    #[error("Stock adjustment delta must be non-zero")]
    InvalidDelta,

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Transition attempted from Delivered or Cancelled.
    #[error("Order {order_id} is {status} and can no longer change")]
    OrderImmutable { order_id: String, status: OrderStatus },

    /// No client id, no matching email, and not enough data to create one.
    #[error("A client is required to place an order")]
    ClientRequired,

    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("A shipping address is required")]
    ShippingAddressRequired,

    #[error("Order {0} is already fully paid")]
    OrderFullyPaid(String),

    #[error("Payment amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("Payment amount {amount_cents} exceeds outstanding balance {balance_cents}")]
    AmountExceedsBalance {
        amount_cents: i64,
        balance_cents: i64,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Classifies the error for response mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ProductNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::ClientNotFound(_)
            | CoreError::AddressNotFound(_) => ErrorKind::NotFound,

            CoreError::EmptyCart
            | CoreError::InvalidQuantity { .. }
            | CoreError::InvalidUnitPrice { .. }
            | CoreError::InvalidDiscount { .. }
            | CoreError::InvalidDelta
            | CoreError::ClientRequired
            | CoreError::ShippingAddressRequired
            | CoreError::InvalidAmount(_)
            | CoreError::Validation(_) => ErrorKind::Validation,

            CoreError::InsufficientStock { .. }
            | CoreError::OrderImmutable { .. }
            | CoreError::OrderFullyPaid(_)
            | CoreError::AmountExceedsBalance { .. } => ErrorKind::Conflict,
        }
    }

    /// Stable machine-readable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::EmptyCart => "EMPTY_CART",
            CoreError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            CoreError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            CoreError::InvalidUnitPrice { .. } => "INVALID_UNIT_PRICE",
            CoreError::InvalidDiscount { .. } => "INVALID_DISCOUNT",
            CoreError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            CoreError::InvalidDelta => "INVALID_DELTA",
            CoreError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            CoreError::OrderImmutable { .. } => "ORDER_IMMUTABLE",
            CoreError::ClientRequired => "CLIENT_REQUIRED",
            CoreError::ClientNotFound(_) => "CLIENT_NOT_FOUND",
            CoreError::AddressNotFound(_) => "ADDRESS_NOT_FOUND",
            CoreError::ShippingAddressRequired => "SHIPPING_ADDRESS_REQUIRED",
            CoreError::OrderFullyPaid(_) => "ORDER_FULLY_PAID",
            CoreError::InvalidAmount(_) => "INVALID_AMOUNT",
            CoreError::AmountExceedsBalance { .. } => "AMOUNT_EXCEEDS_BALANCE",
            CoreError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The request is well-formed but this operation does not support it.
    #[error("{0}")]
    Unsupported(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "p-ghee".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for p-ghee: available 3, requested 5"
        );

        let err = CoreError::OrderImmutable {
            order_id: "o1".to_string(),
            status: OrderStatus::Delivered,
        };
        assert_eq!(err.to_string(), "Order o1 is Delivered and can no longer change");
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            CoreError::ProductNotFound("p".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(CoreError::InvalidDelta.kind(), ErrorKind::Validation);
        assert_eq!(
            CoreError::OrderFullyPaid("o".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(CoreError::EmptyCart.code(), "EMPTY_CART");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::Validation);
    }
}
