//! # dairy-core: Pure Business Logic for the Dairy Commerce Backend
//!
//! Everything the order flow decides without touching storage: money,
//! entities, cart pricing, the order status machine, payment application,
//! the stock floor and document-number formatting.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Dairy Commerce Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Next.js storefront          Next.js admin console        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST (JSON, camelCase)                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    dairy-db (services + SQLite)                 │   │
//! │  │   pricing · inventory ledger · addresses · orders · payments    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ dairy-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   money · types · pricing · order · inventory · numbering      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Product, Order, Invoice, ClientAddress, ...)
//! - [`money`] - Integer minor-unit money
//! - [`pricing`] - Cart line pricing and totals
//! - [`order`] - Request shapes, status transitions, payment application
//! - [`inventory`] - Ledger reasons and the negative-stock floor
//! - [`numbering`] - `O####` / `INV####` formatting
//! - [`validation`] - Field rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use dairy_core::order::{plan_transition, Transition};
//! use dairy_core::{Money, OrderStatus};
//!
//! let t = plan_transition("o1", OrderStatus::Pending, OrderStatus::Delivered).unwrap();
//! assert_eq!(t, Transition::Apply { restore_stock: false });
//!
//! let line = Money::from_cents(4550).multiply_quantity(2);
//! assert_eq!(line.to_string(), "91.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod inventory;
pub mod money;
pub mod numbering;
pub mod order;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use pricing::{CartLine, PricedLine, PricingResult};
pub use types::*;

/// Generates a new entity id (UUID v4, hyphenated).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
