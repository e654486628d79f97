//! # dairy-db: Persistence and Transactional Services
//!
//! SQLite storage through sqlx, and every operation of the commerce core
//! that has to be atomic.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dairy Commerce Data Flow                         │
//! │                                                                         │
//! │  HTTP handler (POST /orders)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     dairy-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Services    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (service/)   │───►│ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ OrderService  │    │ order.rs      │    │ 001_initial_ │  │   │
//! │  │   │ InventoryLedg │    │ inventory.rs  │    │   schema.sql │  │   │
//! │  │   │ PaymentLedger │    │ invoice.rs    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │          │  rules and math from dairy-core                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL)                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - `Database` handle and `DbConfig`
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - `DbError` and the service-level `ServiceError`
//! - [`repository`] - SQL, one module per table
//! - [`service`] - Pricing, inventory, addresses, orders, payments
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dairy_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/dairy.db")).await?;
//! let priced = db.pricing().price(&tenant_id, &lines, true).await?;
//! let created = db.orders().create_order(&tenant_id, Some(&user_id), &request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig};

pub use service::{
    AddressDirectory, Catalog, ClientDirectory, InventoryLedger, OrderService, PaymentLedger,
    PricingEngine,
};
