//! # Repository Module
//!
//! SQL, one module per table.
//!
//! ## Executor Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every query function takes `impl SqliteExecutor<'e>`, so the same     │
//! │  SQL runs on the pool or inside an open transaction:                   │
//! │                                                                         │
//! │    product::find(&pool, tenant, id)          // autocommit read        │
//! │    product::find(&mut *conn, tenant, id)     // inside a transaction   │
//! │                                                                         │
//! │  Services (crate::service) decide where transactions begin and end;   │
//! │  nothing in here calls BEGIN or COMMIT.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`product`] - Catalog rows, the quantity delta
//! - [`client`] - Client rows
//! - [`address`] - Saved addresses and the default flag
//! - [`order`] - Orders and order items
//! - [`invoice`] - Billing / payment rows
//! - [`inventory`] - The append-only stock ledger
//! - [`sequence`] - `O####` / `INV####` counters

pub mod address;
pub mod client;
pub mod inventory;
pub mod invoice;
pub mod order;
pub mod product;
pub mod sequence;
