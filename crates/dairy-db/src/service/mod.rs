//! # Services
//!
//! Transactional operations built on the repositories. A service owns a
//! pool handle; the `*_in` functions beside it take the caller's
//! connection so one transaction can span several services.
//!
//! ```text
//!            OrderService
//!     ┌──────────┼───────────┬──────────────┐
//!     ▼          ▼           ▼              ▼
//! clients    pricing     address       inventory
//!              │                           ▲
//!              └── catalog read            │
//!                                 Catalog ─┘ (initial stock)
//!
//! PaymentLedger ─► orders + invoices
//! ```

pub mod address;
pub mod catalog;
pub mod clients;
pub mod inventory;
pub mod order;
pub mod payment;
pub mod pricing;

pub use address::AddressDirectory;
pub use catalog::Catalog;
pub use clients::ClientDirectory;
pub use inventory::InventoryLedger;
pub use order::OrderService;
pub use payment::PaymentLedger;
pub use pricing::PricingEngine;

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::{DbError, DbResult};

/// Opens a write transaction. The write lock is taken at `BEGIN`, so
/// concurrent writers wait on the busy timeout.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE").await.map_err(|err| match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => err.into(),
        other => DbError::TransactionFailed(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_second_writer_times_out_as_transaction_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("dairy.db"))
            .max_connections(2)
            .connect_timeout(Duration::from_millis(200));
        let db = Database::new(config).await.unwrap();

        let _writer = begin_write(db.pool()).await.unwrap();
        let err = begin_write(db.pool()).await.unwrap_err();

        assert!(matches!(err, DbError::TransactionFailed(_)));
    }

    #[tokio::test]
    async fn test_writer_proceeds_after_commit() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("dairy.db")).max_connections(2))
            .await
            .unwrap();

        let first = begin_write(db.pool()).await.unwrap();
        first.commit().await.unwrap();

        let second = begin_write(db.pool()).await.unwrap();
        second.rollback().await.unwrap();
    }
}
