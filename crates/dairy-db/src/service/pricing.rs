//! # Pricing Engine
//!
//! Reads the catalog once per cart and hands the lines to
//! [`dairy_core::pricing::price_lines`]. Nothing is written.

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::ServiceResult;
use crate::repository::product;
use dairy_core::pricing::price_lines;
use dairy_core::{CartLine, CoreError, PricingResult, Product};

#[derive(Debug, Clone)]
pub struct PricingEngine {
    pool: SqlitePool,
}

impl PricingEngine {
    pub fn new(pool: SqlitePool) -> Self {
        PricingEngine { pool }
    }

    /// Prices a cart. Safe to call on every cart change.
    pub async fn price(
        &self,
        tenant_id: &str,
        lines: &[CartLine],
        validate_stock: bool,
    ) -> ServiceResult<PricingResult> {
        let mut conn = self.pool.acquire().await?;
        price_in(&mut conn, tenant_id, lines, validate_stock).await
    }
}

/// Prices a cart on the caller's connection, so the order service sees the
/// same catalog rows it is about to debit.
pub async fn price_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    lines: &[CartLine],
    validate_stock: bool,
) -> ServiceResult<PricingResult> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let mut ids: Vec<String> = lines.iter().map(|l| l.product_id.clone()).collect();
    ids.sort();
    ids.dedup();

    let catalog: HashMap<String, Product> = product::find_many(&mut *conn, tenant_id, &ids)
        .await?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    let result = price_lines(tenant_id, lines, &catalog, validate_stock)?;

    debug!(
        tenant_id = %tenant_id,
        lines = result.lines.len(),
        total_cents = result.total_cents,
        "Cart priced"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_product, test_db, TENANT};
    use crate::ServiceError;

    #[tokio::test]
    async fn test_price_reads_catalog_without_side_effects() {
        let db = test_db().await;
        let milk = seed_product(&db, TENANT, "MILK-1L", 100, 5).await;

        let lines = vec![CartLine::new(&milk.id, 3)];
        let first = db.pricing().price(TENANT, &lines, true).await.unwrap();

        assert_eq!(first.subtotal_cents, 300);
        assert_eq!(first.total_cents, 300);
        assert_eq!(first.total_items, 3);
        assert_eq!(first.lines[0].available_quantity, 5);
        assert_eq!(first.lines[0].product_name, "MILK-1L product");

        let second = db.pricing().price(TENANT, &lines, true).await.unwrap();
        assert_eq!(first, second);

        let reloaded = db.catalog().get_product(TENANT, &milk.id).await.unwrap();
        assert_eq!(reloaded.quantity, 5);
    }

    #[tokio::test]
    async fn test_overrides_and_discounts() {
        let db = test_db().await;
        let paneer = seed_product(&db, TENANT, "PANEER-200", 9000, 10).await;
        let curd = seed_product(&db, TENANT, "CURD-500", 4500, 10).await;

        let lines = vec![
            CartLine {
                product_id: paneer.id.clone(),
                quantity: 2,
                unit_price_cents: Some(8500),
                discount_cents: Some(1000),
            },
            CartLine::new(&curd.id, 1),
        ];
        let result = db.pricing().price(TENANT, &lines, false).await.unwrap();

        assert_eq!(result.lines[0].line_gross_cents, 17000);
        assert_eq!(result.lines[0].line_net_cents, 16000);
        assert_eq!(result.discount_total_cents, 1000);
        assert_eq!(result.subtotal_cents, 20500);
        assert_eq!(result.total_items, 3);
    }

    #[tokio::test]
    async fn test_pricing_failures() {
        let db = test_db().await;
        let milk = seed_product(&db, TENANT, "MILK-1L", 100, 2).await;

        assert!(matches!(
            db.pricing().price(TENANT, &[], true).await,
            Err(ServiceError::Domain(CoreError::EmptyCart))
        ));
        assert!(matches!(
            db.pricing().price(TENANT, &[CartLine::new(&milk.id, 3)], true).await,
            Err(ServiceError::Domain(CoreError::InsufficientStock { available: 2, requested: 3, .. }))
        ));
        // Without the stock check the same cart prices fine.
        assert!(db.pricing().price(TENANT, &[CartLine::new(&milk.id, 3)], false).await.is_ok());
        assert!(matches!(
            db.pricing().price("tenant-other", &[CartLine::new(&milk.id, 1)], false).await,
            Err(ServiceError::Domain(CoreError::ProductNotFound(_)))
        ));
    }
}
