//! # Catalog
//!
//! Product lookup for the pricing engine and product administration.
//!
//! Creating a product with stock books that stock through the ledger as an
//! "InitialStock" movement, so the ledger sum equals on-hand quantity from
//! the first row onward.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, ServiceResult};
use crate::repository::product;
use crate::service::inventory::adjust_stock_in;
use crate::service::begin_write;
use dairy_core::inventory::{reason, reference, StockAdjustment};
use dairy_core::validation::{validate_new_product, validate_price_cents, validate_product_name, validate_sku};
use dairy_core::{new_id, CoreError, NewProduct, Product, ProductUpdate, ValidationError};

#[derive(Debug, Clone)]
pub struct Catalog {
    pool: SqlitePool,
}

impl Catalog {
    pub fn new(pool: SqlitePool) -> Self {
        Catalog { pool }
    }

    /// Creates a product; non-zero initial stock goes through the ledger.
    pub async fn create_product(
        &self,
        tenant_id: &str,
        input: &NewProduct,
        user_id: Option<&str>,
    ) -> ServiceResult<Product> {
        validate_new_product(input)?;

        let now = Utc::now();
        let mut product = Product {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            name: input.name.trim().to_string(),
            sku: input.sku.trim().to_string(),
            price_cents: input.price_cents,
            cost_price_cents: input.cost_price_cents,
            quantity: 0,
            product_type: input.product_type.trim().to_string(),
            unit: input.unit.trim().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut tx = begin_write(&self.pool).await?;

        product::insert(&mut *tx, &product).await.map_err(|err| match err {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, product.sku.clone()),
            other => other,
        })?;

        if input.initial_quantity != 0 {
            let initial = StockAdjustment::new(&product.id, input.initial_quantity, reason::INITIAL_STOCK)
                .referencing(reference::PRODUCT, product.id.clone());
            adjust_stock_in(&mut tx, tenant_id, &initial, user_id).await?;
            product.quantity = input.initial_quantity;
        }

        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            product_id = %product.id,
            sku = %product.sku,
            quantity = product.quantity,
            "Product created"
        );
        Ok(product)
    }

    pub async fn get_product(&self, tenant_id: &str, id: &str) -> ServiceResult<Product> {
        product::find(&self.pool, tenant_id, id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Dictionary-batch lookup keyed by product id. Unknown ids are absent.
    pub async fn get_products_by_ids(
        &self,
        tenant_id: &str,
        ids: &[String],
    ) -> ServiceResult<HashMap<String, Product>> {
        let products = product::find_many(&self.pool, tenant_id, ids).await?;
        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }

    /// Edits everything but quantity.
    pub async fn update_product_details(
        &self,
        tenant_id: &str,
        id: &str,
        update: &ProductUpdate,
    ) -> ServiceResult<Product> {
        let mut product = self.get_product(tenant_id, id).await?;

        if let Some(name) = &update.name {
            validate_product_name(name)?;
            product.name = name.trim().to_string();
        }
        if let Some(sku) = &update.sku {
            validate_sku(sku)?;
            product.sku = sku.trim().to_string();
        }
        if let Some(price) = update.price_cents {
            validate_price_cents(price)?;
            product.price_cents = price;
        }
        if let Some(cost) = update.cost_price_cents {
            if cost < 0 {
                return Err(ValidationError::OutOfRange {
                    field: "cost price".to_string(),
                    min: 0,
                    max: i64::MAX,
                }
                .into());
            }
            product.cost_price_cents = cost;
        }
        if let Some(product_type) = &update.product_type {
            product.product_type = product_type.trim().to_string();
        }
        if let Some(unit) = &update.unit {
            product.unit = unit.trim().to_string();
        }
        if let Some(is_active) = update.is_active {
            product.is_active = is_active;
        }
        product.updated_at = Utc::now();

        product::update_details(&self.pool, &product).await?;

        info!(tenant_id = %tenant_id, product_id = %id, "Product details updated");
        Ok(product)
    }

    /// Number of products in the tenant's catalog.
    pub async fn count(&self, tenant_id: &str) -> ServiceResult<i64> {
        Ok(product::count(&self.pool, tenant_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_db, TENANT};
    use crate::ServiceError;
    use dairy_core::inventory::TransactionFilter;

    fn ghee() -> NewProduct {
        NewProduct {
            name: "Cow Ghee 1kg".into(),
            sku: "GHEE-1KG".into(),
            price_cents: 65000,
            cost_price_cents: 52000,
            initial_quantity: 12,
            product_type: "Ghee".into(),
            unit: "kg".into(),
        }
    }

    #[tokio::test]
    async fn test_initial_stock_is_booked_in_ledger() {
        let db = test_db().await;
        let product = db.catalog().create_product(TENANT, &ghee(), None).await.unwrap();

        assert_eq!(product.quantity, 12);
        let page = db
            .inventory()
            .list_transactions(TENANT, &TransactionFilter::default(), None, None)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].reason, "InitialStock");
        assert_eq!(page.items[0].reference_type, "Product");
    }

    #[tokio::test]
    async fn test_duplicate_sku_in_tenant() {
        let db = test_db().await;
        db.catalog().create_product(TENANT, &ghee(), None).await.unwrap();

        let err = db.catalog().create_product(TENANT, &ghee(), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(DbError::UniqueViolation { .. })));

        // Same SKU is fine in another tenant.
        assert!(db.catalog().create_product("tenant-b", &ghee(), None).await.is_ok());
        assert_eq!(db.catalog().count(TENANT).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_details_leaves_quantity() {
        let db = test_db().await;
        let product = db.catalog().create_product(TENANT, &ghee(), None).await.unwrap();

        let update = ProductUpdate {
            price_cents: Some(68000),
            name: Some("A2 Cow Ghee 1kg".into()),
            ..Default::default()
        };
        let updated = db
            .catalog()
            .update_product_details(TENANT, &product.id, &update)
            .await
            .unwrap();

        assert_eq!(updated.price_cents, 68000);
        assert_eq!(updated.quantity, 12);
        let reloaded = db.catalog().get_product(TENANT, &product.id).await.unwrap();
        assert_eq!(reloaded.name, "A2 Cow Ghee 1kg");
        assert_eq!(reloaded.quantity, 12);
    }

    #[tokio::test]
    async fn test_batch_lookup_is_tenant_scoped() {
        let db = test_db().await;
        let mine = db.catalog().create_product(TENANT, &ghee(), None).await.unwrap();
        let theirs = db.catalog().create_product("tenant-b", &ghee(), None).await.unwrap();

        let found = db
            .catalog()
            .get_products_by_ids(TENANT, &[mine.id.clone(), theirs.id.clone()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains_key(&mine.id));

        assert!(matches!(
            db.catalog().get_product(TENANT, &theirs.id).await,
            Err(ServiceError::Domain(CoreError::ProductNotFound(_)))
        ));
    }
}
