//! # Pricing Engine
//!
//! Turns cart lines into authoritative priced lines and cart totals.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Pricing                                     │
//! │                                                                         │
//! │  CartLine { productId, quantity, unitPrice?, discount? }               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  catalog lookup (tenant-scoped) ── missing/foreign ──► ProductNotFound │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  quantity > 0 ─────────────────────── no ──► InvalidQuantity           │
//! │  unit price = override ?? catalog ── < 0 ──► InvalidUnitPrice          │
//! │  gross = unit × qty                                                     │
//! │  0 <= discount <= gross ───────────── no ──► InvalidDiscount           │
//! │  net = gross − discount                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_stock? on_hand >= qty ───── no ──► InsufficientStock         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PricingResult { lines, totalItems, subtotal, discountTotal, total }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock check here is a read-only pre-check for the checkout UI. The
//! inventory ledger re-checks the floor when it actually debits.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Input
// =============================================================================

/// One requested cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    /// Admin override of the catalog price.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
    #[serde(default)]
    pub discount_cents: Option<i64>,
}

impl CartLine {
    /// A line at catalog price with no discount.
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        CartLine {
            product_id: product_id.into(),
            quantity,
            unit_price_cents: None,
            discount_cents: None,
        }
    }
}

// =============================================================================
// Output
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricedLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
    pub line_gross_cents: i64,
    pub line_net_cents: i64,
    /// On-hand stock at pricing time.
    pub available_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingResult {
    pub lines: Vec<PricedLine>,
    /// Sum of quantities.
    pub total_items: i64,
    /// Sum of line nets.
    pub subtotal_cents: i64,
    pub discount_total_cents: i64,
    pub total_cents: i64,
}

impl PricingResult {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices `lines` against a tenant's catalog.
///
/// `catalog` is the dictionary-batch lookup keyed by product id. A product
/// whose `tenant_id` differs from `tenant_id` is treated as absent.
///
/// Pure: same input, same output.
///
/// ## Example
/// ```rust,ignore
/// let result = price_lines("tenant-1", &[CartLine::new("p-milk", 3)], &catalog, true)?;
/// assert_eq!(result.subtotal_cents, 300);
/// ```
pub fn price_lines(
    tenant_id: &str,
    lines: &[CartLine],
    catalog: &HashMap<String, Product>,
    validate_stock: bool,
) -> CoreResult<PricingResult> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let mut priced = Vec::with_capacity(lines.len());
    let mut total_items = 0i64;
    let mut subtotal = Money::zero();
    let mut discount_total = Money::zero();

    for line in lines {
        let product = catalog
            .get(&line.product_id)
            .filter(|p| p.tenant_id == tenant_id)
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

        let priced_line = price_line(line, product)?;

        if validate_stock && product.quantity < line.quantity {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                available: product.quantity,
                requested: line.quantity,
            });
        }

        total_items += priced_line.quantity;
        subtotal += Money::from_cents(priced_line.line_net_cents);
        discount_total += Money::from_cents(priced_line.discount_cents);
        priced.push(priced_line);
    }

    Ok(PricingResult {
        lines: priced,
        total_items,
        subtotal_cents: subtotal.cents(),
        discount_total_cents: discount_total.cents(),
        total_cents: subtotal.cents(),
    })
}

/// Prices a single line against its (already tenant-checked) product.
pub fn price_line(line: &CartLine, product: &Product) -> CoreResult<PricedLine> {
    if line.quantity <= 0 {
        return Err(CoreError::InvalidQuantity {
            product_id: line.product_id.clone(),
            quantity: line.quantity,
        });
    }

    let unit_price = Money::from_cents(line.unit_price_cents.unwrap_or(product.price_cents));
    if unit_price.is_negative() {
        return Err(CoreError::InvalidUnitPrice {
            product_id: line.product_id.clone(),
            unit_price_cents: unit_price.cents(),
        });
    }

    let gross = unit_price
        .checked_multiply_quantity(line.quantity)
        .ok_or_else(|| CoreError::InvalidQuantity {
            product_id: line.product_id.clone(),
            quantity: line.quantity,
        })?;

    let discount = Money::from_cents(line.discount_cents.unwrap_or(0));
    if discount.is_negative() || discount > gross {
        return Err(CoreError::InvalidDiscount {
            product_id: line.product_id.clone(),
            discount_cents: discount.cents(),
            gross_cents: gross.cents(),
        });
    }

    Ok(PricedLine {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        quantity: line.quantity,
        unit_price_cents: unit_price.cents(),
        discount_cents: discount.cents(),
        line_gross_cents: gross.cents(),
        line_net_cents: (gross - discount).cents(),
        available_quantity: product.quantity,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const TENANT: &str = "tenant-a";

    fn product(id: &str, tenant: &str, price: i64, qty: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            tenant_id: tenant.to_string(),
            name: format!("Product {}", id),
            sku: id.to_uppercase(),
            price_cents: price,
            cost_price_cents: price / 2,
            quantity: qty,
            product_type: "Milk".to_string(),
            unit: "litre".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<String, Product> {
        products.into_iter().map(|p| (p.id.clone(), p)).collect()
    }

    #[test]
    fn test_prices_single_line() {
        let cat = catalog(vec![product("p", TENANT, 100, 5)]);
        let result = price_lines(TENANT, &[CartLine::new("p", 3)], &cat, true).unwrap();

        assert_eq!(result.subtotal_cents, 300);
        assert_eq!(result.total_cents, 300);
        assert_eq!(result.total_items, 3);
        assert_eq!(result.discount_total_cents, 0);
        assert_eq!(result.lines[0].available_quantity, 5);
        assert_eq!(result.lines[0].line_gross_cents, 300);
    }

    #[test]
    fn test_override_and_discount() {
        let cat = catalog(vec![product("a", TENANT, 100, 50), product("b", TENANT, 250, 50)]);
        let lines = vec![
            CartLine {
                product_id: "a".into(),
                quantity: 2,
                unit_price_cents: Some(90),
                discount_cents: Some(30),
            },
            CartLine {
                product_id: "b".into(),
                quantity: 4,
                unit_price_cents: None,
                discount_cents: Some(100),
            },
        ];

        let result = price_lines(TENANT, &lines, &cat, false).unwrap();
        assert_eq!(result.lines[0].line_gross_cents, 180);
        assert_eq!(result.lines[0].line_net_cents, 150);
        assert_eq!(result.lines[1].line_net_cents, 900);
        assert_eq!(result.subtotal_cents, 1050);
        assert_eq!(result.discount_total_cents, 130);
        assert_eq!(result.total_cents, result.subtotal_cents);
        assert_eq!(result.total_items, 6);
    }

    #[test]
    fn test_empty_cart() {
        let cat = catalog(vec![]);
        assert!(matches!(
            price_lines(TENANT, &[], &cat, false),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_other_tenant_product_is_not_found() {
        let cat = catalog(vec![product("p", "tenant-b", 100, 5)]);
        let err = price_lines(TENANT, &[CartLine::new("p", 1)], &cat, false).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(id) if id == "p"));
    }

    #[test]
    fn test_rejects_bad_quantity_price_discount() {
        let cat = catalog(vec![product("p", TENANT, 100, 5)]);

        let err = price_lines(TENANT, &[CartLine::new("p", 0)], &cat, false).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { quantity: 0, .. }));

        let negative_price = CartLine {
            unit_price_cents: Some(-1),
            ..CartLine::new("p", 1)
        };
        let err = price_lines(TENANT, &[negative_price], &cat, false).unwrap_err();
        assert!(matches!(err, CoreError::InvalidUnitPrice { .. }));

        let too_much_discount = CartLine {
            discount_cents: Some(101),
            ..CartLine::new("p", 1)
        };
        let err = price_lines(TENANT, &[too_much_discount], &cat, false).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDiscount { gross_cents: 100, .. }));

        let negative_discount = CartLine {
            discount_cents: Some(-5),
            ..CartLine::new("p", 1)
        };
        assert!(price_lines(TENANT, &[negative_discount], &cat, false).is_err());
    }

    #[test]
    fn test_stock_check_only_when_requested() {
        let cat = catalog(vec![product("p", TENANT, 100, 2)]);

        let err = price_lines(TENANT, &[CartLine::new("p", 3)], &cat, true).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            }
        ));

        assert!(price_lines(TENANT, &[CartLine::new("p", 3)], &cat, false).is_ok());
    }

    #[test]
    fn test_repricing_is_deterministic() {
        let cat = catalog(vec![product("p", TENANT, 120, 9)]);
        let lines = vec![CartLine::new("p", 4)];
        let first = price_lines(TENANT, &lines, &cat, true).unwrap();
        let second = price_lines(TENANT, &lines, &cat, true).unwrap();
        assert_eq!(first, second);
    }
}
