//! # Inventory Rules
//!
//! Reason tags, reference types and the negative-stock floor applied by the
//! inventory ledger before every movement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// Well-known ledger reasons. `reason` is free text; these are the ones the
/// system writes itself.
pub mod reason {
    pub const ORDER_PLACED: &str = "OrderPlaced";
    pub const ORDER_CANCELLED: &str = "OrderCancelled";
    /// Exempt from the stock floor.
    pub const CORRECTION: &str = "Correction";
    pub const MANUAL: &str = "Manual";
    pub const INITIAL_STOCK: &str = "InitialStock";
}

/// Well-known reference types.
pub mod reference {
    pub const ORDER: &str = "Order";
    pub const MANUAL: &str = "Manual";
    pub const PRODUCT: &str = "Product";
}

/// True for reasons that may take stock below zero regardless of flags.
pub fn is_correction(reason: &str) -> bool {
    reason.trim().eq_ignore_ascii_case(reason::CORRECTION)
}

/// Applies the negative-stock floor.
///
/// ```rust
/// use dairy_core::inventory::check_floor;
///
/// assert!(check_floor("p", 5, -5, "OrderPlaced", false).is_ok());
/// assert!(check_floor("p", 5, -10, "OrderPlaced", false).is_err());
/// assert!(check_floor("p", 5, -10, "correction", false).is_ok());
/// assert!(check_floor("p", 5, -10, "Manual", true).is_ok());
/// ```
pub fn check_floor(
    product_id: &str,
    on_hand: i64,
    delta: i64,
    reason: &str,
    allow_negative: bool,
) -> CoreResult<()> {
    if delta == 0 {
        return Err(CoreError::InvalidDelta);
    }

    if is_correction(reason) || allow_negative {
        return Ok(());
    }

    if on_hand.saturating_add(delta) < 0 {
        return Err(CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            available: on_hand,
            requested: -delta,
        });
    }

    Ok(())
}

/// Manual stock adjustment from the admin console.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockAdjustment {
    pub product_id: String,
    pub quantity_delta: i64,
    pub reason: String,
    pub note: Option<String>,
    /// Defaults to "Manual".
    pub reference_type: Option<String>,
    pub reference_id: Option<String>,
    #[serde(default)]
    pub allow_negative: bool,
}

impl StockAdjustment {
    pub fn new(product_id: impl Into<String>, quantity_delta: i64, reason: impl Into<String>) -> Self {
        StockAdjustment {
            product_id: product_id.into(),
            quantity_delta,
            reason: reason.into(),
            note: None,
            reference_type: None,
            reference_id: None,
            allow_negative: false,
        }
    }

    /// Tags the movement with what caused it.
    pub fn referencing(mut self, reference_type: &str, reference_id: impl Into<String>) -> Self {
        self.reference_type = Some(reference_type.to_string());
        self.reference_id = Some(reference_id.into());
        self
    }

    pub fn reference_type(&self) -> &str {
        self.reference_type.as_deref().unwrap_or(reference::MANUAL)
    }
}

/// Ledger history filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub product_id: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_blocks_negative_result() {
        let err = check_floor("p", 5, -10, reason::ORDER_PLACED, false).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 5,
                requested: 10,
                ..
            }
        ));
    }

    #[test]
    fn test_correction_bypasses_floor() {
        assert!(check_floor("p", 5, -10, "Correction", false).is_ok());
        assert!(check_floor("p", 5, -10, "CORRECTION", false).is_ok());
        assert!(check_floor("p", 0, -1, "Manual", true).is_ok());
    }

    #[test]
    fn test_zero_delta_rejected_even_for_corrections() {
        assert!(matches!(
            check_floor("p", 5, 0, "Correction", true),
            Err(CoreError::InvalidDelta)
        ));
    }

    #[test]
    fn test_adjustment_defaults() {
        let adj = StockAdjustment::new("p", 4, reason::MANUAL);
        assert_eq!(adj.reference_type(), "Manual");

        let adj = adj.referencing(reference::ORDER, "o1");
        assert_eq!(adj.reference_type(), "Order");
        assert_eq!(adj.reference_id.as_deref(), Some("o1"));

        let parsed: StockAdjustment =
            serde_json::from_str(r#"{"productId":"p","quantityDelta":-2,"reason":"Manual"}"#).unwrap();
        assert!(!parsed.allow_negative);
    }
}
