//! Human-readable document numbers: `O0001` for orders, `INV0001` for invoices.
//!
//! The counters themselves live in the database (`number_sequences`); this
//! module only knows the format and the counter keys.

/// Order number prefix.
pub const ORDER_PREFIX: &str = "O";

/// Invoice number prefix.
pub const INVOICE_PREFIX: &str = "INV";

/// Sequence key of the invoice counter, shared by every tenant.
pub const INVOICE_SEQUENCE: &str = "invoice";

/// Sequence key of a tenant's order counter.
pub fn order_sequence(tenant_id: &str) -> String {
    format!("order:{}", tenant_id)
}

/// Formats `prefix` + four-digit zero-padded value.
///
/// ```rust
/// use dairy_core::numbering::{format_number, ORDER_PREFIX};
///
/// assert_eq!(format_number(ORDER_PREFIX, 1), "O0001");
/// assert_eq!(format_number("INV", 42), "INV0042");
/// ```
pub fn format_number(prefix: &str, value: i64) -> String {
    format!("{}{:04}", prefix, value)
}

/// Parses the numeric suffix of a previously formatted number.
///
/// Returns `None` when the prefix is wrong or the suffix is not a number.
pub fn parse_number(prefix: &str, number: &str) -> Option<i64> {
    number
        .strip_prefix(prefix)
        .and_then(|suffix| suffix.parse::<i64>().ok())
        .filter(|value| *value >= 0)
}
