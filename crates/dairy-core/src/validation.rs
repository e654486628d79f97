//! # Validation Module
//!
//! Input validation for catalog, client and address payloads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (Next.js storefront / admin console)                │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API + services (Rust)                                        │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field rules                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / CHECK constraints                             │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pricing rules (quantity, unit price, discount) live in [`crate::pricing`]
//! because they report the offending product.

use crate::error::ValidationError;
use crate::types::{AddressInput, NewProduct};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty, at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use dairy_core::validation::validate_sku;
///
/// assert!(validate_sku("MILK-1L").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    required("sku", sku, 50)?;

    if !sku
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name (1-200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required("name", name, 200)
}

/// Validates a client name (1-200 characters).
pub fn validate_client_name(name: &str) -> ValidationResult<()> {
    required("client name", name, 200)
}

/// Minimal shape check for an email address.
///
/// ## Example
/// ```rust
/// use dairy_core::validation::validate_email;
///
/// assert!(validate_email("asha@example.com").is_ok());
/// assert!(validate_email("asha").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    required("email", email, 254)?;

    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain.tld".to_string(),
        });
    }

    Ok(())
}

/// Normalises an email for matching: trimmed, lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates a new catalog product.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_sku(&product.sku)?;
    validate_price_cents(product.price_cents)?;
    if product.cost_price_cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "cost price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    if product.initial_quantity < 0 {
        return Err(ValidationError::OutOfRange {
            field: "initial quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates an inline address payload.
pub fn validate_address(input: &AddressInput) -> ValidationResult<()> {
    required("address name", &input.name, 200)?;
    required("address line1", &input.line1, 300)?;
    required("city", &input.city, 100)?;
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero is allowed (free samples)
///
/// ## Example
/// ```rust
/// use dairy_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(6400).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an order quantity (> 0).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Clamps pagination input to sane bounds: page >= 1, 1 <= page_size <= 200.
pub fn clamp_page(page: Option<u32>, page_size: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(50).clamp(1, 200);
    (page, page_size)
}

// =============================================================================
// Unit Tests
// =============================================================================
