//! # Validation Module
//!
//! Input validation for Stockroom. Every validator runs before the store is
//! touched, so a rejected call never leaves a partial write behind.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end                                                     │
//! │  └── Empty fields, spin box ranges                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Commands (Rust)                                               │
//! │  └── THIS MODULE, via NewX::validate / XPatch::validate                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── NOT NULL, REFERENCES ... ON DELETE SET NULL                        │
//! │  └── CHECK (quantity >= 0)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_required, validate_movement_quantity};
//!
//! validate_required("name", "Cable HDMI", 200).unwrap();
//! validate_movement_quantity(5).unwrap();
//! assert!(validate_movement_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_MOVEMENT_QUANTITY, MAX_SEARCH_QUERY_LEN, MAX_STOCK_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `max` characters
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_required;
///
/// assert!(validate_required("name", "Informatique", 100).is_ok());
/// assert!(validate_required("name", "   ", 100).is_err());
/// ```
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a login email.
///
/// Only the shape is checked (`local@domain`, no whitespace). Whether the
/// address exists is not our business.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_required("email", email, 254)?;

    let email = email.trim();
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    };

    if !well_formed || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (means "list everything")
/// - Maximum [`MAX_SEARCH_QUERY_LEN`] characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity of a stock entry or exit.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_MOVEMENT_QUANTITY`]
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Stock exit                                                             │
/// │                                                                         │
/// │  User enters quantity: 0                                                │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_movement_quantity(0) ← THIS FUNCTION                          │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"                │
/// │       │                                                                 │
/// │       └── OK → stock availability is checked next                       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_movement_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_MOVEMENT_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_MOVEMENT_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an on-hand quantity, either set directly on a product or
/// reached by adding a stock entry.
///
/// Zero is allowed (out of stock), negatives are not, and nothing above
/// [`MAX_STOCK_QUANTITY`].
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_STOCK_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Fournisseur A", 200).is_ok());
        assert!(validate_required("name", "", 200).is_err());
        assert!(validate_required("name", "   ", 200).is_err());
        assert!(validate_required("name", &"A".repeat(201), 200).is_err());
        // Counts characters, not bytes
        assert!(validate_required("name", &"é".repeat(100), 100).is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("tojo@example.com").is_ok());
        assert!(validate_email(" admin@local ").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a b@example.com").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  prod  ").unwrap(), "prod");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_movement_quantity() {
        assert!(validate_movement_quantity(1).is_ok());
        assert!(validate_movement_quantity(MAX_MOVEMENT_QUANTITY).is_ok());

        assert!(validate_movement_quantity(0).is_err());
        assert!(validate_movement_quantity(-1).is_err());
        assert!(validate_movement_quantity(MAX_MOVEMENT_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_stock_quantity() {
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(120).is_ok());
        assert!(validate_stock_quantity(MAX_STOCK_QUANTITY).is_ok());

        assert!(validate_stock_quantity(-1).is_err());
        assert!(validate_stock_quantity(MAX_STOCK_QUANTITY + 1).is_err());
        assert!(validate_stock_quantity(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }
}
