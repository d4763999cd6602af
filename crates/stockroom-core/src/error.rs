//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule failures                          │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                   │
//! │  └── DbError          - Store operation failures                        │
//! │                                                                         │
//! │  desktop errors (in app)                                                │
//! │  └── ApiError         - What the front end sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError ← DbError                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// None of these are fatal: the operation is simply not applied and the
/// front end shows the message.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No record matches the given id (or email, for logins).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// An exit asks for more than is on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Record exit (qty: 20)
    ///      │
    ///      ▼
    /// Check stock: on hand = 15
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Prod1", available: 15, requested: 20 }
    ///      │
    ///      ▼
    /// UI shows: "Only 15 Prod1 in stock", nothing is written
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// The caller may not perform this action.
    ///
    /// Only self-deletion of the logged-in account is modelled.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything touches the store.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Prod1".to_string(),
            available: 15,
            requested: 20,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Prod1: available 15, requested 20"
        );

        let err = CoreError::not_found("Product", "abc");
        assert_eq!(err.to_string(), "Product not found: abc");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("name");
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("email").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
