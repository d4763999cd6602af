//! # API Error Type
//!
//! Unified error type for Stockroom commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockroom                              │
//! │                                                                         │
//! │  Front end                   Rust Backend                               │
//! │  ─────────                   ────────────                               │
//! │                                                                         │
//! │  record_exit(product, 20)                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │  Command Function                                                │   │
//! │  │  Result<T, ApiError>                                             │   │
//! │  │         │                                                        │   │
//! │  │         ▼                                                        │   │
//! │  │  Validation Error? ─── ValidationError::OutOfRange ──┐           │   │
//! │  │         │                                            │           │   │
//! │  │         ▼                                            ▼           │   │
//! │  │  Business rule? ─── CoreError::InsufficientStock ── ApiError ───►│   │
//! │  │         │                                            ▲           │   │
//! │  │         ▼                                            │           │   │
//! │  │  Store failure? ─── DbError::QueryFailed("...") ─────┘           │   │
//! │  │         │                                                        │   │
//! │  │         ▼                                                        │   │
//! │  │  Success ───────────────────────────────────────────────────────►│   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  { "code": "INSUFFICIENT_STOCK",                                        │
//! │    "message": "Insufficient stock for Prod1: available 15, ..." }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Errors cross the front-end boundary as JSON with a machine-readable
//! `code` and a human-readable `message`.

use serde::Serialize;
use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;

/// API error returned from commands.
///
/// ## Serialization
/// This is what the front end receives when a command fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 0b6f..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found, or login rejected
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Exit larger than the quantity on hand
    InsufficientStock,

    /// Action not permitted for the logged-in user
    Unauthorized,

    /// Store operation failed
    DatabaseError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// The uniform login rejection. Unknown email, wrong password and empty
    /// input all look the same to the caller.
    pub fn invalid_credentials() -> Self {
        ApiError::new(ErrorCode::NotFound, "Invalid credentials")
    }
}

/// Convenience alias for command results.
pub type ApiResult<T> = Result<T, ApiError>;

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            CoreError::InsufficientStock {
                product,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: {} available, {} requested",
                    product, available, requested
                ),
            ),
            CoreError::Unauthorized(reason) => ApiError::new(ErrorCode::Unauthorized, reason),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_code_and_message() {
        let err = ApiError::not_found("Product", "p-1");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: p-1");
    }

    #[test]
    fn test_core_errors_keep_their_kind() {
        let err: ApiError = CoreError::InsufficientStock {
            product: "Prod1".into(),
            available: 15,
            requested: 20,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("15 available"));

        let err: ApiError = CoreError::Unauthorized("no".into()).into();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let err: ApiError = CoreError::from(ValidationError::MustBePositive {
            field: "quantity".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "quantity must be positive");
    }

    #[test]
    fn test_db_internals_are_not_leaked() {
        let err: ApiError = DbError::QueryFailed("CHECK constraint failed: products".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");

        let err: ApiError = DbError::ForeignKeyViolation {
            message: "category".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
