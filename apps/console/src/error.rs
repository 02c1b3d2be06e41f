//! # API Error Type
//!
//! Unified error type for console operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Console                            │
//! │                                                                         │
//! │  ReturnService::confirm_return(pending, true)                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Gate failed?      ─── ReturnValidationError ─┐                  │  │
//! │  │         │                                     ▼                  │  │
//! │  │  Rule violated?    ─── CoreError ─────────► ApiError ──────────►│  │
//! │  │         │                                     ▲                  │  │
//! │  │  Backend failed?   ─── DbError ───────────────┘                  │  │
//! │  │         │                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The CLI prints `[VALIDATION_ERROR] cantidad: ...` and exits non-zero. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stale references (a return or sale id that no longer resolves) always
//! surface as `NOT_FOUND` with "Could not identify ..." wording so they can
//! be told apart from generic failures.

use barberia_core::wire::WireError;
use barberia_core::{CoreError, ReturnValidationError};
use barberia_db::DbError;
use serde::Serialize;

/// Error returned from console operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Quantity 3 exceeds the 1 still available on the sale",
///   "field": "cantidad"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Form field the error belongs to, for inline reporting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

/// Error codes for console responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record could not be identified
    NotFound,

    /// Input validation failed; nothing was sent to the backend
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business rule violated (voiding twice, voided sale...)
    BusinessLogic,

    /// The operator declined the confirmation
    Cancelled,

    /// An import file could not be read or normalized
    ImportError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Creates a "could not identify record" error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("Could not identify {} {}", resource.to_lowercase(), id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an import error.
    pub fn import(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ImportError, message)
    }

    fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }
}

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
            DbError::InvalidValue { table, column, value } => {
                tracing::error!(table, column, %value, "Unreadable stored value");
                ApiError::new(ErrorCode::DatabaseError, "Stored data could not be read")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // the raw error goes to the log only
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

/// Converts gate failures to field-tagged validation errors.
impl From<ReturnValidationError> for ApiError {
    fn from(err: ReturnValidationError) -> Self {
        let field = err.field();
        ApiError::validation(err.to_string()).with_field(field)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", &id.to_string()),
            CoreError::ReturnNotFound(id) => ApiError::not_found("Return", &id.to_string()),
            CoreError::ReturnRejected(e) => ApiError::from(e),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::NotConfirmed => ApiError::new(ErrorCode::Cancelled, err.to_string()),
            CoreError::ReturnAlreadyVoided(_)
            | CoreError::InvalidReturnTransition { .. }
            | CoreError::SaleAlreadyVoided(_)
            | CoreError::InvalidSaleStatus { .. }
            | CoreError::ProposalMismatch => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
        }
    }
}

impl From<WireError> for ApiError {
    fn from(err: WireError) -> Self {
        ApiError::import(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = serde_json::to_value(self.code)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{:?}", self.code));
        match self.field {
            Some(field) => write!(f, "[{}] {}: {}", code, field, self.message),
            None => write!(f, "[{}] {}", code, self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Result type for console operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_references_are_not_found() {
        let err = ApiError::from(CoreError::ReturnNotFound(12));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Could not identify return 12");

        let err = ApiError::from(DbError::not_found("Sale (completada)", 3));
        assert!(err.is_not_found());
        assert!(err.message.starts_with("Could not identify"));
    }

    #[test]
    fn test_gate_failures_carry_their_field() {
        let err = ApiError::from(CoreError::from(ReturnValidationError::QuantityNotPositive));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field, Some("cantidad"));
        assert!(err.to_string().starts_with("[VALIDATION_ERROR] cantidad: "));
    }

    #[test]
    fn test_declined_confirmation_is_cancelled() {
        let err = ApiError::from(CoreError::NotConfirmed);
        assert_eq!(err.code, ErrorCode::Cancelled);
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::from(CoreError::ReturnAlreadyVoided(4));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "BUSINESS_LOGIC");
        assert!(json.get("field").is_none());
    }
}
