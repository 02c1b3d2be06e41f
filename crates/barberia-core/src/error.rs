//! # Error Types
//!
//! Domain-specific error types for barberia-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  barberia-core errors (this file)                                      │
//! │  ├── CoreError              - Lifecycle / lookup failures              │
//! │  ├── ReturnValidationError  - Return form gates (first failure wins)   │
//! │  └── ValidationError        - Generic field validation                 │
//! │                                                                         │
//! │  barberia-db errors (separate crate)                                   │
//! │  └── DbError                - Database operation failures              │
//! │                                                                         │
//! │  console errors                                                        │
//! │  └── ApiError               - What the operator sees                   │
//! │                                                                         │
//! │  Flow: ReturnValidationError → CoreError → ApiError → notification     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::{ReturnStatus, SaleStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and lookup failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The sale referenced by an operation is not in the loaded data.
    #[error("Could not identify sale {0}")]
    SaleNotFound(i64),

    /// The return referenced by an operation is not in the loaded data.
    ///
    /// ## When This Occurs
    /// - Voiding a return that was removed by someone else since the last load
    /// - A stale id kept by the operator between reloads
    #[error("Could not identify return {0}")]
    ReturnNotFound(i64),

    /// Voiding a return that is already voided. Voided returns cannot be
    /// reactivated or voided again.
    #[error("Return {0} is already voided and cannot be reactivated or voided again")]
    ReturnAlreadyVoided(i64),

    /// Any other rejected return transition (e.g. voiding a pending return).
    #[error("Return {return_id} cannot move from {from} to {to}")]
    InvalidReturnTransition {
        return_id: i64,
        from: ReturnStatus,
        to: ReturnStatus,
    },

    /// Voiding a sale that is already voided.
    #[error("Sale {0} is already voided")]
    SaleAlreadyVoided(i64),

    /// Sale is not in a state that allows the requested operation.
    #[error("Sale {sale_id} is {current_status}, cannot perform operation")]
    InvalidSaleStatus {
        sale_id: i64,
        current_status: SaleStatus,
    },

    /// A proposal was presented to a confirmation it does not belong to.
    #[error("Confirmation does not match the pending return")]
    ProposalMismatch,

    /// The operator declined the confirmation prompt.
    #[error("Return was not confirmed")]
    NotConfirmed,

    /// The return form failed one of its gates.
    #[error(transparent)]
    ReturnRejected(#[from] ReturnValidationError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Whether the error is a "could not identify record" failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::SaleNotFound(_) | CoreError::ReturnNotFound(_))
    }
}

// =============================================================================
// Return Validation Error
// =============================================================================

/// Failures of the return creation gates.
///
/// Gates run in order (warranty, identity, quantity, reason) and the first
/// failure is the one reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReturnValidationError {
    #[error("Sale {sale_id} has no warranty period")]
    NoWarranty { sale_id: i64 },

    #[error("Warranty for sale {sale_id} expired on {expired_at}")]
    WarrantyExpired {
        sale_id: i64,
        expired_at: DateTime<Utc>,
    },

    #[error("A valid sale must be selected")]
    InvalidSaleId,

    #[error("A valid client must be selected")]
    InvalidClientId,

    #[error("A valid product must be selected")]
    InvalidProductId,

    #[error("Selected sale {form_sale_id} does not match sale {sale_id}")]
    SaleMismatch { sale_id: i64, form_sale_id: i64 },

    #[error("Sale was made to client {sale_client_id}, not client {form_client_id}")]
    ClientMismatch {
        sale_client_id: i64,
        form_client_id: i64,
    },

    #[error("Product {product_id} was not sold on this sale")]
    ProductNotInSale { product_id: i64 },

    #[error("Quantity is required")]
    QuantityRequired,

    #[error("Quantity must be a whole number, got '{raw}'")]
    QuantityNotInteger { raw: String },

    #[error("Quantity must be greater than zero")]
    QuantityNotPositive,

    #[error("Quantity {requested} exceeds the {available} units available to return")]
    QuantityExceedsAvailable { requested: i64, available: i64 },

    #[error("A return reason must be selected")]
    ReasonRequired,

    #[error("Unknown return reason '{raw}'")]
    UnknownReason { raw: String },
}

impl ReturnValidationError {
    /// Form field the error should be reported next to.
    pub const fn field(&self) -> &'static str {
        match self {
            ReturnValidationError::NoWarranty { .. }
            | ReturnValidationError::WarrantyExpired { .. }
            | ReturnValidationError::InvalidSaleId
            | ReturnValidationError::SaleMismatch { .. } => "ventaId",
            ReturnValidationError::InvalidClientId | ReturnValidationError::ClientMismatch { .. } => {
                "clienteId"
            }
            ReturnValidationError::InvalidProductId
            | ReturnValidationError::ProductNotInSale { .. } => "productoId",
            ReturnValidationError::QuantityRequired
            | ReturnValidationError::QuantityNotInteger { .. }
            | ReturnValidationError::QuantityNotPositive
            | ReturnValidationError::QuantityExceedsAvailable { .. } => "cantidad",
            ReturnValidationError::ReasonRequired | ReturnValidationError::UnknownReason { .. } => {
                "motivoCategoria"
            }
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Generic input validation errors (wire records, catalog input).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. an unparseable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required { field: field.into() }
    }

    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive { field: field.into() }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
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
        let err = ReturnValidationError::QuantityExceedsAvailable {
            requested: 3,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Quantity 3 exceeds the 2 units available to return"
        );
        assert_eq!(
            CoreError::ReturnNotFound(12).to_string(),
            "Could not identify return 12"
        );
    }

    #[test]
    fn test_identity_gates_have_distinct_messages() {
        let messages = [
            ReturnValidationError::InvalidSaleId.to_string(),
            ReturnValidationError::InvalidClientId.to_string(),
            ReturnValidationError::InvalidProductId.to_string(),
        ];
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
        assert_ne!(messages[0], messages[2]);
    }

    #[test]
    fn test_gate_errors_convert_to_core_error() {
        let core_err: CoreError = ReturnValidationError::ReasonRequired.into();
        assert!(matches!(core_err, CoreError::ReturnRejected(_)));
        assert!(!core_err.is_not_found());
        assert!(CoreError::SaleNotFound(1).is_not_found());
    }

    #[test]
    fn test_field_mapping() {
        assert_eq!(ReturnValidationError::QuantityNotPositive.field(), "cantidad");
        assert_eq!(ReturnValidationError::ReasonRequired.field(), "motivoCategoria");
        assert_eq!(ReturnValidationError::InvalidClientId.field(), "clienteId");
        let mismatch = ReturnValidationError::ClientMismatch {
            sale_client_id: 4,
            form_client_id: 99,
        };
        assert_eq!(mismatch.field(), "clienteId");
    }
}
