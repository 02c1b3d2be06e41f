//! # Validation Module
//!
//! The return creation gates. Nothing here touches the network: a return
//! that fails any gate never reaches the backend.
//!
//! ## Gate Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ReturnForm (raw form values)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Warranty ──── 0 months? → NoWarranty                               │
//! │       │           now > sale.date + months? → WarrantyExpired           │
//! │       ▼                                                                 │
//! │  2. Identity ──── sale / client / product must be positive integers    │
//! │       │           and name this sale and its buyer                      │
//! │       ▼                                                                 │
//! │  3. Quantity ──── required, whole, > 0, ≤ available on the sale        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. Reason ────── one of the closed reason codes                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ValidatedReturn                                                        │
//! │                                                                         │
//! │  First failure wins; later gates are not evaluated.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ReturnValidationError;
use crate::money::Money;
use crate::types::{ReturnReason, Sale};

/// Result type for gate checks.
pub type GateResult<T> = Result<T, ReturnValidationError>;

// =============================================================================
// Form
// =============================================================================

/// Return form exactly as the operator filled it in.
///
/// Ids and quantity are kept as text so that empty and non-numeric input can
/// be reported per field instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReturnForm {
    pub sale_id: String,
    pub client_id: String,
    pub product_id: String,
    pub quantity: String,
    pub reason: String,
    pub reason_detail: Option<String>,
    pub observations: Option<String>,
    pub user_id: Option<i64>,
}

/// A return that passed every gate. Amount and unit price are taken from
/// the sale line, never from the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedReturn {
    pub sale_id: i64,
    pub client_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub amount_cents: i64,
    pub reason: ReturnReason,
    pub reason_detail: Option<String>,
    pub observations: Option<String>,
    pub user_id: Option<i64>,
}

impl ValidatedReturn {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Gates
// =============================================================================

/// Gate 1: the sale must still be inside its warranty window at `now`.
///
/// Comparison is by full timestamp: the exact expiry instant is still inside.
pub fn check_warranty(sale: &Sale, now: DateTime<Utc>) -> GateResult<()> {
    let expires_at = sale
        .warranty_expires_at()
        .ok_or(ReturnValidationError::NoWarranty { sale_id: sale.id })?;

    if now > expires_at {
        return Err(ReturnValidationError::WarrantyExpired {
            sale_id: sale.id,
            expired_at: expires_at,
        });
    }

    Ok(())
}

/// Gate 2 helper: parses a positive integer id, mapping anything else to `err`.
pub fn parse_positive_id(raw: &str, err: ReturnValidationError) -> GateResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(err),
    }
}

/// Gate 3 helper: parses the quantity field.
///
/// ```rust
/// use barberia_core::validation::parse_quantity;
///
/// assert_eq!(parse_quantity("2"), Ok(2));
/// assert!(parse_quantity("").is_err());
/// assert!(parse_quantity("1.5").is_err());
/// assert!(parse_quantity("-1").is_err());
/// ```
pub fn parse_quantity(raw: &str) -> GateResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ReturnValidationError::QuantityRequired);
    }

    let quantity = raw
        .parse::<i64>()
        .map_err(|_| ReturnValidationError::QuantityNotInteger {
            raw: raw.to_string(),
        })?;

    if quantity <= 0 {
        return Err(ReturnValidationError::QuantityNotPositive);
    }

    Ok(quantity)
}

/// Gate 3: `requested` must fit in what is still available to return.
pub fn check_quantity(requested: i64, available: i64) -> GateResult<()> {
    if requested > available {
        return Err(ReturnValidationError::QuantityExceedsAvailable {
            requested,
            available: available.max(0),
        });
    }
    Ok(())
}

/// Gate 4: the reason must be one of the closed set of codes.
pub fn parse_reason(raw: &str) -> GateResult<ReturnReason> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ReturnValidationError::ReasonRequired);
    }
    ReturnReason::from_code(raw).ok_or_else(|| ReturnValidationError::UnknownReason {
        raw: raw.to_string(),
    })
}

/// Runs all gates in order against `sale`.
///
/// `already_returned` is the quantity of the product already taken back by
/// non-voided returns on this sale; pass `0` to gate against the original
/// sold quantity only.
pub fn validate_return(
    form: &ReturnForm,
    sale: &Sale,
    already_returned: i64,
    now: DateTime<Utc>,
) -> GateResult<ValidatedReturn> {
    check_warranty(sale, now)?;

    let sale_id = parse_positive_id(&form.sale_id, ReturnValidationError::InvalidSaleId)?;
    let client_id = parse_positive_id(&form.client_id, ReturnValidationError::InvalidClientId)?;
    let product_id = parse_positive_id(&form.product_id, ReturnValidationError::InvalidProductId)?;
    if sale_id != sale.id {
        return Err(ReturnValidationError::SaleMismatch {
            sale_id: sale.id,
            form_sale_id: sale_id,
        });
    }
    // credit goes to the form's client, so it must be the buyer
    if client_id != sale.client_id {
        return Err(ReturnValidationError::ClientMismatch {
            sale_client_id: sale.client_id,
            form_client_id: client_id,
        });
    }

    let quantity = parse_quantity(&form.quantity)?;
    let line = sale
        .product_line(product_id)
        .ok_or(ReturnValidationError::ProductNotInSale { product_id })?;
    let available = sale.sold_quantity(product_id) - already_returned;
    check_quantity(quantity, available)?;

    let reason = parse_reason(&form.reason)?;

    let unit_price = line.unit_price();
    Ok(ValidatedReturn {
        sale_id,
        client_id,
        product_id,
        product_name: line.name.clone(),
        quantity,
        unit_price_cents: unit_price.cents(),
        amount_cents: unit_price.multiply_quantity(quantity).cents(),
        reason,
        reason_detail: non_blank(&form.reason_detail),
        observations: non_blank(&form.observations),
        user_id: form.user_id,
    })
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================
