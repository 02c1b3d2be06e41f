//! # Return Workflow
//!
//! Pure half of the return lifecycle: proposing, confirming and voiding.
//! The console's `ReturnService` drives these steps around the backend calls.
//!
//! ## Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Draft ──propose()──► Validated ──confirm()──► Confirmed                │
//! │    ▲                    (PendingReturn)         (ConfirmedReturn)       │
//! │    │ gate failure                                   │                   │
//! │    └──────────────                                  ▼ backend insert    │
//! │                                                 Persisted               │
//! │                                                     │ stock increment   │
//! │                                                     ▼                   │
//! │                                                StockAdjusted            │
//! │                                                                         │
//! │  The operator must explicitly accept the proposal; a declined or       │
//! │  mismatched confirmation never reaches the backend.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Routing
//! Defective and expired units go to the insumos pool; every other reason
//! puts them back in sellable stock. Voiding mirrors the same branch with
//! a decrement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::reconcile::returned_quantity_of_product;
use crate::types::{
    NewReturn, Return, ReturnReason, ReturnStatus, Sale, SaleStatus, StockAdjustment,
    StockDirection,
};
use crate::validation::{validate_return, ReturnForm, ValidatedReturn};

// =============================================================================
// Stages & Policy
// =============================================================================

/// Where a return creation attempt stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStage {
    Draft,
    Validated,
    Confirmed,
    Persisted,
    StockAdjusted,
}

/// What the quantity gate compares against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityPolicy {
    /// Ceiling is the originally sold quantity; earlier returns are ignored.
    SoldQuantity,
    /// Ceiling is sold minus what non-voided returns already took back.
    #[default]
    Outstanding,
}

// =============================================================================
// Propose
// =============================================================================

/// A validated return waiting for the operator's confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PendingReturn {
    #[ts(as = "String")]
    token: Uuid,
    validated: ValidatedReturn,
    #[ts(as = "String")]
    proposed_at: DateTime<Utc>,
}

impl PendingReturn {
    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn validated(&self) -> &ValidatedReturn {
        &self.validated
    }

    pub fn amount(&self) -> Money {
        self.validated.amount()
    }

    pub fn proposed_at(&self) -> DateTime<Utc> {
        self.proposed_at
    }

    /// The stock movement that will follow persistence.
    pub fn stock_adjustment(&self) -> StockAdjustment {
        restock_for(
            self.validated.reason,
            self.validated.product_id,
            self.validated.quantity,
        )
    }
}

/// Validates `form` against `sale` and the current returns.
///
/// Voided sales accept no returns. On success nothing has been written yet.
pub fn propose(
    form: &ReturnForm,
    sale: &Sale,
    returns: &[Return],
    policy: QuantityPolicy,
    now: DateTime<Utc>,
) -> CoreResult<PendingReturn> {
    if sale.status != SaleStatus::Completed {
        return Err(CoreError::InvalidSaleStatus {
            sale_id: sale.id,
            current_status: sale.status,
        });
    }

    let already_returned = match policy {
        QuantityPolicy::SoldQuantity => 0,
        QuantityPolicy::Outstanding => form
            .product_id
            .trim()
            .parse::<i64>()
            .map(|product_id| returned_quantity_of_product(sale, product_id, returns))
            .unwrap_or(0),
    };

    let validated = validate_return(form, sale, already_returned, now)?;

    Ok(PendingReturn {
        token: Uuid::new_v4(),
        validated,
        proposed_at: now,
    })
}

// =============================================================================
// Confirm
// =============================================================================

/// The operator's answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    token: Uuid,
    accepted: bool,
}

impl Confirmation {
    pub fn accept(pending: &PendingReturn) -> Self {
        Confirmation {
            token: pending.token,
            accepted: true,
        }
    }

    pub fn decline(pending: &PendingReturn) -> Self {
        Confirmation {
            token: pending.token,
            accepted: false,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }
}

/// A return the operator accepted. Only [`confirm`] builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedReturn {
    new_return: NewReturn,
    stock: StockAdjustment,
}

impl ConfirmedReturn {
    pub fn new_return(&self) -> &NewReturn {
        &self.new_return
    }

    pub fn stock_adjustment(&self) -> StockAdjustment {
        self.stock
    }

    pub fn into_parts(self) -> (NewReturn, StockAdjustment) {
        (self.new_return, self.stock)
    }
}

/// Applies the operator's confirmation to a pending return.
///
/// The credit generated equals the returned amount.
pub fn confirm(pending: PendingReturn, confirmation: Confirmation) -> CoreResult<ConfirmedReturn> {
    if confirmation.token != pending.token {
        return Err(CoreError::ProposalMismatch);
    }
    if !confirmation.accepted {
        return Err(CoreError::NotConfirmed);
    }

    let stock = pending.stock_adjustment();
    let v = pending.validated;
    let new_return = NewReturn {
        sale_id: v.sale_id,
        client_id: v.client_id,
        product_id: v.product_id,
        product_name: v.product_name,
        quantity: v.quantity,
        amount_cents: v.amount_cents,
        credit_cents: v.amount_cents,
        reason: v.reason,
        reason_detail: v.reason_detail,
        observations: v.observations,
        user_id: v.user_id,
        date: pending.proposed_at,
    };

    Ok(ConfirmedReturn { new_return, stock })
}

// =============================================================================
// Stock Routing
// =============================================================================

/// Increment that follows a newly persisted return.
pub fn restock_for(reason: ReturnReason, product_id: i64, quantity: i64) -> StockAdjustment {
    StockAdjustment {
        product_id,
        quantity,
        direction: StockDirection::Increment,
        pool: reason.stock_pool(),
    }
}

// =============================================================================
// Void
// =============================================================================

/// What voiding a return entails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoidPlan {
    pub return_id: i64,
    /// Reversal of the original stock movement. `None` for legacy returns
    /// without a product id, whose stock cannot be located.
    pub stock: Option<StockAdjustment>,
}

/// Looks a return up in the loaded set.
pub fn find_return(returns: &[Return], id: i64) -> CoreResult<&Return> {
    returns
        .iter()
        .find(|r| r.id == id)
        .ok_or(CoreError::ReturnNotFound(id))
}

/// Looks a sale up in the loaded set.
pub fn find_sale(sales: &[Sale], id: i64) -> CoreResult<&Sale> {
    sales
        .iter()
        .find(|s| s.id == id)
        .ok_or(CoreError::SaleNotFound(id))
}

/// Checks the `Completed → Voided` transition and plans the stock reversal.
pub fn plan_void(ret: &Return) -> CoreResult<VoidPlan> {
    if ret.status == ReturnStatus::Voided {
        return Err(CoreError::ReturnAlreadyVoided(ret.id));
    }
    if !ret.status.can_transition_to(ReturnStatus::Voided) {
        return Err(CoreError::InvalidReturnTransition {
            return_id: ret.id,
            from: ret.status,
            to: ReturnStatus::Voided,
        });
    }

    let stock = ret
        .product_id
        .filter(|id| *id > 0)
        .map(|product_id| StockAdjustment {
            product_id,
            quantity: ret.quantity,
            direction: StockDirection::Decrement,
            pool: ret.reason.stock_pool(),
        });

    Ok(VoidPlan {
        return_id: ret.id,
        stock,
    })
}

/// Checks the `Completed → Voided` transition of a sale.
pub fn check_sale_void(sale: &Sale) -> CoreResult<()> {
    if sale.status == SaleStatus::Voided {
        return Err(CoreError::SaleAlreadyVoided(sale.id));
    }
    if !sale.status.can_transition_to(SaleStatus::Voided) {
        return Err(CoreError::InvalidSaleStatus {
            sale_id: sale.id,
            current_status: sale.status,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
