//! # Return Commands
//!
//! Listing, the two-step creation (proposal shown, operator confirms) and
//! voiding.

use barberia_core::returns::{PendingReturn, ReturnStage};
use barberia_core::validation::ReturnForm;
use barberia_core::{ReturnReason, StockAdjustment, StockDirection};
use chrono::{DateTime, Utc};

use super::{render_table, ConsoleService, STALE_WARNING};
use crate::error::ApiResult;
use crate::service::{ReturnOutcome, VoidOutcome};
use crate::state::{ConsoleConfig, Snapshot};

/// Returns table, optionally narrowed to one client and/or one sale.
pub fn list_returns(
    service: &ConsoleService,
    config: &ConsoleConfig,
    client: Option<i64>,
    sale: Option<i64>,
) -> String {
    let snapshot = service.snapshot();
    let rows: Vec<Vec<String>> = snapshot
        .returns
        .iter()
        .filter(|r| client.map_or(true, |id| r.client_id == id))
        .filter(|r| sale.map_or(true, |id| r.sale_id == id))
        .map(|r| {
            vec![
                r.id.to_string(),
                r.date.format("%Y-%m-%d").to_string(),
                r.sale_id.to_string(),
                snapshot.client_name(r.client_id),
                r.product_name.clone(),
                r.quantity.to_string(),
                config.format_currency(r.amount_cents),
                config.format_currency(r.credit_cents),
                r.reason.label().to_string(),
                r.status.to_string(),
            ]
        })
        .collect();

    if rows.is_empty() {
        return "No returns found.".to_string();
    }

    render_table(
        &[
            "ID", "Date", "Sale", "Client", "Product", "Qty", "Amount", "Credit", "Reason",
            "Status",
        ],
        rows,
        &[5, 6, 7],
    )
}

/// The reason codes accepted by `returns create --reason`.
pub fn list_reasons() -> String {
    render_table(
        &["Code", "Reason", "Stock pool"],
        ReturnReason::ALL.iter().map(|reason| {
            vec![
                reason.code().to_string(),
                reason.label().to_string(),
                reason.stock_pool().code().to_string(),
            ]
        }),
        &[],
    )
}

fn describe_adjustment(adjustment: &StockAdjustment) -> String {
    let verb = match adjustment.direction {
        StockDirection::Increment => "+",
        StockDirection::Decrement => "-",
    };
    format!(
        "{}{} to {} stock of product {}",
        verb,
        adjustment.quantity,
        adjustment.pool.code(),
        adjustment.product_id
    )
}

/// What the operator is asked to confirm.
pub fn render_proposal(pending: &PendingReturn, snapshot: &Snapshot, config: &ConsoleConfig) -> String {
    let v = pending.validated();
    format!(
        "Return {} x {} from sale {} for {}\n\
         Reason:  {}\n\
         Amount:  {} (credited as store credit)\n\
         Stock:   {}\n",
        v.quantity,
        v.product_name,
        v.sale_id,
        snapshot.client_name(v.client_id),
        v.reason.label(),
        config.format_currency(v.amount_cents),
        describe_adjustment(&pending.stock_adjustment()),
    )
}

/// Summary printed after a confirmed return.
pub fn render_outcome(outcome: &ReturnOutcome, config: &ConsoleConfig) -> String {
    let mut out = format!(
        "Return {} recorded: {} credited to client {}.\n",
        outcome.record.id,
        config.format_currency(outcome.record.credit_cents),
        outcome.record.client_id,
    );
    match outcome.stage {
        ReturnStage::StockAdjusted => {
            out.push_str(&format!("Stock: {}.\n", describe_adjustment(&outcome.adjustment)));
        }
        _ => {
            out.push_str(&format!(
                "WARNING: stock was NOT adjusted ({}). Adjust it by hand.\n",
                describe_adjustment(&outcome.adjustment)
            ));
        }
    }
    if outcome.snapshot_stale {
        out.push_str(STALE_WARNING);
    }
    out
}

/// Proposes `form`, shows the proposal to `confirm` and persists the
/// return only if it answers `true`.
pub async fn create_return<F>(
    service: &mut ConsoleService,
    config: &ConsoleConfig,
    form: &ReturnForm,
    now: DateTime<Utc>,
    confirm: F,
) -> ApiResult<ReturnOutcome>
where
    F: FnOnce(&str) -> bool,
{
    let pending = service.propose_return(form, now)?;
    let accepted = confirm(&render_proposal(&pending, service.snapshot(), config));
    service.confirm_return(pending, accepted).await
}

/// Voids a return and reports what was reversed.
pub async fn void_return(
    service: &mut ConsoleService,
    config: &ConsoleConfig,
    return_id: i64,
) -> ApiResult<String> {
    let outcome: VoidOutcome = service.void_return(return_id).await?;
    let stock = match (&outcome.reversal, outcome.stock_adjusted) {
        (Some(reversal), true) => describe_adjustment(reversal),
        (Some(reversal), false) => format!(
            "NOT reversed ({}). Adjust it by hand",
            describe_adjustment(reversal)
        ),
        (None, _) => "not reversed (no product on record)".to_string(),
    };
    let mut out = format!(
        "Return {} voided: {} of store credit withdrawn.\nStock: {}.\n",
        outcome.return_id,
        config.format_currency(outcome.credit_reversed.cents()),
        stock,
    );
    if outcome.snapshot_stale {
        out.push_str(STALE_WARNING);
    }
    Ok(out)
}
