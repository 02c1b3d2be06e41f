//! # Sale Reconciliation
//!
//! Adjusted view of a sale after its returns: what the client still holds.
//!
//! ## Matching Returns to Lines
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  return.product_id > 0 and line.item_id > 0 ?                          │
//! │       │ yes                         │ no                                │
//! │       ▼                             ▼                                   │
//! │  ids equal                  trimmed, case-insensitive names equal       │
//! │                                                                         │
//! │  Legacy records carry only display names, so both tiers are needed.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Voided returns are ignored entirely. Services and packages are never
//! reduced because returns only target products.
//!
//! When a product appears on several lines, a return fills them in sale
//! order, each up to its sold quantity. Units beyond every line's quantity
//! stay on the last matching line, which then floors at zero.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Return, Sale, SaleLine};

/// One sale line next to what was returned from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledLine {
    pub line: SaleLine,
    pub returned_quantity: i64,
    /// `max(0, original − returned)`.
    pub adjusted_quantity: i64,
    pub adjusted_total_cents: i64,
}

/// The adjusted view of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledSale {
    pub sale_id: i64,
    pub lines: Vec<ReconciledLine>,
    pub adjusted_subtotal_cents: i64,
    /// `max(0, adjusted subtotal − discount)`; tax is not re-added.
    pub adjusted_total_cents: i64,
    pub has_returns: bool,
}

impl ReconciledSale {
    #[inline]
    pub fn adjusted_subtotal(&self) -> Money {
        Money::from_cents(self.adjusted_subtotal_cents)
    }

    #[inline]
    pub fn adjusted_total(&self) -> Money {
        Money::from_cents(self.adjusted_total_cents)
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whether `ret` targets `line`.
pub fn return_matches_line(ret: &Return, line: &SaleLine) -> bool {
    if !line.is_product() {
        return false;
    }
    match (ret.product_id.filter(|id| *id > 0), line.item_id.filter(|id| *id > 0)) {
        (Some(returned), Some(sold)) => returned == sold,
        _ => {
            let name = normalize_name(&ret.product_name);
            !name.is_empty() && name == normalize_name(&line.name)
        }
    }
}

/// Non-voided returns that belong to `sale`.
pub fn active_returns_for<'a>(sale: &Sale, returns: &'a [Return]) -> impl Iterator<Item = &'a Return> {
    let sale_id = sale.id;
    returns
        .iter()
        .filter(move |r| r.sale_id == sale_id && r.status.reduces_sale())
}

/// Quantity of non-voided returns that target `line`, before it is split
/// across duplicate lines of the same product.
pub fn returned_quantity(sale: &Sale, line: &SaleLine, returns: &[Return]) -> i64 {
    active_returns_for(sale, returns)
        .filter(|r| return_matches_line(r, line))
        .map(|r| r.quantity)
        .sum()
}

/// Quantity of `product_id` already returned on `sale` (non-voided returns).
///
/// Used by the cumulative quantity gate; legacy returns without an id are
/// matched to the product's line by name.
pub fn returned_quantity_of_product(sale: &Sale, product_id: i64, returns: &[Return]) -> i64 {
    match sale.product_line(product_id) {
        Some(line) => returned_quantity(sale, line, returns),
        None => 0,
    }
}

/// Units returned from each line of `sale`, in line order.
pub fn allocate_returns(sale: &Sale, returns: &[Return]) -> Vec<i64> {
    let mut returned = vec![0_i64; sale.lines.len()];

    for ret in active_returns_for(sale, returns) {
        let matching: Vec<usize> = sale
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| return_matches_line(ret, line))
            .map(|(index, _)| index)
            .collect();
        let Some(&last) = matching.last() else {
            continue;
        };

        let mut left = ret.quantity.max(0);
        for &index in &matching {
            let room = (sale.lines[index].quantity - returned[index]).max(0);
            let taken = left.min(room);
            returned[index] += taken;
            left -= taken;
        }
        returned[last] += left;
    }

    returned
}

/// Builds the adjusted view of `sale`.
///
/// Pure and idempotent; safe to call on every render.
pub fn reconcile(sale: &Sale, returns: &[Return]) -> ReconciledSale {
    let allocated = allocate_returns(sale, returns);
    let has_returns = allocated.iter().any(|returned| *returned > 0);

    let lines: Vec<ReconciledLine> = sale
        .lines
        .iter()
        .zip(allocated)
        .map(|(line, returned)| {
            let adjusted = (line.quantity - returned).max(0);
            ReconciledLine {
                line: line.clone(),
                returned_quantity: returned,
                adjusted_quantity: adjusted,
                adjusted_total_cents: line.unit_price().multiply_quantity(adjusted).cents(),
            }
        })
        .collect();

    let adjusted_subtotal: Money = lines
        .iter()
        .map(|l| Money::from_cents(l.adjusted_total_cents))
        .sum();
    let adjusted_total = (adjusted_subtotal - sale.discount()).floor_zero();

    ReconciledSale {
        sale_id: sale.id,
        lines,
        adjusted_subtotal_cents: adjusted_subtotal.cents(),
        adjusted_total_cents: adjusted_total.cents(),
        has_returns,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LineKind, PaymentMethod, ReturnReason, ReturnStatus, SaleStatus};
    use chrono::{TimeZone, Utc};

    fn product_line(id: Option<i64>, name: &str, pesos: i64, quantity: i64) -> SaleLine {
        SaleLine {
            kind: LineKind::Product,
            item_id: id,
            name: name.to_string(),
            unit_price_cents: Money::from_pesos(pesos).cents(),
            quantity,
        }
    }

    fn sale(lines: Vec<SaleLine>, discount_pesos: i64) -> Sale {
        let subtotal: Money = lines.iter().map(SaleLine::line_total).sum();
        let discount = Money::from_pesos(discount_pesos);
        Sale {
            id: 1,
            sale_number: "V-0001".to_string(),
            client_id: 4,
            document: None,
            date: Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
            payment_method: PaymentMethod::Card,
            warranty_months: 1,
            discount_percent: 0,
            subtotal_cents: subtotal.cents(),
            tax_cents: 0,
            discount_cents: discount.cents(),
            total_cents: (subtotal - discount).cents(),
            status: SaleStatus::Completed,
            lines,
        }
    }

    fn ret(product_id: Option<i64>, name: &str, quantity: i64, status: ReturnStatus) -> Return {
        Return {
            id: 0,
            sale_id: 1,
            client_id: 4,
            product_id,
            product_name: name.to_string(),
            quantity,
            amount_cents: 0,
            credit_cents: 0,
            reason: ReturnReason::Defective,
            reason_detail: None,
            observations: None,
            user_id: None,
            date: Utc.with_ymd_and_hms(2026, 6, 3, 12, 0, 0).unwrap(),
            status,
        }
    }

    #[test]
    fn test_floors_at_zero() {
        let s = sale(vec![product_line(Some(7), "Cera", 100, 2)], 0);
        let returns = vec![
            ret(Some(7), "Cera", 2, ReturnStatus::Completed),
            ret(Some(7), "Cera", 2, ReturnStatus::Pending),
        ];
        let view = reconcile(&s, &returns);
        assert_eq!(view.lines[0].returned_quantity, 4);
        assert_eq!(view.lines[0].adjusted_quantity, 0);
        assert_eq!(view.adjusted_subtotal(), Money::zero());
        assert_eq!(view.adjusted_total(), Money::zero());
    }

    #[test]
    fn test_voided_returns_ignored() {
        let s = sale(vec![product_line(Some(7), "Cera", 100, 2)], 0);
        let returns = vec![
            ret(Some(7), "Cera", 2, ReturnStatus::Voided),
            ret(Some(7), "Cera", 2, ReturnStatus::Voided),
        ];
        let view = reconcile(&s, &returns);
        assert_eq!(view.lines[0].adjusted_quantity, 2);
        assert_eq!(view.adjusted_subtotal(), Money::from_pesos(200));
        assert!(!view.has_returns);
    }

    #[test]
    fn test_name_fallback_when_id_missing() {
        let s = sale(
            vec![
                product_line(Some(7), "Cera Mate", 100, 3),
                product_line(None, "Shampoo Anticaspa", 50, 1),
            ],
            0,
        );
        let returns = vec![
            ret(None, "  cera mate ", 1, ReturnStatus::Completed),
            ret(Some(0), "SHAMPOO ANTICASPA", 1, ReturnStatus::Completed),
            ret(Some(12), "Shampoo Anticaspa", 1, ReturnStatus::Completed),
        ];
        let view = reconcile(&s, &returns);
        assert_eq!(view.lines[0].adjusted_quantity, 2);
        // id 12 vs a line without id falls back to name as well
        assert_eq!(view.lines[1].returned_quantity, 2);
        assert_eq!(view.lines[1].adjusted_quantity, 0);
    }

    #[test]
    fn test_id_match_wins_over_name() {
        let s = sale(vec![product_line(Some(7), "Cera", 100, 2)], 0);
        let returns = vec![ret(Some(8), "Cera", 1, ReturnStatus::Completed)];
        assert_eq!(reconcile(&s, &returns).lines[0].returned_quantity, 0);
    }

    #[test]
    fn test_services_untouched_and_discount_subtracted() {
        let mut lines = vec![product_line(Some(7), "Cera", 100, 1)];
        lines.push(SaleLine {
            kind: LineKind::Service,
            item_id: Some(7),
            name: "Cera".to_string(),
            unit_price_cents: Money::from_pesos(60).cents(),
            quantity: 1,
        });
        let s = sale(lines, 20);
        let returns = vec![ret(Some(7), "Cera", 1, ReturnStatus::Completed)];

        let view = reconcile(&s, &returns);
        assert_eq!(view.lines[1].adjusted_quantity, 1);
        assert_eq!(view.adjusted_subtotal(), Money::from_pesos(60));
        assert_eq!(view.adjusted_total(), Money::from_pesos(40));
    }

    #[test]
    fn test_other_sales_returns_ignored() {
        let s = sale(vec![product_line(Some(7), "Cera", 100, 2)], 0);
        let mut other = ret(Some(7), "Cera", 2, ReturnStatus::Completed);
        other.sale_id = 2;
        assert_eq!(reconcile(&s, &[other]).lines[0].adjusted_quantity, 2);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let s = sale(vec![product_line(Some(7), "Cera", 100, 2)], 10);
        let returns = vec![ret(Some(7), "Cera", 1, ReturnStatus::Completed)];
        assert_eq!(reconcile(&s, &returns), reconcile(&s, &returns));
        assert_eq!(returned_quantity_of_product(&s, 7, &returns), 1);
        assert_eq!(returned_quantity_of_product(&s, 99, &returns), 0);
    }

    #[test]
    fn test_duplicate_lines_share_one_return() {
        let s = sale(
            vec![
                product_line(Some(7), "Cera", 100, 2),
                product_line(Some(7), "Cera", 100, 1),
            ],
            0,
        );
        let returns = vec![ret(Some(7), "Cera", 1, ReturnStatus::Completed)];

        let view = reconcile(&s, &returns);
        assert_eq!(view.lines[0].returned_quantity, 1);
        assert_eq!(view.lines[1].returned_quantity, 0);
        assert_eq!(view.adjusted_subtotal(), Money::from_pesos(200));
    }

    #[test]
    fn test_duplicate_lines_fill_in_sale_order() {
        let s = sale(
            vec![
                product_line(Some(7), "Cera", 100, 2),
                product_line(Some(7), "Cera", 80, 1),
            ],
            0,
        );
        let returns = vec![
            ret(Some(7), "Cera", 2, ReturnStatus::Completed),
            ret(Some(7), "Cera", 2, ReturnStatus::Completed),
        ];

        assert_eq!(allocate_returns(&s, &returns), vec![2, 2]);
        let view = reconcile(&s, &returns);
        assert_eq!(view.lines[1].adjusted_quantity, 0);
        assert_eq!(view.adjusted_subtotal(), Money::zero());
        assert_eq!(returned_quantity_of_product(&s, 7, &returns), 4);
    }
}
