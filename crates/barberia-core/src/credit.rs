//! # Store-Credit Aggregator
//!
//! Derives a client's saldo a favor from the returns ledger.
//!
//! There is no stored balance. Every read re-scans the current return set,
//! so voiding a return makes its credit disappear from the next derivation
//! without any compensating write.
//!
//! ```text
//! returns ──filter(client, Completed)──► Σ credit ──► balance
//!                                                      │
//!                       sale total ──► min(total, balance) = applicable credit
//! ```

use std::collections::BTreeMap;

use crate::money::Money;
use crate::types::Return;

/// Sum of `credit` over the client's returns whose status is Completed.
///
/// ```rust
/// use barberia_core::credit::credit_balance;
/// use barberia_core::Money;
///
/// assert_eq!(credit_balance(&[], 42), Money::zero());
/// ```
pub fn credit_balance(returns: &[Return], client_id: i64) -> Money {
    returns
        .iter()
        .filter(|r| r.client_id == client_id && r.status.generates_credit())
        .map(Return::credit)
        .sum::<Money>()
        .floor_zero()
}

/// Balances for every client with at least one completed return.
pub fn balances_by_client(returns: &[Return]) -> BTreeMap<i64, Money> {
    let mut balances = BTreeMap::new();
    for r in returns.iter().filter(|r| r.status.generates_credit()) {
        *balances.entry(r.client_id).or_insert_with(Money::zero) += r.credit();
    }
    balances.retain(|_, balance| balance.is_positive());
    balances
}

/// Whether the "use my credit" option should be offered at checkout.
#[inline]
pub fn offers_credit(balance: Money) -> bool {
    balance.is_positive()
}

/// Credit that can be applied to a new sale: `min(sale_total, balance)`.
pub fn applicable_credit(sale_total: Money, balance: Money) -> Money {
    sale_total.min(balance).floor_zero()
}

// =============================================================================
// Unit Tests
// =============================================================================
