//! # Money Module
//!
//! Provides the `Money` type for every amount the console handles: sale
//! totals, returned amounts (monto devuelto) and store credit (saldo a favor).
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The backend sends amounts as JSON numbers (25000, 12500.5).            │
//! │  Summing them as floats drifts:                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  Store credit is a SUM over many returns, re-derived on every read,    │
//! │  so drift would show up as balances that never quite reach zero.       │
//! │                                                                         │
//! │  OUR SOLUTION: integer cents, converted once at the wire boundary.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use barberia_core::money::Money;
//!
//! let cera = Money::from_pesos(25_000);
//! assert_eq!(cera.cents(), 2_500_000);
//! assert_eq!((cera * 2_i64).pesos(), 50_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate differences (subtotal − discount) may go
///   negative before being floored
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole pesos.
    ///
    /// ## Example
    /// ```rust
    /// use barberia_core::money::Money;
    ///
    /// assert_eq!(Money::from_pesos(25_000).cents(), 2_500_000);
    /// ```
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos * 100)
    }

    /// Converts a decimal amount received from the backend.
    ///
    /// Only the wire boundary calls this; everything past it is integer.
    /// Non-finite input yields `None`.
    ///
    /// ```rust
    /// use barberia_core::money::Money;
    ///
    /// assert_eq!(Money::from_wire_amount(12500.5), Some(Money::from_cents(1_250_050)));
    /// assert_eq!(Money::from_wire_amount(f64::NAN), None);
    /// ```
    pub fn from_wire_amount(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        Some(Money((amount * 100.0).round() as i64))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Floors the value at zero.
    ///
    /// ```rust
    /// use barberia_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-10).floor_zero(), Money::zero());
    /// assert_eq!(Money::from_cents(10).floor_zero().cents(), 10);
    /// ```
    #[inline]
    pub const fn floor_zero(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Splits an amount evenly over `qty` units, truncating.
    ///
    /// Used to derive a return's unit price from its total amount.
    /// Returns zero for a non-positive quantity.
    pub const fn per_unit(&self, qty: i64) -> Self {
        if qty <= 0 {
            return Money(0);
        }
        Money(self.0 / qty)
    }

    /// Applies a percentage (basis points) and returns the portion.
    ///
    /// ```rust
    /// use barberia_core::money::Money;
    ///
    /// // 10% of $100.00
    /// assert_eq!(Money::from_pesos(100).percentage_of(1000), Money::from_pesos(10));
    /// ```
    pub fn percentage_of(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money(part as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-style rendering; the console formats with its own currency settings.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.pesos().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pesos() {
        let money = Money::from_pesos(25_000);
        assert_eq!(money.cents(), 2_500_000);
        assert_eq!(money.pesos(), 25_000);
        assert_eq!(money.cents_part(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_pesos(25_000)), "$25000.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
    }

    #[test]
    fn test_wire_amount_rounds_to_cents() {
        assert_eq!(Money::from_wire_amount(0.1 + 0.2), Some(Money::from_cents(30)));
        assert_eq!(Money::from_wire_amount(25000.0), Some(Money::from_pesos(25_000)));
        assert_eq!(Money::from_wire_amount(f64::INFINITY), None);
    }

    #[test]
    fn test_sum_and_floor() {
        let amounts = [Money::from_pesos(100), Money::from_pesos(50)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total, Money::from_pesos(150));

        let negative = Money::from_pesos(10) - Money::from_pesos(30);
        assert!(negative.is_negative());
        assert_eq!(negative.floor_zero(), Money::zero());
    }

    #[test]
    fn test_per_unit() {
        assert_eq!(Money::from_pesos(50_000).per_unit(2), Money::from_pesos(25_000));
        assert_eq!(Money::from_pesos(10).per_unit(0), Money::zero());
        // 10.00 / 3 truncates to 3.33
        assert_eq!(Money::from_cents(1000).per_unit(3).cents(), 333);
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(Money::from_cents(1000).percentage_of(825).cents(), 83);
        assert_eq!(Money::from_pesos(200).percentage_of(0), Money::zero());
    }
}
