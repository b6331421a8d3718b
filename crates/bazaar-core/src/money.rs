//! # Money Module
//!
//! Cents as `i64`, rates as basis points. No floats anywhere in a sale.
//!
//! ## Rounding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  f64:   90.00 × 0.05 can land on 4.4999…  and round to 4.49            │
//! │  cents: 9000 × 500 bps = 4_500_000, +5_000, / 10_000 = 450             │
//! │                                                                         │
//! │  Every invariant on a Sale (grand_total = taxable + tax + shipping)    │
//! │  holds exactly because nothing in the chain is a float.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::money::Money;
//!
//! let price = Money::from_cents(5000);     // 50.00
//! let line = price.multiply_quantity(2);   // 100.00
//! assert_eq!(line.to_string(), "100.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::types::TaxRate;

/// Basis points in 100%.
pub const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// SellableUnit.price_cents ──► SaleItem.unit_price (frozen) ──► line_total
///                                                                  │
///            subtotal ◄────────────────────────────────────────────┘
///               │
///               ▼
///   − discount ──► taxable ──► + tax ──► + shipping ──► grand_total
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Wraps a cent amount.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Strictly greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Line total for `qty` units at this price.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(2000);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 6000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// `multiply_quantity`, or `None` on overflow.
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    #[inline]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Returns `bps` basis points of this amount, rounded half-up to the cent.
    ///
    /// ## Implementation
    /// `(amount * bps + 5000) / 10000` in i128, so large totals cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// // 10% of 100.00
    /// assert_eq!(Money::from_cents(10000).percentage_of(1000).cents(), 1000);
    /// // 8.25% of 10.00 = 0.825 → 0.83
    /// assert_eq!(Money::from_cents(1000).percentage_of(825).cents(), 83);
    /// ```
    pub fn percentage_of(&self, bps: u32) -> Money {
        let scaled = self.0 as i128 * bps as i128 + BPS_SCALE / 2;
        Money((scaled / BPS_SCALE) as i64)
    }

    /// Tax owed on this (already discounted) amount.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    /// use bazaar_core::types::TaxRate;
    ///
    /// let tax = Money::from_cents(9000).calculate_tax(TaxRate::from_bps(500));
    /// assert_eq!(tax.cents(), 450); // 5% of 90.00 = 4.50
    /// ```
    #[inline]
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.percentage_of(rate.bps())
    }

    /// Returns `self - other`, floored at zero.
    #[inline]
    pub fn saturating_sub_floor_zero(&self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with two decimals and no currency symbol.
///
/// ## Note
/// Currency symbols and localisation belong to the client.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(11450).to_string(), "114.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_arithmetic() {
        let price = Money::from_cents(2500);
        let discount = Money::from_cents(700);

        assert_eq!(price + discount, Money::from_cents(3200));
        assert_eq!(price - discount, Money::from_cents(1800));
        assert_eq!(price * 4, Money::from_cents(10_000));

        let subtotal: Money = [price, discount, discount].into_iter().sum();
        assert_eq!(subtotal.cents(), 3900);
    }

    #[test]
    fn test_checked_arithmetic() {
        let price = Money::from_cents(2500);

        assert_eq!(price.checked_multiply_quantity(3), Some(Money::from_cents(7500)));
        assert_eq!(price.checked_add(price), Some(Money::from_cents(5000)));
        assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 12.5% of 0.04 = 0.005 → 0.01
        assert_eq!(Money::from_cents(4).percentage_of(1250).cents(), 1);
        // 33.33% of 1.00 = 0.3333 → 0.33
        assert_eq!(Money::from_cents(100).percentage_of(3333).cents(), 33);
        assert_eq!(Money::from_cents(100).percentage_of(0).cents(), 0);
        assert_eq!(Money::from_cents(100).percentage_of(10_000).cents(), 100);
    }

    #[test]
    fn test_tax_on_discounted_amount() {
        let tax = Money::from_cents(9000).calculate_tax(TaxRate::from_bps(500));
        assert_eq!(tax.cents(), 450);
    }

    #[test]
    fn test_floor_zero_subtraction() {
        let subtotal = Money::from_cents(1000);
        assert_eq!(
            subtotal.saturating_sub_floor_zero(Money::from_cents(1500)),
            Money::zero()
        );
        assert_eq!(
            subtotal.saturating_sub_floor_zero(Money::from_cents(250)).cents(),
            750
        );
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Money::from_cents(1099)).unwrap();
        assert_eq!(json, "1099");
    }
}
