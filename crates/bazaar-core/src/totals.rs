//! # Sale Totals
//!
//! Turns a subtotal plus the cart's adjustments into the full monetary
//! breakdown of a sale.
//!
//! ## Calculation Order
//! ```text
//! subtotal ─── − discount (clamped to subtotal) ──► taxable
//!                                                    │
//!                                     × tax_rate ──► tax (half-up)
//!                                                    │
//!      grand_total = taxable + tax + shipping ◄──────┘
//!                     │
//!      amount_paid (defaults to grand_total)
//!      change = max(0, amount_paid − grand_total)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentStatus, TaxRate};

/// A discount requested on the whole sale.
///
/// ## Wire Format
/// ```json
/// { "type": "fixed", "amount_cents": 1000 }
/// { "type": "percentage", "rate_bps": 1500 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Discount {
    /// Flat amount off the subtotal.
    Fixed { amount_cents: i64 },
    /// Basis points of the subtotal.
    Percentage { rate_bps: u32 },
}

impl Discount {
    /// Resolves the discount against a subtotal, clamped to `[0, subtotal]`.
    pub fn resolve(&self, subtotal: Money) -> Money {
        let raw = match self {
            Discount::Fixed { amount_cents } => Money::from_cents(*amount_cents),
            Discount::Percentage { rate_bps } => subtotal.percentage_of(*rate_bps),
        };
        raw.max(Money::zero()).min(subtotal)
    }

    /// The rate to persist alongside the amount, if any.
    pub fn rate_bps(&self) -> Option<u32> {
        match self {
            Discount::Fixed { .. } => None,
            Discount::Percentage { rate_bps } => Some(*rate_bps),
        }
    }
}

/// Cart-level adjustments applied on top of the subtotal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleAdjustments {
    pub discount: Option<Discount>,
    pub tax_rate: TaxRate,
    pub shipping: Money,
    /// `None` means "paid in full".
    pub amount_paid: Option<Money>,
}

/// The monetary breakdown of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub taxable: Money,
    pub tax: Money,
    pub shipping: Money,
    pub grand_total: Money,
    pub amount_paid: Money,
    pub change: Money,
}

impl SaleTotals {
    /// Computes every figure from the subtotal and adjustments.
    ///
    /// Inputs are expected within [`MAX_AMOUNT_CENTS`](crate::MAX_AMOUNT_CENTS),
    /// which cart validation and pricing enforce.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    /// use bazaar_core::totals::{SaleAdjustments, SaleTotals};
    ///
    /// let totals = SaleTotals::compute(Money::from_cents(10000), &SaleAdjustments::default());
    /// assert_eq!(totals.grand_total.cents(), 10000);
    /// assert_eq!(totals.amount_paid.cents(), 10000);
    /// assert!(totals.change.is_zero());
    /// ```
    pub fn compute(subtotal: Money, adjustments: &SaleAdjustments) -> Self {
        let discount = adjustments
            .discount
            .map(|d| d.resolve(subtotal))
            .unwrap_or_default();

        let taxable = subtotal - discount;
        let tax = taxable.calculate_tax(adjustments.tax_rate);
        let shipping = adjustments.shipping;
        let grand_total = taxable + tax + shipping;

        let amount_paid = adjustments.amount_paid.unwrap_or(grand_total);
        let change = amount_paid.saturating_sub_floor_zero(grand_total);

        SaleTotals {
            subtotal,
            discount,
            taxable,
            tax,
            shipping,
            grand_total,
            amount_paid,
            change,
        }
    }

    /// Payment status implied by these totals.
    #[inline]
    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::from_amounts(self.amount_paid, self.grand_total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
