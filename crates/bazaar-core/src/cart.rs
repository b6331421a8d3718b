//! # Cart
//!
//! The request shape a till submits, and the two pure steps the sale engine
//! runs on it before touching stock:
//!
//! ```text
//! CartRequest ──validate()──► ValidatedCart ──price_against(units)──► PricedCart
//!   (raw JSON)                 (merged lines,        (authoritative prices,
//!                               checked fields)       all shortages collected)
//! ```
//!
//! Client-submitted prices are never read: `CartLine` has no price field and
//! unknown JSON fields are ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, StockShortage, ValidationError};
use crate::money::Money;
use crate::totals::{Discount, SaleAdjustments, SaleTotals};
use crate::types::{PaymentMethod, SaleStatus, SellableUnit, TaxRate};
use crate::validation::{
    validate_amount_cents, validate_cart_size, validate_id, validate_notes, validate_quantity,
    validate_rate_bps, ValidationResult,
};
use crate::{MAX_AMOUNT_CENTS, MAX_ITEM_QUANTITY};

// =============================================================================
// Request
// =============================================================================

/// One requested line: which unit, how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub unit_id: String,
    pub quantity: i64,
}

/// A checkout request as submitted by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartRequest {
    /// Store override; honoured for admins only.
    pub store_id: Option<String>,
    pub customer_id: Option<String>,
    #[serde(default)]
    pub items: Vec<CartLine>,
    pub discount: Option<Discount>,
    pub tax_rate_bps: Option<u32>,
    pub shipping_cents: Option<i64>,
    /// Defaults to the grand total.
    pub amount_paid_cents: Option<i64>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<SaleStatus>,
    pub notes: Option<String>,
}

impl CartRequest {
    /// Checks the request shape and merges duplicate lines.
    ///
    /// Lines for the same unit are summed, keeping the position of the
    /// first occurrence. The merged quantity is held to the same per-line
    /// limit.
    pub fn validate(&self) -> ValidationResult<ValidatedCart> {
        validate_cart_size(self.items.len())?;

        let mut lines: Vec<ValidatedLine> = Vec::with_capacity(self.items.len());
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for line in &self.items {
            validate_id("unit_id", &line.unit_id)?;
            validate_quantity(line.quantity)?;

            match positions.get(line.unit_id.as_str()) {
                Some(&idx) => {
                    let merged = lines[idx].quantity + line.quantity;
                    if merged > MAX_ITEM_QUANTITY {
                        return Err(ValidationError::OutOfRange {
                            field: "quantity".to_string(),
                            min: 1,
                            max: MAX_ITEM_QUANTITY,
                        });
                    }
                    lines[idx].quantity = merged;
                }
                None => {
                    positions.insert(line.unit_id.as_str(), lines.len());
                    lines.push(ValidatedLine {
                        unit_id: line.unit_id.clone(),
                        quantity: line.quantity,
                    });
                }
            }
        }

        if let Some(store_id) = &self.store_id {
            validate_id("store_id", store_id)?;
        }
        if let Some(customer_id) = &self.customer_id {
            validate_id("customer_id", customer_id)?;
        }

        match self.discount {
            Some(Discount::Fixed { amount_cents }) => {
                validate_amount_cents("discount.amount_cents", amount_cents)?
            }
            Some(Discount::Percentage { rate_bps }) => {
                validate_rate_bps("discount.rate_bps", rate_bps)?
            }
            None => {}
        }

        let tax_rate_bps = self.tax_rate_bps.unwrap_or(0);
        validate_rate_bps("tax_rate_bps", tax_rate_bps)?;

        let shipping_cents = self.shipping_cents.unwrap_or(0);
        validate_amount_cents("shipping_cents", shipping_cents)?;

        if let Some(paid) = self.amount_paid_cents {
            validate_amount_cents("amount_paid_cents", paid)?;
        }

        let notes = match self.notes.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => {
                validate_notes(n)?;
                Some(n.to_string())
            }
            _ => None,
        };

        Ok(ValidatedCart {
            store_override: self.store_id.clone(),
            customer_id: self.customer_id.clone(),
            lines,
            adjustments: SaleAdjustments {
                discount: self.discount,
                tax_rate: TaxRate::from_bps(tax_rate_bps),
                shipping: Money::from_cents(shipping_cents),
                amount_paid: self.amount_paid_cents.map(Money::from_cents),
            },
            payment_method: self.payment_method.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            notes,
        })
    }
}

// =============================================================================
// Validated Cart
// =============================================================================

/// A cart line after validation and merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLine {
    pub unit_id: String,
    pub quantity: i64,
}

/// A cart whose shape is known to be valid. Nothing here has been checked
/// against the catalog yet.
#[derive(Debug, Clone)]
pub struct ValidatedCart {
    pub store_override: Option<String>,
    pub customer_id: Option<String>,
    pub lines: Vec<ValidatedLine>,
    pub adjustments: SaleAdjustments,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub notes: Option<String>,
}

impl ValidatedCart {
    /// Unit ids in line order.
    pub fn unit_ids(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.unit_id.as_str())
    }

    /// Prices every line from the catalog rows and checks stock.
    ///
    /// ## Errors
    /// - `CoreError::InsufficientStock` listing every short line
    /// - `CoreError::Validation` if a line's unit is not in `units`, or if
    ///   the subtotal exceeds [`MAX_AMOUNT_CENTS`]
    pub fn price_against(&self, units: &[SellableUnit]) -> CoreResult<PricedCart> {
        let by_id: HashMap<&str, &SellableUnit> =
            units.iter().map(|u| (u.id.as_str(), u)).collect();

        let mut priced = Vec::with_capacity(self.lines.len());
        let mut shortages = Vec::new();

        for line in &self.lines {
            let unit = by_id.get(line.unit_id.as_str()).ok_or_else(|| {
                ValidationError::UnknownReference {
                    field: "unit_id".to_string(),
                    value: line.unit_id.clone(),
                }
            })?;

            if !unit.can_fulfil(line.quantity) {
                shortages.push(StockShortage {
                    unit_id: unit.id.clone(),
                    name: unit.display_name(),
                    requested: line.quantity,
                    available: unit.quantity_on_hand,
                });
                continue;
            }

            let unit_price = unit.price();
            let line_total = unit_price
                .checked_multiply_quantity(line.quantity)
                .ok_or_else(subtotal_out_of_range)?;
            priced.push(PricedLine {
                unit_id: unit.id.clone(),
                sku: unit.sku.clone(),
                name: unit.display_name(),
                unit_price,
                quantity: line.quantity,
                line_total,
            });
        }

        if !shortages.is_empty() {
            return Err(CoreError::InsufficientStock(shortages));
        }

        let subtotal = priced
            .iter()
            .try_fold(Money::zero(), |acc, l| acc.checked_add(l.line_total))
            .filter(|s| s.cents() <= MAX_AMOUNT_CENTS)
            .ok_or_else(subtotal_out_of_range)?;
        Ok(PricedCart {
            lines: priced,
            subtotal,
        })
    }
}

fn subtotal_out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "subtotal".to_string(),
        min: 0,
        max: MAX_AMOUNT_CENTS,
    }
}

// =============================================================================
// Priced Cart
// =============================================================================

/// A line with its price frozen from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_id: String,
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_total: Money,
}

/// Every line priced and known to be in stock at check time.
#[derive(Debug, Clone)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub subtotal: Money,
}

impl PricedCart {
    /// Computes the sale totals for this cart.
    pub fn totals(&self, adjustments: &SaleAdjustments) -> SaleTotals {
        SaleTotals::compute(self.subtotal, adjustments)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn line(unit_id: &str, quantity: i64) -> CartLine {
        CartLine {
            unit_id: unit_id.to_string(),
            quantity,
        }
    }

    fn cart(items: Vec<CartLine>) -> CartRequest {
        CartRequest {
            items,
            ..Default::default()
        }
    }

    fn unit(id: &str, name: &str, price_cents: i64, qty: i64) -> SellableUnit {
        let now = Utc::now();
        SellableUnit {
            id: id.to_string(),
            store_id: "s-1".to_string(),
            parent_product_id: None,
            sku: id.to_uppercase(),
            name: name.to_string(),
            variant_label: None,
            price_cents,
            quantity_on_hand: qty,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = cart(vec![]).validate().unwrap_err();
        assert_eq!(err, ValidationError::required("items"));
    }

    #[test]
    fn test_too_many_lines_rejected() {
        let items = (0..=crate::MAX_CART_ITEMS)
            .map(|i| line(&format!("u-{}", i), 1))
            .collect();
        assert!(cart(items).validate().is_err());
    }

    #[test]
    fn test_bad_quantities_rejected() {
        assert!(cart(vec![line("a", 0)]).validate().is_err());
        assert!(cart(vec![line("a", -3)]).validate().is_err());
        assert!(cart(vec![line("a", 1000)]).validate().is_err());
    }

    #[test]
    fn test_duplicate_lines_merged_in_first_seen_order() {
        let validated = cart(vec![line("a", 2), line("b", 1), line("a", 3)])
            .validate()
            .unwrap();

        assert_eq!(
            validated.lines,
            vec![
                ValidatedLine {
                    unit_id: "a".to_string(),
                    quantity: 5
                },
                ValidatedLine {
                    unit_id: "b".to_string(),
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn test_merged_quantity_over_limit_rejected() {
        assert!(cart(vec![line("a", 500), line("a", 500)]).validate().is_err());
    }

    #[test]
    fn test_defaults_applied() {
        let validated = cart(vec![line("a", 1)]).validate().unwrap();
        assert_eq!(validated.payment_method, PaymentMethod::Cash);
        assert_eq!(validated.status, SaleStatus::Completed);
        assert_eq!(validated.adjustments.tax_rate, TaxRate::zero());
        assert!(validated.adjustments.amount_paid.is_none());
        assert!(validated.notes.is_none());
    }

    #[test]
    fn test_adjustment_ranges_checked() {
        let mut req = cart(vec![line("a", 1)]);
        req.tax_rate_bps = Some(10_001);
        assert!(req.validate().is_err());

        let mut req = cart(vec![line("a", 1)]);
        req.shipping_cents = Some(-1);
        assert!(req.validate().is_err());

        let mut req = cart(vec![line("a", 1)]);
        req.discount = Some(Discount::Fixed { amount_cents: -5 });
        assert!(req.validate().is_err());

        for huge in [i64::MAX, MAX_AMOUNT_CENTS + 1] {
            let mut req = cart(vec![line("a", 1)]);
            req.shipping_cents = Some(huge);
            assert!(matches!(
                req.validate(),
                Err(ValidationError::OutOfRange { ref field, .. }) if field == "shipping_cents"
            ));

            let mut req = cart(vec![line("a", 1)]);
            req.amount_paid_cents = Some(huge);
            assert!(req.validate().is_err());

            let mut req = cart(vec![line("a", 1)]);
            req.discount = Some(Discount::Fixed { amount_cents: huge });
            assert!(req.validate().is_err());
        }
    }

    #[test]
    fn test_subtotal_past_limit_rejected() {
        let validated = cart(vec![line("a", 999)]).validate().unwrap();

        for price_cents in [i64::MAX, MAX_AMOUNT_CENTS] {
            match validated.price_against(&[unit("a", "Gold bar", price_cents, 1000)]) {
                Err(CoreError::Validation(ValidationError::OutOfRange { field, .. })) => {
                    assert_eq!(field, "subtotal");
                }
                other => panic!("expected OutOfRange, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_client_price_is_ignored() {
        let req: CartRequest = serde_json::from_str(
            r#"{"items":[{"unit_id":"a","quantity":2,"unit_price_cents":1}]}"#,
        )
        .unwrap();
        let priced = req
            .validate()
            .unwrap()
            .price_against(&[unit("a", "Widget", 5000, 5)])
            .unwrap();
        assert_eq!(priced.lines[0].unit_price.cents(), 5000);
        assert_eq!(priced.subtotal.cents(), 10000);
    }

    #[test]
    fn test_all_shortages_reported() {
        let validated = cart(vec![line("a", 2), line("b", 1), line("c", 4)])
            .validate()
            .unwrap();
        let units = [
            unit("a", "A", 5000, 3),
            unit("b", "B", 2000, 0),
            unit("c", "C", 100, 1),
        ];

        match validated.price_against(&units) {
            Err(CoreError::InsufficientStock(shortages)) => {
                assert_eq!(shortages.len(), 2);
                assert_eq!(shortages[0].name, "B");
                assert_eq!(shortages[0].available, 0);
                assert_eq!(shortages[0].requested, 1);
                assert_eq!(shortages[1].unit_id, "c");
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_unit_is_validation_error() {
        let validated = cart(vec![line("zzz", 1)]).validate().unwrap();
        assert!(matches!(
            validated.price_against(&[]),
            Err(CoreError::Validation(ValidationError::UnknownReference { .. }))
        ));
    }
}
