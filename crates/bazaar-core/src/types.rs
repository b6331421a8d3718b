//! # Domain Types
//!
//! Records the sale engine reads and writes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Store       │   │  SellableUnit   │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  store_id       │   │  store_id       │       │
//! │  │  name → prefix  │   │  price_cents    │   └─────────────────┘       │
//! │  └─────────────────┘   │  quantity_on_   │                             │
//! │          ▲             │    hand (≥ 0)   │                             │
//! │          │             └────────▲────────┘                             │
//! │  ┌───────┴─────────┐   ┌────────┴────────┐   ┌─────────────────┐       │
//! │  │      Sale       │◄──│    SaleItem     │   │   ActingUser    │       │
//! │  │  invoice_number │   │  unit_price     │   │  role, store_id │       │
//! │  │  grand_total    │   │   (frozen)      │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are keyed by a UUID `id`; people read the `sku` and `invoice_number`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points: 500 = 5%, 825 = 8.25%.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

// =============================================================================
// Identity
// =============================================================================

/// Staff role, as resolved by the identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Back-office administrator; may act on any store.
    Admin,
    /// Store manager.
    Manager,
    /// Till operator.
    Cashier,
}

impl Role {
    /// Only administrators may pick a store other than their own.
    #[inline]
    pub fn can_override_store(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// The user performing a request.
///
/// Passed explicitly into the sale engine rather than read from ambient
/// request state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ActingUser {
    pub user_id: String,
    pub role: Role,
    /// Store the user is scoped to. Admins may be unscoped.
    pub store_id: Option<String>,
}

// =============================================================================
// Store
// =============================================================================

/// A store (tenant) that owns catalog, customers and sales.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Store {
    pub id: String,
    /// Display name; the invoice prefix is derived from it.
    pub name: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sellable Unit
// =============================================================================

/// A product or product variant that can be put in a cart.
///
/// ## Stock Invariant
/// `quantity_on_hand` never goes below zero. It is only decremented by the
/// sale engine via a conditional update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SellableUnit {
    pub id: String,
    pub store_id: String,
    /// Set for variants: the product this variant belongs to.
    pub parent_product_id: Option<String>,
    pub sku: String,
    pub name: String,
    /// e.g. "Large / Red" for variants.
    pub variant_label: Option<String>,
    /// Current authoritative price in cents.
    pub price_cents: i64,
    pub quantity_on_hand: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl SellableUnit {
    /// Current shelf price.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Name as printed on the invoice ("Shirt (Large / Red)").
    pub fn display_name(&self) -> String {
        match &self.variant_label {
            Some(label) if !label.is_empty() => format!("{} ({})", self.name, label),
            _ => self.name.clone(),
        }
    }

    /// Checks if `quantity` can be taken from stock.
    #[inline]
    pub fn can_fulfil(&self, quantity: i64) -> bool {
        self.quantity_on_hand >= quantity
    }
}

// =============================================================================
// Customer / Staff
// =============================================================================

/// A customer of one store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A staff account, used as a notification recipient.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub store_id: Option<String>,
    pub is_active: bool,
}

// =============================================================================
// Sale Status / Payment
// =============================================================================

/// The status of a sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale has been handed over to the customer.
    #[default]
    Completed,
    /// Sale is parked (e.g. awaiting collection); stock is already taken.
    Pending,
}

/// Payment state, derived from amount paid vs grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Due,
}

impl PaymentStatus {
    /// Derives the status from what was paid against what is owed.
    pub fn from_amounts(amount_paid: Money, grand_total: Money) -> Self {
        if amount_paid >= grand_total {
            PaymentStatus::Paid
        } else if amount_paid.is_positive() {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Due
        }
    }
}

/// How the customer paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    #[default]
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Mobile wallet.
    Mobile,
    Other,
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale.
///
/// ## Invariant
/// `grand_total_cents = taxable_cents + tax_cents + shipping_cents` where
/// `taxable_cents = subtotal_cents - discount_cents`. All of it is computed
/// server-side.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub store_id: String,
    /// Staff member who performed the sale.
    pub staff_id: String,
    pub customer_id: Option<String>,
    /// `PREFIX-YYMMDD-SEQ`, unique across all sales.
    pub invoice_number: String,
    /// Business date the invoice sequence is counted on.
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub subtotal_cents: i64,
    /// Resolved discount amount (authoritative).
    pub discount_cents: i64,
    /// Set when the discount was requested as a percentage.
    pub discount_rate_bps: Option<u32>,
    pub taxable_cents: i64,
    pub tax_rate_bps: u32,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub grand_total_cents: i64,
    pub amount_paid_cents: i64,
    pub change_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: SaleStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the grand total as Money.
    #[inline]
    pub fn grand_total(&self) -> Money {
        Money::from_cents(self.grand_total_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze unit data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub unit_id: String,
    /// Copied from the unit when the sale was written.
    pub sku_snapshot: String,
    /// Display name at time of sale (frozen).
    pub name_snapshot: String,
    /// Price charged, copied at sale time; later price edits do not touch it.
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Price charged per unit.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// A sale together with its items, as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleReceipt {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================
