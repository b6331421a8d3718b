//! # bazaar-core: Pure Business Logic for Bazaar POS
//!
//! This crate contains the sale-side business rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/api (axum, HTTP + JSON)                    │   │
//! │  │            POST /api/v1/sales, GET /api/v1/sales/{id}          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               bazaar-sales (Sale Engine)                        │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼──────────────────┐    │
//! │  │   ★ bazaar-core (THIS CRATE) ★  │  │  bazaar-db (SQLite)        │    │
//! │  │  types · money · cart · totals  │  │  repositories, migrations  │    │
//! │  │  invoice · validation           │  │  SaleTransaction           │    │
//! │  │  NO I/O • PURE FUNCTIONS        │  └────────────────────────────┘    │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Store, SellableUnit, Sale, SaleItem, ActingUser)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart request shape and its validation into a `ValidatedCart`
//! - [`totals`] - Discount / tax / shipping / change computation
//! - [`invoice`] - Invoice number prefix, date part and sequence formatting
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::money::Money;
//! use bazaar_core::totals::{Discount, SaleAdjustments, SaleTotals};
//! use bazaar_core::types::TaxRate;
//!
//! let adjustments = SaleAdjustments {
//!     discount: Some(Discount::Fixed { amount_cents: 1000 }),
//!     tax_rate: TaxRate::from_bps(500),
//!     shipping: Money::from_cents(2000),
//!     amount_paid: None,
//! };
//!
//! let totals = SaleTotals::compute(Money::from_cents(10000), &adjustments);
//! assert_eq!(totals.taxable.cents(), 9000);
//! assert_eq!(totals.tax.cents(), 450);
//! assert_eq!(totals.grand_total.cents(), 11450);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod invoice;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartLine, CartRequest, PricedCart, PricedLine, ValidatedCart, ValidatedLine};
pub use error::{CoreError, CoreResult, StockShortage, ValidationError};
pub use invoice::{invoice_prefix, InvoiceNumber};
pub use money::Money;
pub use totals::{Discount, SaleAdjustments, SaleTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps a sale inside one short transaction.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in a cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest amount in cents any single input or cart subtotal may carry.
///
/// Keeps every sum in `SaleTotals` far inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000;

/// Invoice prefix used when a store name has no usable characters.
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";
