//! # Validation Module
//!
//! Field-level validation rules for sale requests.
//!
//! ```text
//!   JSON body ── axum Json extractor ──► shape errors            → 422
//!       │
//!   CartRequest::validate (this module) ──► ranges, lengths, ids → 422
//!       │
//!   SQLite ──► CHECK (quantity_on_hand >= 0), UNIQUE (invoice_number), FKs
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::validation::{validate_quantity, validate_rate_bps};
//!
//! validate_quantity(5).unwrap();
//! assert!(validate_rate_bps("tax_rate_bps", 10_001).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_AMOUNT_CENTS, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest identifier accepted in a request.
pub const MAX_ID_LENGTH: usize = 64;

/// Longest free-text note accepted on a sale.
pub const MAX_NOTES_LENGTH: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a record identifier supplied by the client.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - No whitespace
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_id;
///
/// assert!(validate_id("unit_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_id("unit_id", "").is_err());
/// assert!(validate_id("unit_id", "has space").is_err());
/// ```
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LENGTH,
        });
    }

    if id.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates the free-text notes on a sale.
pub fn validate_notes(notes: &str) -> ValidationResult<()> {
    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// A cart line quantity: 1 to [`MAX_ITEM_QUANTITY`].
///
/// Also re-checked after duplicate lines are merged.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a monetary amount in cents (shipping, amount paid, flat discount).
///
/// Zero is fine; negatives are not, nor anything above [`MAX_AMOUNT_CENTS`].
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_amount_cents;
///
/// assert!(validate_amount_cents("shipping_cents", 0).is_ok());
/// assert!(validate_amount_cents("shipping_cents", -100).is_err());
/// assert!(validate_amount_cents("shipping_cents", i64::MAX).is_err());
/// ```
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates a rate in basis points (tax or percentage discount).
///
/// 0 to 10000 inclusive, i.e. 0% to 100%.
pub fn validate_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines in a cart.
///
/// Between one and [`MAX_CART_ITEMS`] lines.
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::required("items"));
    }

    if lines > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
