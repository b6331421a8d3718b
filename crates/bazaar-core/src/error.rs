//! # Error Types
//!
//! Errors raised before anything touches the database.
//!
//! ```text
//!   CartRequest::validate ──► ValidationError ─┐
//!                                              ├──► SaleError (bazaar-sales) ──► ApiError
//!   stock decrement fails ──► StockShortage ───┘          ▲
//!                                                         │
//!                                  DbError (bazaar-db) ───┘
//! ```
//!
//! Messages carry the offending field, name or quantity so the API can
//! pass them through unchanged.

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Stock Shortage
// =============================================================================

/// One cart line that cannot be fulfilled from current stock.
///
/// ## User Workflow
/// ```text
/// Cart: [Widget ×2, Gadget ×1]
///      │
///      ▼
/// Stock check: Widget=3 ✓, Gadget=0 ✗
///      │
///      ▼
/// StockShortage { name: "Gadget", available: 0, requested: 1 }
///      │
///      ▼
/// UI shows: "Insufficient stock for Gadget: available 0, requested 1"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct StockShortage {
    /// Sellable unit that is short.
    pub unit_id: String,
    /// Display name of the unit.
    pub name: String,
    /// Quantity the cart asked for.
    pub requested: i64,
    /// Quantity on hand when the check ran.
    pub available: i64,
}

impl std::fmt::Display for StockShortage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Insufficient stock for {}: available {}, requested {}",
            self.name, self.available, self.requested
        )
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations found without I/O. `SaleError` absorbs both.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more cart lines exceed available stock.
    #[error("{}", format_shortages(.0))]
    InsufficientStock(Vec<StockShortage>),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

fn format_shortages(shortages: &[StockShortage]) -> String {
    shortages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when the cart shape doesn't meet requirements.
/// Used for early validation before any database work runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Missing, empty or blank.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A referenced record does not exist (e.g., customer of another store).
    #[error("{field} '{value}' does not exist")]
    UnknownReference { field: String, value: String },

    /// The acting user cannot be tied to any store.
    #[error("No store scope: {reason}")]
    NoStoreScope { reason: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortage_message() {
        let err = CoreError::InsufficientStock(vec![StockShortage {
            unit_id: "u-1".to_string(),
            name: "Gadget".to_string(),
            requested: 1,
            available: 0,
        }]);
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Gadget: available 0, requested 1"
        );
    }

    #[test]
    fn test_multiple_shortages_are_joined() {
        let err = CoreError::InsufficientStock(vec![
            StockShortage {
                unit_id: "u-1".to_string(),
                name: "A".to_string(),
                requested: 4,
                available: 3,
            },
            StockShortage {
                unit_id: "u-2".to_string(),
                name: "B".to_string(),
                requested: 1,
                available: 0,
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Insufficient stock for A: available 3, requested 4; \
             Insufficient stock for B: available 0, requested 1"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("items").to_string(), "items is required");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 999");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("items").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
