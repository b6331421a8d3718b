//! # Sale Error Types
//!
//! The error taxonomy callers of the sale engine see.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────────┐  ┌─────────────────────┐  ┌─────────────────┐ │
//! │  │  Business (4xx)     │  │  Allocation (5xx)   │  │  Infra (5xx)    │ │
//! │  │                     │  │                     │  │                 │ │
//! │  │  ValidationFailed   │  │  InvoiceAllocation- │  │  Unexpected     │ │
//! │  │  StoreNotFound      │  │    Exhausted        │  │  (DbError,      │ │
//! │  │  ProductNotFound-   │  │                     │  │   timeout)      │ │
//! │  │    InStore          │  │                     │  │                 │ │
//! │  │  StockUnavailable   │  │                     │  │                 │ │
//! │  └─────────────────────┘  └─────────────────────┘  └─────────────────┘ │
//! │                                                                         │
//! │  Every variant is raised before commit; the transaction is rolled back │
//! │  first. HookError is separate: it is only ever logged.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use bazaar_core::error::StockShortage;
use bazaar_core::{CoreError, ValidationError};
use bazaar_db::DbError;

/// Result type alias for sale engine operations.
pub type SaleResult<T> = Result<T, SaleError>;

/// Errors returned by [`SaleEngine::create_sale`](crate::SaleEngine::create_sale).
#[derive(Debug, Error)]
pub enum SaleError {
    /// The cart, store scope or customer reference is invalid.
    #[error("{0}")]
    ValidationFailed(#[from] ValidationError),

    /// The resolved store does not exist or is inactive.
    #[error("Store not found: {store_id}")]
    StoreNotFound { store_id: String },

    /// A cart line names a unit that is unknown, inactive or in another store.
    #[error("Product {unit_id} not found in store {store_id}")]
    ProductNotFoundInStore { unit_id: String, store_id: String },

    /// One or more lines exceed stock. Lists every short line.
    #[error("{}", join_shortages(.0))]
    StockUnavailable(Vec<StockShortage>),

    /// Every invoice candidate within the retry limit was taken.
    #[error("Could not allocate a unique invoice number after {attempts} attempts")]
    InvoiceAllocationExhausted { attempts: u32 },

    /// Infrastructure failure. The message is for logs, not for clients.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

fn join_shortages(shortages: &[StockShortage]) -> String {
    shortages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl SaleError {
    /// Machine-readable code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            SaleError::ValidationFailed(_) => "VALIDATION_FAILED",
            SaleError::StoreNotFound { .. } => "STORE_NOT_FOUND",
            SaleError::ProductNotFoundInStore { .. } => "PRODUCT_NOT_FOUND_IN_STORE",
            SaleError::StockUnavailable(_) => "STOCK_UNAVAILABLE",
            SaleError::InvoiceAllocationExhausted { .. } => "INVOICE_ALLOCATION_EXHAUSTED",
            SaleError::Unexpected(_) => "UNEXPECTED",
        }
    }
}

impl From<CoreError> for SaleError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock(shortages) => SaleError::StockUnavailable(shortages),
            CoreError::Validation(e) => SaleError::ValidationFailed(e),
        }
    }
}

impl From<DbError> for SaleError {
    fn from(err: DbError) -> Self {
        SaleError::Unexpected(err.to_string())
    }
}

// =============================================================================
// Hook Errors
// =============================================================================

/// Failure of a post-commit hook. Logged, never returned to callers.
#[derive(Debug, Error)]
pub enum HookError {
    /// The sink's storage rejected the write.
    #[error("sink write failed: {0}")]
    Sink(#[from] DbError),

    /// The hook did not finish within the hook timeout.
    #[error("timed out after {after_ms} ms")]
    TimedOut { after_ms: u64 },

    /// The hook panicked.
    #[error("panicked: {0}")]
    Panicked(String),

    /// Failure reported by a hook defined outside this crate, such as a
    /// webhook or print sink registered through `HookDispatcher::with_hook`.
    /// The built-in hooks only ever fail with `Sink`.
    #[error("{0}")]
    Failed(String),
}

/// Invalid [`EngineConfig`](crate::EngineConfig) value.
#[derive(Debug, Error)]
#[error("Invalid engine configuration: {0}")]
pub struct InvalidEngineConfig(pub String);
