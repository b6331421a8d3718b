//! # Database Error Types
//!
//! ```text
//! sqlx::Error ──► DbError ──► SaleError::Unexpected      (engine)
//!                    │
//!                    └── UniqueViolation on sales.invoice_number
//!                        is caught by the engine and retried
//! ```

use sqlx::error::{DatabaseError, ErrorKind};
use thiserror::Error;

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Which non-unique constraint a write broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    ForeignKey,
    Check,
    NotNull,
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Constraint::ForeignKey => "foreign key",
            Constraint::Check => "check",
            Constraint::NotNull => "not null",
        })
    }
}

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// `field` is SQLite's `table.column` (e.g. `sales.invoice_number`).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key, CHECK (stock below zero, negative totals) or NOT NULL.
    #[error("{constraint} constraint violated: {message}")]
    ConstraintViolation {
        constraint: Constraint,
        message: String,
    },

    /// Caller passed a value the repository refuses before touching SQL.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Query failed: {0}")]
    Query(String),

    /// No pooled connection became free within the acquire timeout.
    #[error("Timed out waiting for a database connection")]
    PoolTimedOut,
}

impl DbError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True if this is a UNIQUE violation on the given `table.column`.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_db::DbError;
    ///
    /// let err = DbError::duplicate("sales.invoice_number", "ACM-240309-0001");
    /// assert!(err.is_unique_violation_on("sales.invoice_number"));
    /// assert!(!err.is_unique_violation_on("sellable_units.sku"));
    /// ```
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field.contains(column))
    }

    fn from_database(err: &dyn DatabaseError) -> Self {
        let message = err.message().to_string();
        let constraint = match err.kind() {
            ErrorKind::UniqueViolation => {
                return DbError::UniqueViolation {
                    field: unique_field(&message).to_string(),
                    value: String::new(),
                }
            }
            ErrorKind::ForeignKeyViolation => Constraint::ForeignKey,
            ErrorKind::CheckViolation => Constraint::Check,
            ErrorKind::NotNullViolation => Constraint::NotNull,
            _ => return DbError::Query(message),
        };
        DbError::ConstraintViolation {
            constraint,
            message,
        }
    }
}

/// Pulls `table.column` out of "UNIQUE constraint failed: table.column".
fn unique_field(message: &str) -> &str {
    message
        .split_once("UNIQUE constraint failed: ")
        .map(|(_, field)| field.trim())
        .unwrap_or("unknown")
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::from_database(&*db_err),
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),
            sqlx::Error::PoolTimedOut => DbError::PoolTimedOut,
            sqlx::Error::PoolClosed => DbError::Connection("pool is closed".to_string()),
            other => DbError::Query(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_field() {
        assert_eq!(
            unique_field("UNIQUE constraint failed: sales.invoice_number"),
            "sales.invoice_number"
        );
        assert_eq!(unique_field("something else"), "unknown");
    }

    #[test]
    fn test_display() {
        let err = DbError::ConstraintViolation {
            constraint: Constraint::Check,
            message: "CHECK constraint failed: quantity_on_hand >= 0".into(),
        };
        assert_eq!(
            err.to_string(),
            "check constraint violated: CHECK constraint failed: quantity_on_hand >= 0"
        );
        assert_eq!(
            DbError::not_found("Store", "s-1").to_string(),
            "Store not found: s-1"
        );
    }
}
