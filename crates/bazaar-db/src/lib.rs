//! # bazaar-db: Database Layer for Bazaar POS
//!
//! SQLite storage via sqlx: pool, embedded migrations, repositories and the
//! sale unit of work.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar POS Data Flow                             │
//! │                                                                         │
//! │  SaleEngine::create_sale            GET /api/v1/sales/{id}             │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bazaar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │ SaleTransaction│   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │───►│ (unit_of_work) │   │  (embedded)  │  │   │
//! │  │   │               │    └────────────────┘   │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │    ┌────────────────┐   └──────────────┘  │   │
//! │  │   │               │───►│  Repositories  │                      │   │
//! │  │   └───────────────┘    │ stores, catalog│                      │   │
//! │  │                        │ sales, ...     │                      │   │
//! │  │                        └────────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("bazaar.db")).await?;
//!
//! let mut tx = db.begin_sale().await?;
//! let unit = tx.find_unit_in_store(&unit_id, &store_id).await?;
//! // ...
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{Constraint, DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};
pub use unit_of_work::SaleTransaction;

// Repository re-exports for convenience
pub use repository::activity::{ActivityEntry, ActivityRepository};
pub use repository::catalog::CatalogRepository;
pub use repository::customer::CustomerRepository;
pub use repository::notification::{Notification, NotificationRepository};
pub use repository::sale::SaleRepository;
pub use repository::staff::StaffRepository;
pub use repository::store::StoreRepository;
