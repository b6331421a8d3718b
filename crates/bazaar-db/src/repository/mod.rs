//! # Repository Module
//!
//! Database repository implementations for Bazaar POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Handler / tooling                                                     │
//! │       │                                                                 │
//! │       │  db.sales().get_receipt(&id)                                   │
//! │       ▼                                                                 │
//! │  SaleRepository (owns a pool handle, one method per query)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  The sale engine does NOT use these for its writes: every read and     │
//! │  write of a checkout goes through one SaleTransaction instead.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`store::StoreRepository`] - Stores (tenants)
//! - [`catalog::CatalogRepository`] - Sellable units, prices, restocking
//! - [`customer::CustomerRepository`] - Customers
//! - [`staff::StaffRepository`] - Staff, as notification recipients
//! - [`sale::SaleRepository`] - Sale and sale item reads
//! - [`activity::ActivityRepository`] - Activity log
//! - [`notification::NotificationRepository`] - Staff notifications

pub mod activity;
pub mod catalog;
pub mod customer;
pub mod notification;
pub mod sale;
pub mod staff;
pub mod store;
