//! # bazaar-sales: Sale Engine for Bazaar POS
//!
//! Turns a cart into a committed sale: store scoping, stock check, pricing,
//! invoice numbering, and the writes, all in one transaction.
//!
//! ## Module Structure
//! ```text
//! bazaar_sales/
//! ├── engine.rs  ← SaleEngine::create_sale
//! ├── hooks.rs   ← Post-commit hooks (activity log, staff notifications)
//! ├── clock.rs   ← Injected time source
//! ├── config.rs  ← EngineConfig ([engine] section)
//! └── error.rs   ← SaleError taxonomy, HookError
//! ```
//!
//! ## Guarantees
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Ok(receipt)  → sale + items + stock decrements are all durable        │
//! │  Err(_)       → none of them exist                                     │
//! │  Concurrent sales never drive quantity_on_hand below zero              │
//! │  Invoice numbers are unique across all stores                          │
//! │  A failing post-commit hook never turns Ok into Err                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod hooks;


pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use engine::SaleEngine;
pub use error::{HookError, InvalidEngineConfig, SaleError, SaleResult};
pub use hooks::{
    ActivityLogHook, DispatchReport, HookDispatcher, PostCommitHook, SaleCommitted,
    StaffNotificationHook,
};
