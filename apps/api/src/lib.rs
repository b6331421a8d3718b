//! # Bazaar API
//!
//! HTTP+JSON front for the sale engine.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/v1/sales        Bearer JWT   CartRequest → 201 SaleReceipt  │
//! │  GET  /api/v1/sales/{id}   Bearer JWT   → 200 SaleReceipt / 404        │
//! │  GET  /health              -            → 200 / 503                    │
//! │                                                                         │
//! │  Errors: { "code", "message", "details"? }  (see error.rs)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! `api.toml` plus environment variables:
//! - `BAZAAR_CONFIG` - config file path
//! - `BAZAAR_BIND_ADDR`, `BAZAAR_PORT` - listen address
//! - `BAZAAR_DATABASE_PATH` - SQLite file
//! - `BAZAAR_JWT_SECRET` - HS256 secret for bearer tokens
//! - `BAZAAR_INVOICE_RETRY_LIMIT` - engine invoice retry limit

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

#[cfg(test)]
mod tests;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::ApiConfig;
pub use error::ApiError;
pub use state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/sales", post(routes::sales::create_sale))
        .route("/api/v1/sales/{id}", get(routes::sales::get_sale))
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
