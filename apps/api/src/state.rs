//! Shared application state.

use std::sync::Arc;

use bazaar_db::Database;
use bazaar_sales::{HookDispatcher, SaleEngine};

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// Handed to every handler. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub engine: SaleEngine,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    /// Wires the engine with the default post-commit hooks.
    pub fn new(db: Database, config: &ApiConfig) -> Self {
        let hooks = HookDispatcher::with_default_hooks(db.clone(), config.engine.hook_timeout());
        let engine = SaleEngine::new(db.clone(), config.engine.clone()).with_hooks(hooks);

        AppState {
            db,
            engine,
            jwt: Arc::new(JwtManager::new(
                &config.auth.jwt_secret,
                config.auth.token_lifetime_secs,
            )),
        }
    }

    pub fn with_engine(mut self, engine: SaleEngine) -> Self {
        self.engine = engine;
        self
    }
}
