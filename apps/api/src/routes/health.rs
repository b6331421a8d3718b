//! `GET /health`

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use bazaar_db::MigrationStatus;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations: Option<MigrationStatus>,
    pub server_time: String,
}

/// 200 when the database answers and migrations are current, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;

    let migrations = match state.db.migration_status().await {
        Ok(status) => Some(status),
        Err(e) => {
            warn!(error = %e, "Could not read migration status");
            None
        }
    };

    let healthy = database && migrations.as_ref().is_some_and(MigrationStatus::is_current);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: if healthy { "serving" } else { "not_serving" },
        database,
        migrations,
        server_time: Utc::now().to_rfc3339(),
    };
    (status, Json(body))
}
