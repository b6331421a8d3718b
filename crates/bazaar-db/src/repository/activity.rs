//! # Activity Log Repository
//!
//! Append-only audit trail written after a sale commits.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// One activity log row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActivityEntry {
    pub id: String,
    pub store_id: String,
    /// User who performed the action.
    pub actor_id: String,
    /// Machine-readable action, e.g. `sale.created`.
    pub action: String,
    /// ID of the record acted on.
    pub subject_id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        store_id: impl Into<String>,
        actor_id: impl Into<String>,
        action: impl Into<String>,
        subject_id: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        ActivityEntry {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.into(),
            actor_id: actor_id.into(),
            action: action.into(),
            subject_id: subject_id.into(),
            description: description.into(),
            created_at,
        }
    }
}

/// Repository for the activity log.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    /// Creates a new ActivityRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ActivityRepository { pool }
    }

    /// Appends an entry.
    pub async fn record(&self, entry: &ActivityEntry) -> DbResult<()> {
        debug!(action = %entry.action, subject_id = %entry.subject_id, "Recording activity");

        sqlx::query(
            r#"
            INSERT INTO activity_log (
                id, store_id, actor_id, action, subject_id, description, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.store_id)
        .bind(&entry.actor_id)
        .bind(&entry.action)
        .bind(&entry.subject_id)
        .bind(&entry.description)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Entries for a store, newest first.
    pub async fn list_for_store(&self, store_id: &str, limit: u32) -> DbResult<Vec<ActivityEntry>> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            r#"
            SELECT id, store_id, actor_id, action, subject_id, description, created_at
            FROM activity_log
            WHERE store_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(store_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
