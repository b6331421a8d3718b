//! # Notification Repository
//!
//! In-app notifications for staff members.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// One notification addressed to a staff member.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub store_id: String,
    /// e.g. `sale_created`.
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn unread(
        recipient_id: impl Into<String>,
        store_id: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Notification {
            id: Uuid::new_v4().to_string(),
            recipient_id: recipient_id.into(),
            store_id: store_id.into(),
            kind: kind.into(),
            message: message.into(),
            is_read: false,
            created_at,
        }
    }
}

/// Repository for staff notifications.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Inserts a batch of notifications in one transaction.
    pub async fn create_many(&self, notifications: &[Notification]) -> DbResult<()> {
        if notifications.is_empty() {
            return Ok(());
        }

        debug!(count = notifications.len(), "Creating notifications");

        let mut tx = self.pool.begin().await?;
        for n in notifications {
            sqlx::query(
                r#"
                INSERT INTO notifications (
                    id, recipient_id, store_id, kind, message, is_read, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&n.id)
            .bind(&n.recipient_id)
            .bind(&n.store_id)
            .bind(&n.kind)
            .bind(&n.message)
            .bind(n.is_read)
            .bind(n.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    /// Notifications for one recipient, newest first.
    pub async fn list_for_recipient(&self, recipient_id: &str) -> DbResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, recipient_id, store_id, kind, message, is_read, created_at
            FROM notifications
            WHERE recipient_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }
}
