//! # Staff Repository
//!
//! Staff rows are maintained by the identity collaborator; here they are
//! read as notification recipients.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::StaffMember;

/// Repository for staff database operations.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    /// Creates a new StaffRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    /// Inserts a staff member.
    pub async fn insert(&self, staff: &StaffMember) -> DbResult<()> {
        debug!(id = %staff.id, role = ?staff.role, "Inserting staff member");

        sqlx::query(
            r#"
            INSERT INTO staff (id, name, role, store_id, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&staff.id)
        .bind(&staff.name)
        .bind(staff.role)
        .bind(&staff.store_id)
        .bind(staff.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Active staff assigned to a store.
    pub async fn list_active_for_store(&self, store_id: &str) -> DbResult<Vec<StaffMember>> {
        let staff = sqlx::query_as::<_, StaffMember>(
            r#"
            SELECT id, name, role, store_id, is_active
            FROM staff
            WHERE store_id = ?1 AND is_active = 1
            ORDER BY name
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(staff)
    }
}
