//! # Catalog Repository
//!
//! Database operations for sellable units (products and their variants).
//!
//! ## Who Writes What
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sellable_units                                                         │
//! │                                                                         │
//! │  price_cents, name, sku, is_active  ◄── CatalogRepository (catalog     │
//! │                                         edits, never touch stock)       │
//! │                                                                         │
//! │  quantity_on_hand                   ◄── SaleTransaction               │
//! │                                         decrement_if_available()        │
//! │                                     ◄── CatalogRepository::restock()    │
//! │                                         (stock-adjustment collaborator) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::SellableUnit;

pub(crate) const UNIT_COLUMNS: &str = "id, store_id, parent_product_id, sku, name, variant_label, \
     price_cents, quantity_on_hand, is_active, created_at, updated_at";

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.catalog();
/// let units = repo.list_for_store(&store_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets a unit by its ID, regardless of store.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SellableUnit>> {
        let sql = format!("SELECT {UNIT_COLUMNS} FROM sellable_units WHERE id = ?1");
        let unit = sqlx::query_as::<_, SellableUnit>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(unit)
    }

    /// Lists active units of a store, ordered by name.
    pub async fn list_for_store(&self, store_id: &str) -> DbResult<Vec<SellableUnit>> {
        let sql = format!(
            "SELECT {UNIT_COLUMNS} FROM sellable_units \
             WHERE store_id = ?1 AND is_active = 1 ORDER BY name, variant_label"
        );
        let units = sqlx::query_as::<_, SellableUnit>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(store_id = %store_id, count = units.len(), "Listed units");
        Ok(units)
    }

    /// Inserts a new unit.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - SKU already exists in the store
    pub async fn insert(&self, unit: &SellableUnit) -> DbResult<()> {
        debug!(sku = %unit.sku, store_id = %unit.store_id, "Inserting sellable unit");

        sqlx::query(
            r#"
            INSERT INTO sellable_units (
                id, store_id, parent_product_id, sku, name, variant_label,
                price_cents, quantity_on_hand, is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11
            )
            "#,
        )
        .bind(&unit.id)
        .bind(&unit.store_id)
        .bind(&unit.parent_product_id)
        .bind(&unit.sku)
        .bind(&unit.name)
        .bind(&unit.variant_label)
        .bind(unit.price_cents)
        .bind(unit.quantity_on_hand)
        .bind(unit.is_active)
        .bind(unit.created_at)
        .bind(unit.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Changes the current price of a unit.
    ///
    /// Past sale items keep the price they were sold at.
    pub async fn update_price(&self, id: &str, price_cents: i64) -> DbResult<()> {
        debug!(id = %id, price_cents, "Updating unit price");

        let result = sqlx::query(
            "UPDATE sellable_units SET price_cents = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(price_cents)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SellableUnit", id));
        }

        Ok(())
    }

    /// Marks a unit active or inactive. Inactive units cannot be sold.
    pub async fn set_active(&self, id: &str, is_active: bool) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE sellable_units SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SellableUnit", id));
        }

        Ok(())
    }

    /// Adds received stock to a unit.
    ///
    /// ## Delta Pattern
    /// Always `quantity_on_hand = quantity_on_hand + ?`, never an absolute
    /// write, so it composes with concurrent sale decrements.
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<()> {
        if quantity <= 0 {
            return Err(DbError::InvalidInput(
                "restock quantity must be positive".to_string(),
            ));
        }

        debug!(id = %id, quantity, "Restocking unit");

        let result = sqlx::query(
            r#"
            UPDATE sellable_units
            SET quantity_on_hand = quantity_on_hand + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SellableUnit", id));
        }

        Ok(())
    }

    /// Current quantity on hand, if the unit exists.
    pub async fn quantity_on_hand(&self, id: &str) -> DbResult<Option<i64>> {
        let qty: Option<i64> =
            sqlx::query_scalar("SELECT quantity_on_hand FROM sellable_units WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(qty)
    }

    /// Counts active units (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sellable_units WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new unit ID.
pub fn generate_unit_id() -> String {
    Uuid::new_v4().to_string()
}
