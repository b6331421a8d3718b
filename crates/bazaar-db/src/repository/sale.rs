//! # Sale Repository
//!
//! Read-side database operations for sales and sale items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE (SaleTransaction, one unit of work)                         │
//! │     ├── insert_sale()        → Sale header, unique invoice_number      │
//! │     ├── insert_sale_item()   → frozen sku / name / unit price          │
//! │     ├── decrement_if_available() per line                              │
//! │     └── commit()                                                       │
//! │                                                                         │
//! │  2. READ (this repository)                                             │
//! │     └── get_receipt() → Sale + items                                   │
//! │                                                                         │
//! │  Sales are create-only: there is no update or delete path.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use bazaar_core::{Sale, SaleItem, SaleReceipt};

pub(crate) const SALE_COLUMNS: &str = "id, store_id, staff_id, customer_id, invoice_number, \
     sale_date, subtotal_cents, discount_cents, discount_rate_bps, taxable_cents, tax_rate_bps, \
     tax_cents, shipping_cents, grand_total_cents, amount_paid_cents, change_cents, \
     payment_method, payment_status, status, notes, created_at";

pub(crate) const SALE_ITEM_COLUMNS: &str = "id, sale_id, unit_id, sku_snapshot, name_snapshot, \
     unit_price_cents, quantity, line_total_cents, created_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets a sale by its invoice number.
    pub async fn get_by_invoice_number(&self, invoice_number: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE invoice_number = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(invoice_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets all items for a sale, in insertion order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let sql = format!(
            "SELECT {SALE_ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid"
        );
        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Gets a sale together with its items.
    pub async fn get_receipt(&self, id: &str) -> DbResult<Option<SaleReceipt>> {
        debug!(id = %id, "Loading sale receipt");

        let Some(sale) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.get_items(&sale.id).await?;

        Ok(Some(SaleReceipt { sale, items }))
    }

    /// Counts sales of one store.
    pub async fn count_for_store(&self, store_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE store_id = ?1")
            .bind(store_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts all sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}
