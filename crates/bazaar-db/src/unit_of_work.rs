//! # Sale Unit of Work
//!
//! `SaleTransaction` wraps one SQLite write transaction and exposes exactly
//! the operations the sale engine needs to turn a cart into a committed sale.
//!
//! ## Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN IMMEDIATE        ← write lock taken up front; other writers     │
//! │       │                   wait on busy_timeout instead of failing      │
//! │       ▼                   with SQLITE_BUSY at their first write        │
//! │  find_store / find_unit_in_store / find_customer_in_store             │
//! │       │                                                                 │
//! │  count_sales_for_store_on → invoice_number_exists → insert_sale        │
//! │       │                                                                 │
//! │  insert_sale_item × N                                                  │
//! │       │                                                                 │
//! │  decrement_if_available × N                                            │
//! │     UPDATE … SET quantity_on_hand = quantity_on_hand - ?               │
//! │     WHERE … AND quantity_on_hand >= ?       (rows_affected checked)    │
//! │       │                                                                 │
//! │  COMMIT  (or ROLLBACK; dropping the value also rolls back)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::catalog::UNIT_COLUMNS;
use crate::repository::customer::CUSTOMER_COLUMNS;
use crate::repository::store::STORE_COLUMNS;
use bazaar_core::{Customer, Sale, SaleItem, SellableUnit, Store};

/// One open sale transaction.
///
/// Dropping it without calling [`commit`](Self::commit) rolls back.
pub struct SaleTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl std::fmt::Debug for SaleTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaleTransaction").finish_non_exhaustive()
    }
}

impl SaleTransaction {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        SaleTransaction { tx }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Finds a store by ID (active or not).
    pub async fn find_store(&mut self, store_id: &str) -> DbResult<Option<Store>> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = ?1");
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(store_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(store)
    }

    /// Finds a unit that belongs to the given store.
    ///
    /// Units of other stores are indistinguishable from missing ones.
    pub async fn find_unit_in_store(
        &mut self,
        unit_id: &str,
        store_id: &str,
    ) -> DbResult<Option<SellableUnit>> {
        let sql =
            format!("SELECT {UNIT_COLUMNS} FROM sellable_units WHERE id = ?1 AND store_id = ?2");
        let unit = sqlx::query_as::<_, SellableUnit>(&sql)
            .bind(unit_id)
            .bind(store_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(unit)
    }

    /// Finds a customer that belongs to the given store.
    pub async fn find_customer_in_store(
        &mut self,
        customer_id: &str,
        store_id: &str,
    ) -> DbResult<Option<Customer>> {
        let sql =
            format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1 AND store_id = ?2");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(customer_id)
            .bind(store_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(customer)
    }

    /// Number of sales a store already has on a business date.
    pub async fn count_sales_for_store_on(
        &mut self,
        store_id: &str,
        sale_date: NaiveDate,
    ) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE store_id = ?1 AND sale_date = ?2")
                .bind(store_id)
                .bind(sale_date)
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(count)
    }

    /// True if any sale (of any store) already uses this invoice number.
    pub async fn invoice_number_exists(&mut self, invoice_number: &str) -> DbResult<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sales WHERE invoice_number = ?1)")
                .bind(invoice_number)
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(exists != 0)
    }

    /// Highest sequence any store has used under `stem` (`PREFIX-YYMMDD-`).
    ///
    /// Stores whose names share a prefix draw from the same sequence space,
    /// so this is the floor for the next free number.
    pub async fn max_invoice_sequence(&mut self, stem: &str) -> DbResult<Option<i64>> {
        let max: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT MAX(CAST(substr(invoice_number, ?2) AS INTEGER))
            FROM sales
            WHERE invoice_number LIKE ?1 || '%'
            "#,
        )
        .bind(stem)
        .bind(stem.len() as i64 + 1)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(max)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts the sale header.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` on `sales.invoice_number` if another
    ///   writer took the number; the transaction stays usable.
    pub async fn insert_sale(&mut self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, invoice_number = %sale.invoice_number, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, store_id, staff_id, customer_id, invoice_number, sale_date,
                subtotal_cents, discount_cents, discount_rate_bps, taxable_cents,
                tax_rate_bps, tax_cents, shipping_cents, grand_total_cents,
                amount_paid_cents, change_cents,
                payment_method, payment_status, status, notes, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14,
                ?15, ?16,
                ?17, ?18, ?19, ?20, ?21
            )
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.store_id)
        .bind(&sale.staff_id)
        .bind(&sale.customer_id)
        .bind(&sale.invoice_number)
        .bind(sale.sale_date)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.discount_rate_bps)
        .bind(sale.taxable_cents)
        .bind(sale.tax_rate_bps)
        .bind(sale.tax_cents)
        .bind(sale.shipping_cents)
        .bind(sale.grand_total_cents)
        .bind(sale.amount_paid_cents)
        .bind(sale.change_cents)
        .bind(sale.payment_method)
        .bind(sale.payment_status)
        .bind(sale.status)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, sale.invoice_number.clone())
            }
            other => other,
        })?;

        Ok(())
    }

    /// Inserts one sale item.
    ///
    /// ## Snapshot Pattern
    /// SKU, name and unit price are copied onto the item so later catalog
    /// edits never change a past sale.
    pub async fn insert_sale_item(&mut self, item: &SaleItem) -> DbResult<()> {
        debug!(sale_id = %item.sale_id, unit_id = %item.unit_id, "Inserting sale item");

        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, unit_id,
                sku_snapshot, name_snapshot, unit_price_cents,
                quantity, line_total_cents, created_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6,
                ?7, ?8, ?9
            )
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.unit_id)
        .bind(&item.sku_snapshot)
        .bind(&item.name_snapshot)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(item.line_total_cents)
        .bind(item.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    /// Takes `quantity` from stock only if at least that much is on hand.
    ///
    /// ## Returns
    /// * `Ok(true)` - decremented
    /// * `Ok(false)` - not enough stock (or the unit left the store); nothing changed
    pub async fn decrement_if_available(
        &mut self,
        unit_id: &str,
        store_id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sellable_units
            SET quantity_on_hand = quantity_on_hand - ?3,
                updated_at = ?4
            WHERE id = ?1
              AND store_id = ?2
              AND quantity_on_hand >= ?3
            "#,
        )
        .bind(unit_id)
        .bind(store_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *self.tx)
        .await?;

        let decremented = result.rows_affected() == 1;
        debug!(unit_id = %unit_id, quantity, decremented, "Conditional stock decrement");
        Ok(decremented)
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Commits every write made through this transaction.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))
    }

    /// Rolls back every write made through this transaction.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_store, seed_unit, TestDb};
    use bazaar_core::{PaymentMethod, PaymentStatus, SaleStatus};

    fn sale(store_id: &str, invoice_number: &str, date: NaiveDate) -> Sale {
        Sale {
            id: uuid::Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            staff_id: "staff-1".to_string(),
            customer_id: None,
            invoice_number: invoice_number.to_string(),
            sale_date: date,
            subtotal_cents: 1000,
            discount_cents: 0,
            discount_rate_bps: None,
            taxable_cents: 1000,
            tax_rate_bps: 0,
            tax_cents: 0,
            shipping_cents: 0,
            grand_total_cents: 1000,
            amount_paid_cents: 1000,
            change_cents: 0,
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Paid,
            status: SaleStatus::Completed,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[tokio::test]
    async fn test_conditional_decrement() {
        let t = TestDb::new().await;
        let store = seed_store(&t.db, "Acme Store").await;
        let unit = seed_unit(&t.db, &store.id, "Widget", 5000, 3).await;

        let mut tx = t.db.begin_sale().await.unwrap();
        assert!(tx
            .decrement_if_available(&unit.id, &store.id, 2, Utc::now())
            .await
            .unwrap());
        // Only 1 left
        assert!(!tx
            .decrement_if_available(&unit.id, &store.id, 2, Utc::now())
            .await
            .unwrap());
        // Wrong store never matches
        assert!(!tx
            .decrement_if_available(&unit.id, "other-store", 1, Utc::now())
            .await
            .unwrap());
        tx.commit().await.unwrap();

        assert_eq!(t.db.catalog().quantity_on_hand(&unit.id).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let t = TestDb::new().await;
        let store = seed_store(&t.db, "Acme Store").await;
        let unit = seed_unit(&t.db, &store.id, "Widget", 5000, 3).await;

        let mut tx = t.db.begin_sale().await.unwrap();
        tx.insert_sale(&sale(&store.id, "ACM-240309-0001", day()))
            .await
            .unwrap();
        tx.decrement_if_available(&unit.id, &store.id, 3, Utc::now())
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(t.db.sales().count().await.unwrap(), 0);
        assert_eq!(t.db.catalog().quantity_on_hand(&unit.id).await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let t = TestDb::new().await;
        let store = seed_store(&t.db, "Acme Store").await;

        {
            let mut tx = t.db.begin_sale().await.unwrap();
            tx.insert_sale(&sale(&store.id, "ACM-240309-0001", day()))
                .await
                .unwrap();
        }

        assert_eq!(t.db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_invoice_number_is_unique_violation() {
        let t = TestDb::new().await;
        let store = seed_store(&t.db, "Acme Store").await;

        let mut tx = t.db.begin_sale().await.unwrap();
        tx.insert_sale(&sale(&store.id, "ACM-240309-0001", day()))
            .await
            .unwrap();
        assert!(tx.invoice_number_exists("ACM-240309-0001").await.unwrap());
        assert!(!tx.invoice_number_exists("ACM-240309-0002").await.unwrap());

        let err = tx
            .insert_sale(&sale(&store.id, "ACM-240309-0001", day()))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation_on("sales.invoice_number"));

        // The statement failed, the transaction did not
        tx.insert_sale(&sale(&store.id, "ACM-240309-0002", day()))
            .await
            .unwrap();
        assert_eq!(tx.count_sales_for_store_on(&store.id, day()).await.unwrap(), 2);
        tx.commit().await.unwrap();

        assert_eq!(t.db.sales().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_max_invoice_sequence_spans_stores() {
        let t = TestDb::new().await;
        let acme = seed_store(&t.db, "Acme Store").await;
        let outlet = seed_store(&t.db, "Acme Outlet").await;

        let mut tx = t.db.begin_sale().await.unwrap();
        assert_eq!(tx.max_invoice_sequence("ACM-240309-").await.unwrap(), None);

        for (store, number) in [
            (&acme, "ACM-240309-0001"),
            (&acme, "ACM-240309-0002"),
            (&outlet, "ACM-240309-0007"),
            (&acme, "ACM-240310-0042"),
        ] {
            tx.insert_sale(&sale(&store.id, number, day())).await.unwrap();
        }

        assert_eq!(tx.max_invoice_sequence("ACM-240309-").await.unwrap(), Some(7));
        assert_eq!(tx.max_invoice_sequence("ACM-240310-").await.unwrap(), Some(42));
        assert_eq!(tx.max_invoice_sequence("BOL-240309-").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_unit_is_store_scoped() {
        let t = TestDb::new().await;
        let a = seed_store(&t.db, "Acme Store").await;
        let b = seed_store(&t.db, "Bolt Mart").await;
        let unit = seed_unit(&t.db, &a.id, "Widget", 5000, 3).await;

        let mut tx = t.db.begin_sale().await.unwrap();
        assert!(tx.find_unit_in_store(&unit.id, &a.id).await.unwrap().is_some());
        assert!(tx.find_unit_in_store(&unit.id, &b.id).await.unwrap().is_none());
        assert!(tx.find_store(&b.id).await.unwrap().is_some());
        assert!(tx.find_store("nope").await.unwrap().is_none());
    }
}
