//! Fixtures for this crate's database tests.

use chrono::Utc;
use tempfile::TempDir;

use crate::repository::catalog::generate_unit_id;
use crate::repository::store::generate_store_id;
use crate::{Database, DbConfig};
use bazaar_core::{SellableUnit, Store};

/// A migrated database in a throwaway directory.
pub(crate) struct TestDb {
    pub db: Database,
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::new(DbConfig::new(dir.path().join("test.db")))
            .await
            .expect("database");
        TestDb { db, _dir: dir }
    }
}

pub(crate) async fn seed_store(db: &Database, name: &str) -> Store {
    let store = Store {
        id: generate_store_id(),
        name: name.to_string(),
        is_active: true,
        created_at: Utc::now(),
    };
    db.stores().insert(&store).await.expect("insert store");
    store
}

pub(crate) async fn seed_unit(
    db: &Database,
    store_id: &str,
    name: &str,
    price_cents: i64,
    quantity_on_hand: i64,
) -> SellableUnit {
    let now = Utc::now();
    let id = generate_unit_id();
    let unit = SellableUnit {
        sku: format!("SKU-{}", &id[..8]),
        id,
        store_id: store_id.to_string(),
        parent_product_id: None,
        name: name.to_string(),
        variant_label: None,
        price_cents,
        quantity_on_hand,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.catalog().insert(&unit).await.expect("insert unit");
    unit
}
