//! # Seed Data Generator
//!
//! Populates the database with stores, staff, customers and a catalog for
//! local development.
//!
//! ## Usage
//! ```bash
//! cargo run -p bazaar-db --bin seed
//!
//! # Specify database path and units per store
//! cargo run -p bazaar-db --bin seed -- --db ./data/bazaar.db --units 40
//! ```
//!
//! ## Generated Data
//! - Three stores; "Acme Store" and "Acme Outlet" share the `ACM` invoice
//!   prefix on purpose
//! - One unscoped admin, plus a manager and a cashier per store
//! - A handful of customers per store
//! - Products with size variants: `{STORE}-{PRODUCT}-{SIZE}` SKUs

use anyhow::Context;
use chrono::Utc;
use std::env;
use uuid::Uuid;

use bazaar_core::{Customer, Role, SellableUnit, StaffMember, Store};
use bazaar_db::{Database, DbConfig};

const STORES: &[&str] = &["Acme Store", "Acme Outlet", "Bolt Mart"];

/// Base products: (name, base price in cents)
const PRODUCTS: &[(&str, i64)] = &[
    ("T-Shirt", 1999),
    ("Hoodie", 4999),
    ("Cap", 1499),
    ("Socks", 599),
    ("Tote Bag", 1299),
    ("Water Bottle", 1799),
    ("Notebook", 899),
    ("Sticker Pack", 399),
];

/// Variant labels and price add-ons
const SIZES: &[(&str, i64)] = &[("Small", 0), ("Medium", 100), ("Large", 200), ("XL", 350)];

const CUSTOMERS: &[&str] = &["Ayesha Khan", "Bilal Ahmed", "Chen Wei", "Dana Flores"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut units_per_store: usize = PRODUCTS.len() * SIZES.len();
    let mut db_path = String::from("./bazaar_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--units" | "-u" => {
                if i + 1 < args.len() {
                    units_per_store = args[i + 1]
                        .parse()
                        .with_context(|| format!("invalid --units value '{}'", args[i + 1]))?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bazaar POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -u, --units <N>    Sellable units per store (default: all variants)");
                println!("  -d, --db <PATH>    Database file path (default: ./bazaar_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => anyhow::bail!("unknown argument '{}'", other),
        }
        i += 1;
    }

    println!("🌱 Bazaar POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("failed to open database")?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.stores().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} stores", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    let admin = StaffMember {
        id: Uuid::new_v4().to_string(),
        name: "Head Office Admin".to_string(),
        role: Role::Admin,
        store_id: None,
        is_active: true,
    };
    db.staff().insert(&admin).await?;
    println!("✓ Admin: {}", admin.id);

    for (store_idx, store_name) in STORES.iter().enumerate() {
        let store = Store {
            id: Uuid::new_v4().to_string(),
            name: store_name.to_string(),
            is_active: true,
            created_at: now,
        };
        db.stores().insert(&store).await?;

        println!();
        println!("Store '{}' ({})", store.name, store.id);

        for (role, label) in [(Role::Manager, "Manager"), (Role::Cashier, "Cashier")] {
            let staff = StaffMember {
                id: Uuid::new_v4().to_string(),
                name: format!("{} {}", store.name, label),
                role,
                store_id: Some(store.id.clone()),
                is_active: true,
            };
            db.staff().insert(&staff).await?;
            println!("  {:<8} {}", label, staff.id);
        }

        for name in CUSTOMERS {
            db.customers()
                .insert(&Customer {
                    id: Uuid::new_v4().to_string(),
                    store_id: store.id.clone(),
                    name: name.to_string(),
                    email: None,
                    phone: None,
                    created_at: now,
                })
                .await?;
        }

        let mut generated = 0;
        'products: for (product_idx, (product_name, base_price)) in PRODUCTS.iter().enumerate() {
            let parent_id = Uuid::new_v4().to_string();
            for (size_idx, (size, addon)) in SIZES.iter().enumerate() {
                if generated >= units_per_store {
                    break 'products;
                }

                let seed = store_idx * 1000 + product_idx * 10 + size_idx;
                let unit = generate_unit(
                    &store,
                    // First variant stands in for the parent product
                    if size_idx == 0 { None } else { Some(&parent_id) },
                    if size_idx == 0 { Some(&parent_id) } else { None },
                    product_name,
                    size,
                    base_price + addon,
                    seed,
                );

                if let Err(e) = db.catalog().insert(&unit).await {
                    eprintln!("Failed to insert {}: {}", unit.sku, e);
                    continue;
                }
                generated += 1;
            }
        }
        println!("  ✓ {} customers, {} units", CUSTOMERS.len(), generated);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one sellable unit.
///
/// `parent` is set for variants; `own_id` forces the id of the row that
/// variants point at.
fn generate_unit(
    store: &Store,
    parent: Option<&String>,
    own_id: Option<&String>,
    name: &str,
    size: &str,
    price_cents: i64,
    seed: usize,
) -> SellableUnit {
    let now = Utc::now();

    let store_code = bazaar_core::invoice_prefix(&store.name);
    let product_code: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(4)
        .collect::<String>()
        .to_uppercase();
    let sku = format!("{}{}-{}-{}", store_code, seed / 1000, product_code, size.to_uppercase());

    SellableUnit {
        id: own_id.cloned().unwrap_or_else(|| Uuid::new_v4().to_string()),
        store_id: store.id.clone(),
        parent_product_id: parent.cloned(),
        sku,
        name: name.to_string(),
        variant_label: Some(size.to_string()),
        price_cents,
        // Stock 0 - 24, some units deliberately sold out
        quantity_on_hand: ((seed * 7) % 25) as i64,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
