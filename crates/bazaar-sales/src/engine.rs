//! # Sale Engine
//!
//! `SaleEngine::create_sale` is the one write path for sales.
//!
//! ## Processing Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartRequest ──validate()──► ValidatedCart          (no I/O, 422)      │
//! │                                    │                                    │
//! │  ┌─────────── timeout(transaction_timeout) ─────────────────────────┐  │
//! │  │ BEGIN IMMEDIATE                 ▼                                 │  │
//! │  │  1. resolve store scope      → StoreNotFound / ValidationFailed  │  │
//! │  │  2. customer in store?       → ValidationFailed                  │  │
//! │  │  3. units in store, active   → ProductNotFoundInStore            │  │
//! │  │  4. stock check + pricing    → StockUnavailable (all lines)      │  │
//! │  │  5. totals                                                       │  │
//! │  │  6. invoice number           → InvoiceAllocationExhausted        │  │
//! │  │  7. insert sale, items; conditional decrements                   │  │
//! │  │     (any error or the deadline: ROLLBACK, nothing exists)        │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! │  8. COMMIT                   (awaited to completion, no deadline)      │
//! │                                    │                                    │
//! │  9. post-commit hooks (best-effort, never change the result)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use bazaar_core::{
    invoice_prefix, ActingUser, CartRequest, InvoiceNumber, PricedCart, Sale, SaleItem,
    SaleReceipt, SaleTotals, SellableUnit, StockShortage, Store, ValidatedCart, ValidationError,
};
use bazaar_db::repository::sale::{generate_sale_id, generate_sale_item_id};
use bazaar_db::{Database, SaleTransaction};

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{SaleError, SaleResult};
use crate::hooks::{HookDispatcher, SaleCommitted};

/// The sale engine.
///
/// ## Example
/// ```rust,ignore
/// let engine = SaleEngine::new(db.clone(), EngineConfig::default())
///     .with_hooks(HookDispatcher::with_default_hooks(db, Duration::from_secs(2)));
///
/// let receipt = engine.create_sale(&cart, &acting_user).await?;
/// println!("{}", receipt.sale.invoice_number);
/// ```
#[derive(Clone)]
pub struct SaleEngine {
    db: Database,
    clock: Arc<dyn Clock>,
    hooks: HookDispatcher,
    config: EngineConfig,
}

impl std::fmt::Debug for SaleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaleEngine")
            .field("hooks", &self.hooks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// What the unit of work hands back once every write is done.
struct Committed {
    receipt: SaleReceipt,
    store: Store,
}

impl SaleEngine {
    /// Creates an engine with the system clock and no hooks.
    pub fn new(db: Database, config: EngineConfig) -> Self {
        let hooks = HookDispatcher::new(config.hook_timeout());
        SaleEngine {
            db,
            clock: Arc::new(SystemClock),
            hooks,
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_hooks(mut self, hooks: HookDispatcher) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Validates, prices and commits a cart as one sale.
    ///
    /// ## Errors
    /// See [`SaleError`]. On any error no sale, item or stock change exists.
    pub async fn create_sale(
        &self,
        cart: &CartRequest,
        actor: &ActingUser,
    ) -> SaleResult<SaleReceipt> {
        let validated = cart.validate()?;
        let now = self.clock.now();

        debug!(
            user_id = %actor.user_id,
            role = ?actor.role,
            lines = validated.lines.len(),
            "Creating sale"
        );

        let timeout = self.config.transaction_timeout();
        let work = self.prepare_sale(&validated, actor, now);
        let (tx, committed) = match tokio::time::timeout(timeout, work).await {
            Ok(Ok(prepared)) => prepared,
            Ok(Err(e)) => {
                if let SaleError::Unexpected(msg) = &e {
                    error!(user_id = %actor.user_id, error = %msg, "Sale failed unexpectedly");
                } else {
                    debug!(kind = e.kind(), error = %e, "Sale rejected");
                }
                return Err(e);
            }
            Err(_) => {
                // Dropping the unit-of-work future dropped its transaction
                error!(
                    user_id = %actor.user_id,
                    timeout_secs = timeout.as_secs(),
                    "Sale transaction timed out"
                );
                return Err(SaleError::Unexpected(format!(
                    "sale transaction timed out after {}s",
                    timeout.as_secs()
                )));
            }
        };

        // Outside the deadline: a COMMIT that SQLite has started must be
        // reported as it finishes, not as a timeout.
        if let Err(e) = tx.commit().await {
            error!(user_id = %actor.user_id, error = %e, "Sale commit failed");
            return Err(e.into());
        }

        let sale = &committed.receipt.sale;
        info!(
            sale_id = %sale.id,
            invoice_number = %sale.invoice_number,
            store_id = %sale.store_id,
            grand_total_cents = sale.grand_total_cents,
            items = committed.receipt.items.len(),
            "Sale committed"
        );

        if !self.hooks.is_empty() {
            let event = SaleCommitted {
                receipt: committed.receipt.clone(),
                actor: actor.clone(),
                store_name: committed.store.name.clone(),
                committed_at: now,
            };
            self.hooks.dispatch(&event).await;
        }

        Ok(committed.receipt)
    }

    /// Opens the transaction and does every write, leaving it uncommitted.
    ///
    /// On error the transaction is rolled back. If the caller drops this
    /// future, the transaction is dropped and SQLite discards it.
    async fn prepare_sale(
        &self,
        cart: &ValidatedCart,
        actor: &ActingUser,
        now: DateTime<Utc>,
    ) -> SaleResult<(SaleTransaction, Committed)> {
        let mut tx = self.db.begin_sale().await?;

        match self.write_sale(&mut tx, cart, actor, now).await {
            Ok(committed) => Ok((tx, committed)),
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed; connection drop will discard the transaction");
                }
                Err(e)
            }
        }
    }

    async fn write_sale(
        &self,
        tx: &mut SaleTransaction,
        cart: &ValidatedCart,
        actor: &ActingUser,
        now: DateTime<Utc>,
    ) -> SaleResult<Committed> {
        // 1. Store scope
        let store = self.resolve_store(tx, cart.store_override.as_deref(), actor).await?;

        // 2. Customer
        if let Some(customer_id) = &cart.customer_id {
            if tx.find_customer_in_store(customer_id, &store.id).await?.is_none() {
                return Err(ValidationError::UnknownReference {
                    field: "customer_id".to_string(),
                    value: customer_id.clone(),
                }
                .into());
            }
        }

        // 3. Units
        let mut units: Vec<SellableUnit> = Vec::with_capacity(cart.lines.len());
        for unit_id in cart.unit_ids() {
            match tx.find_unit_in_store(unit_id, &store.id).await? {
                Some(unit) if unit.is_active => units.push(unit),
                _ => {
                    return Err(SaleError::ProductNotFoundInStore {
                        unit_id: unit_id.to_string(),
                        store_id: store.id.clone(),
                    })
                }
            }
        }

        // 4-5. Stock, prices, totals
        let priced = cart.price_against(&units)?;
        let totals = priced.totals(&cart.adjustments);

        // 6. Header with its invoice number
        let mut sale = build_sale(&store, cart, actor, &totals, now);
        self.insert_with_invoice_number(tx, &store, &mut sale).await?;

        // 7. Items and stock
        let items = build_items(&sale, &priced, now);
        for item in &items {
            tx.insert_sale_item(item).await?;
        }

        for (line, unit) in priced.lines.iter().zip(&units) {
            if !tx
                .decrement_if_available(&line.unit_id, &store.id, line.quantity, now)
                .await?
            {
                warn!(unit_id = %line.unit_id, "Conditional decrement refused after stock check");
                return Err(SaleError::StockUnavailable(vec![StockShortage {
                    unit_id: line.unit_id.clone(),
                    name: line.name.clone(),
                    requested: line.quantity,
                    available: unit.quantity_on_hand,
                }]));
            }
        }

        Ok(Committed {
            receipt: SaleReceipt { sale, items },
            store,
        })
    }

    /// Picks the store the sale belongs to.
    ///
    /// ## Rules
    /// ```text
    /// role    own store   override  →  store used
    /// ──────  ─────────   ────────     ─────────────────────────────
    /// admin   any         Some(x)      x (must exist)
    /// admin   Some(s)     None         s
    /// admin   None        None         ValidationFailed
    /// other   Some(s)     any          s (a differing override is ignored)
    /// other   None        any          ValidationFailed
    /// ```
    async fn resolve_store(
        &self,
        tx: &mut SaleTransaction,
        requested: Option<&str>,
        actor: &ActingUser,
    ) -> SaleResult<Store> {
        let store_id = match (requested, actor.store_id.as_deref()) {
            (Some(requested), _) if actor.role.can_override_store() => requested.to_string(),
            (requested, Some(own)) => {
                if let Some(requested) = requested.filter(|r| *r != own) {
                    warn!(
                        user_id = %actor.user_id,
                        role = ?actor.role,
                        own_store = %own,
                        requested_store = %requested,
                        "Ignoring store override from non-admin user"
                    );
                }
                own.to_string()
            }
            (_, None) => {
                let reason = if actor.role.can_override_store() {
                    "admin without a store must supply store_id"
                } else {
                    "user is not assigned to a store"
                };
                return Err(ValidationError::NoStoreScope {
                    reason: reason.to_string(),
                }
                .into());
            }
        };

        match tx.find_store(&store_id).await? {
            Some(store) if store.is_active => Ok(store),
            _ => Err(SaleError::StoreNotFound { store_id }),
        }
    }

    /// Allocates `PREFIX-YYMMDD-SEQ` and inserts the header under it.
    ///
    /// The first candidate is the store's own count for the day plus one.
    /// When it is taken (found, or the insert hits the UNIQUE index) the
    /// next candidate is the first number past the highest sequence any
    /// store has used under the same prefix and day.
    async fn insert_with_invoice_number(
        &self,
        tx: &mut SaleTransaction,
        store: &Store,
        sale: &mut Sale,
    ) -> SaleResult<()> {
        let existing = tx.count_sales_for_store_on(&store.id, sale.sale_date).await?;
        let existing = u32::try_from(existing).unwrap_or(u32::MAX);
        let mut candidate =
            InvoiceNumber::first_candidate(invoice_prefix(&store.name), sale.sale_date, existing);

        let limit = self.config.invoice_retry_limit;
        for attempt in 1..=limit {
            let number = candidate.to_string();

            if tx.invoice_number_exists(&number).await? {
                debug!(invoice_number = %number, attempt, "Invoice number taken");
                candidate = next_free_candidate(tx, &candidate).await?;
                continue;
            }

            sale.invoice_number = number;
            match tx.insert_sale(sale).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_unique_violation_on("sales.invoice_number") => {
                    warn!(invoice_number = %sale.invoice_number, attempt, "Invoice number collided on insert");
                    candidate = next_free_candidate(tx, &candidate).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(store_id = %store.id, attempts = limit, "Invoice number allocation exhausted");
        Err(SaleError::InvoiceAllocationExhausted { attempts: limit })
    }
}

async fn next_free_candidate(
    tx: &mut SaleTransaction,
    taken: &InvoiceNumber,
) -> SaleResult<InvoiceNumber> {
    let used = tx
        .max_invoice_sequence(&taken.stem())
        .await?
        .and_then(|seq| u32::try_from(seq).ok());
    Ok(taken.after(used))
}

fn build_sale(
    store: &Store,
    cart: &ValidatedCart,
    actor: &ActingUser,
    totals: &SaleTotals,
    now: DateTime<Utc>,
) -> Sale {
    Sale {
        id: generate_sale_id(),
        store_id: store.id.clone(),
        staff_id: actor.user_id.clone(),
        customer_id: cart.customer_id.clone(),
        invoice_number: String::new(),
        sale_date: now.date_naive(),
        subtotal_cents: totals.subtotal.cents(),
        discount_cents: totals.discount.cents(),
        discount_rate_bps: cart.adjustments.discount.and_then(|d| d.rate_bps()),
        taxable_cents: totals.taxable.cents(),
        tax_rate_bps: cart.adjustments.tax_rate.bps(),
        tax_cents: totals.tax.cents(),
        shipping_cents: totals.shipping.cents(),
        grand_total_cents: totals.grand_total.cents(),
        amount_paid_cents: totals.amount_paid.cents(),
        change_cents: totals.change.cents(),
        payment_method: cart.payment_method,
        payment_status: totals.payment_status(),
        status: cart.status,
        notes: cart.notes.clone(),
        created_at: now,
    }
}

fn build_items(sale: &Sale, priced: &PricedCart, now: DateTime<Utc>) -> Vec<SaleItem> {
    priced
        .lines
        .iter()
        .map(|line| SaleItem {
            id: generate_sale_item_id(),
            sale_id: sale.id.clone(),
            unit_id: line.unit_id.clone(),
            sku_snapshot: line.sku.clone(),
            name_snapshot: line.name.clone(),
            unit_price_cents: line.unit_price.cents(),
            quantity: line.quantity,
            line_total_cents: line.line_total.cents(),
            created_at: now,
        })
        .collect()
}
