//! # Post-Commit Hooks
//!
//! Side effects that run after a sale has committed: activity log entry and
//! staff notifications.
//!
//! ## Isolation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  COMMIT ✓                                                               │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  HookDispatcher::dispatch(&SaleCommitted)                              │
//! │     │                                                                   │
//! │     ├── ActivityLogHook         ┐  each one wrapped in                 │
//! │     ├── StaffNotificationHook   ├─ timeout(hook_timeout)               │
//! │     └── ...                     ┘  + catch_unwind                      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  Err / panic / timeout → warn! and carry on                            │
//! │  The sale is already durable; the caller gets its receipt regardless.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use tracing::{debug, warn};

use bazaar_core::{ActingUser, Money, SaleReceipt};
use bazaar_db::{ActivityEntry, Database, Notification};

use crate::error::HookError;

// =============================================================================
// Event
// =============================================================================

/// Everything a hook may want to know about a committed sale.
#[derive(Debug, Clone)]
pub struct SaleCommitted {
    pub receipt: SaleReceipt,
    pub actor: ActingUser,
    pub store_name: String,
    pub committed_at: DateTime<Utc>,
}

impl SaleCommitted {
    fn summary(&self) -> String {
        let sale = &self.receipt.sale;
        format!(
            "Sale {} for {} ({} item{})",
            sale.invoice_number,
            Money::from_cents(sale.grand_total_cents),
            self.receipt.items.len(),
            if self.receipt.items.len() == 1 { "" } else { "s" }
        )
    }
}

// =============================================================================
// Hook Trait
// =============================================================================

/// A best-effort reaction to a committed sale.
pub trait PostCommitHook: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn on_sale_committed<'a>(
        &'a self,
        event: &'a SaleCommitted,
    ) -> BoxFuture<'a, Result<(), HookError>>;
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Result of one dispatch: which hooks failed and why.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub succeeded: usize,
    pub failed: Vec<(&'static str, HookError)>,
}

/// Runs every registered hook, isolated from each other and from the caller.
#[derive(Clone)]
pub struct HookDispatcher {
    hooks: Vec<Arc<dyn PostCommitHook>>,
    timeout: Duration,
}

impl std::fmt::Debug for HookDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookDispatcher")
            .field("hooks", &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HookDispatcher {
    pub fn new(timeout: Duration) -> Self {
        HookDispatcher {
            hooks: Vec::new(),
            timeout,
        }
    }

    /// The activity log and staff notification sinks.
    pub fn with_default_hooks(db: Database, timeout: Duration) -> Self {
        Self::new(timeout)
            .with_hook(Arc::new(ActivityLogHook::new(db.clone())))
            .with_hook(Arc::new(StaffNotificationHook::new(db)))
    }

    pub fn with_hook(mut self, hook: Arc<dyn PostCommitHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs all hooks concurrently. Never fails.
    pub async fn dispatch(&self, event: &SaleCommitted) -> DispatchReport {
        let runs = self.hooks.iter().map(|hook| self.run_one(hook.as_ref(), event));
        let results = join_all(runs).await;

        let mut report = DispatchReport::default();
        for (hook, result) in self.hooks.iter().zip(results) {
            match result {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    warn!(
                        hook = hook.name(),
                        sale_id = %event.receipt.sale.id,
                        error = %e,
                        "Post-commit hook failed"
                    );
                    report.failed.push((hook.name(), e));
                }
            }
        }

        debug!(
            succeeded = report.succeeded,
            failed = report.failed.len(),
            "Post-commit hooks dispatched"
        );
        report
    }

    async fn run_one(
        &self,
        hook: &dyn PostCommitHook,
        event: &SaleCommitted,
    ) -> Result<(), HookError> {
        // The call itself sits inside the guarded future so a panic while
        // building the hook's future is caught too.
        let guarded = AssertUnwindSafe(async move { hook.on_sale_committed(event).await })
            .catch_unwind();

        match tokio::time::timeout(self.timeout, guarded).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(HookError::Panicked(panic_message(panic.as_ref()))),
            Err(_) => Err(HookError::TimedOut {
                after_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// =============================================================================
// Activity Log
// =============================================================================

/// Writes a `sale.created` row to the activity log.
#[derive(Debug, Clone)]
pub struct ActivityLogHook {
    db: Database,
}

impl ActivityLogHook {
    pub fn new(db: Database) -> Self {
        ActivityLogHook { db }
    }
}

impl PostCommitHook for ActivityLogHook {
    fn name(&self) -> &'static str {
        "activity_log"
    }

    fn on_sale_committed<'a>(
        &'a self,
        event: &'a SaleCommitted,
    ) -> BoxFuture<'a, Result<(), HookError>> {
        async move {
            let sale = &event.receipt.sale;
            let entry = ActivityEntry::new(
                &sale.store_id,
                &event.actor.user_id,
                "sale.created",
                &sale.id,
                format!("{} created", event.summary()),
                event.committed_at,
            );
            self.db.activity().record(&entry).await?;
            Ok(())
        }
        .boxed()
    }
}

// =============================================================================
// Staff Notifications
// =============================================================================

/// Notifies every active staff member of the store except the seller.
#[derive(Debug, Clone)]
pub struct StaffNotificationHook {
    db: Database,
}

impl StaffNotificationHook {
    pub fn new(db: Database) -> Self {
        StaffNotificationHook { db }
    }
}

impl PostCommitHook for StaffNotificationHook {
    fn name(&self) -> &'static str {
        "staff_notification"
    }

    fn on_sale_committed<'a>(
        &'a self,
        event: &'a SaleCommitted,
    ) -> BoxFuture<'a, Result<(), HookError>> {
        async move {
            let sale = &event.receipt.sale;
            let recipients = self.db.staff().list_active_for_store(&sale.store_id).await?;

            let message = format!("New {} at {}", event.summary(), event.store_name);
            let notifications: Vec<Notification> = recipients
                .iter()
                .filter(|s| s.id != event.actor.user_id)
                .map(|s| {
                    Notification::unread(
                        &s.id,
                        &sale.store_id,
                        "sale_created",
                        &message,
                        event.committed_at,
                    )
                })
                .collect();

            self.db.notifications().create_many(&notifications).await?;
            Ok(())
        }
        .boxed()
    }
}
