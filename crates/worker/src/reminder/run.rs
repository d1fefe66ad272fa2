//! The reminder run orchestrator.

use std::sync::Arc;

use chrono::{Duration, Utc};

use replenish_core::StoreId;

use crate::services::settings::SettingsSource;
use crate::sources::{OrderSource, ProductSource, StockSource};

use super::dedup::DedupTracker;
use super::dispatch::{DispatchOutcome, Dispatcher};
use super::evaluate::{EvalOutcome, Evaluator};

/// Orders older than this many days are not scanned.
pub const ORDER_WINDOW_DAYS: i64 = 180;

/// Settings path for the enable/disable flag.
const ENABLE_PATH: &str = "product_reminder/settings/enable";
/// Settings path for the stock threshold.
const STOCK_THRESHOLD_PATH: &str = "product_reminder/settings/stock_threshold";

/// Aggregate outcome of one run, surfaced through logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Reminders the transport accepted.
    pub sent: u32,
    /// Dispatch attempts that failed (transport error or timeout).
    pub failed: u32,
    /// Items (or email-less orders) that did not qualify.
    pub skipped: u32,
    /// Candidates suppressed because their (product, customer) pair was
    /// already handled earlier in this run.
    pub deduplicated: u32,
}

/// One full reminder execution:
/// `LoadConfig -> FetchOrderWindow -> Evaluate -> Dedup -> Dispatch`.
///
/// Single linear pass, no retries. Every failure is contained: per-item
/// problems are counted and skipped, and a failure to fetch the order
/// window ends the run with whatever was processed so far. `execute` never
/// returns an error - the scheduler only observes logs and the audit table.
pub struct ReminderJob {
    settings: Arc<dyn SettingsSource>,
    orders: Arc<dyn OrderSource>,
    products: Arc<dyn ProductSource>,
    stock: Arc<dyn StockSource>,
    dispatcher: Dispatcher,
    store: StoreId,
}

impl ReminderJob {
    #[must_use]
    pub fn new(
        settings: Arc<dyn SettingsSource>,
        orders: Arc<dyn OrderSource>,
        products: Arc<dyn ProductSource>,
        stock: Arc<dyn StockSource>,
        dispatcher: Dispatcher,
        store: StoreId,
    ) -> Self {
        Self {
            settings,
            orders,
            products,
            stock,
            dispatcher,
            store,
        }
    }

    /// Execute one run and return its summary.
    pub async fn execute(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        if !self.enabled().await {
            tracing::info!("reminder job disabled via configuration");
            return summary;
        }

        let threshold = self.stock_threshold().await;
        let cutoff = Utc::now() - Duration::days(ORDER_WINDOW_DAYS);

        let orders = match self.orders.orders_created_since(cutoff).await {
            Ok(orders) => orders,
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch order window; ending run");
                return summary;
            }
        };

        tracing::info!(
            orders = orders.len(),
            threshold,
            window_days = ORDER_WINDOW_DAYS,
            "reminder run started"
        );

        // Run-scoped state: both are dropped when this run ends.
        let mut dedup = DedupTracker::new();
        let evaluator = Evaluator::new(
            Arc::clone(&self.products),
            Arc::clone(&self.stock),
            self.store,
            threshold,
        );

        for order in &orders {
            let Some(email) = &order.customer_email else {
                // No recipient means the whole order is skipped, regardless
                // of item eligibility.
                summary.skipped += 1;
                continue;
            };

            for item in order.visible_items() {
                match evaluator.evaluate(order, email, item).await {
                    EvalOutcome::Skip(reason) => {
                        tracing::debug!(
                            order_id = %order.id,
                            product_id = %item.product_id,
                            ?reason,
                            "item skipped"
                        );
                        summary.skipped += 1;
                    }
                    EvalOutcome::Eligible(candidate) => {
                        if !dedup.admit(candidate.dedup_key()) {
                            summary.deduplicated += 1;
                            continue;
                        }

                        match self.dispatcher.dispatch(&candidate).await {
                            DispatchOutcome::Sent => summary.sent += 1,
                            DispatchOutcome::Failed(_) => summary.failed += 1,
                        }
                    }
                }
            }
        }

        tracing::info!(
            sent = summary.sent,
            failed = summary.failed,
            skipped = summary.skipped,
            deduplicated = summary.deduplicated,
            "reminder run complete"
        );

        summary
    }

    /// Read the enable flag; missing or failing configuration counts as
    /// disabled, never as an error.
    async fn enabled(&self) -> bool {
        match self.settings.flag(ENABLE_PATH, self.store).await {
            Ok(enabled) => enabled,
            Err(e) => {
                tracing::warn!(error = %e, "could not read enable flag; treating as disabled");
                false
            }
        }
    }

    /// Read the stock threshold; missing or unparseable values fall back to
    /// 0, which makes nothing eligible until the threshold is configured.
    async fn stock_threshold(&self) -> i64 {
        match self.settings.value(STOCK_THRESHOLD_PATH, self.store).await {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid stock threshold; using 0");
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stock threshold; using 0");
                0
            }
        }
    }
}
