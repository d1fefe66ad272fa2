//! Integration tests for Replenish.
//!
//! The reminder pipeline only touches the outside world through its
//! collaborator traits, so full runs are exercised here against in-memory
//! implementations: no database, no SMTP server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p replenish-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `reminder_run` - end-to-end reminder runs (eligibility, dedup, failure
//!   isolation)
//! - `retention` - email log pruning
//!
//! The [`Harness`] wires a [`replenish_worker::reminder::ReminderJob`] to
//! the in-memory collaborators and exposes the mailer and log for
//! assertions.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use replenish_core::{Email, EmailLogId, OrderId, OrderItemId, ProductId, StoreId};
use replenish_worker::db::{EmailLogStore, RepositoryError};
use replenish_worker::models::{
    EmailLogEntry, NewEmailLogEntry, Order, OrderItem, ProductSnapshot, StockItem,
};
use replenish_worker::reminder::{Dispatcher, ReminderJob, RunSummary, SenderIdentity};
use replenish_worker::services::email::{EmailError, MailTransport, ReminderEmail};
use replenish_worker::services::settings::{SettingsSource, parse_flag};
use replenish_worker::sources::{OrderSource, ProductSource, StockSource};

/// Store scope all tests run under.
pub const TEST_STORE: StoreId = StoreId::new(1);

// =============================================================================
// In-memory collaborators
// =============================================================================

/// Fixed set of orders; `orders_created_since` applies the cutoff.
pub struct InMemoryOrders(pub Vec<Order>);

#[async_trait]
impl OrderSource for InMemoryOrders {
    async fn orders_created_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .0
            .iter()
            .filter(|o| o.created_at >= cutoff)
            .cloned()
            .collect())
    }
}

/// Catalog keyed by product id; store scope is ignored.
pub struct InMemoryProducts(HashMap<ProductId, ProductSnapshot>);

impl InMemoryProducts {
    #[must_use]
    pub fn new(products: Vec<ProductSnapshot>) -> Self {
        Self(products.into_iter().map(|p| (p.id, p)).collect())
    }
}

#[async_trait]
impl ProductSource for InMemoryProducts {
    async fn product(
        &self,
        id: ProductId,
        _store: StoreId,
    ) -> Result<Option<ProductSnapshot>, RepositoryError> {
        Ok(self.0.get(&id).cloned())
    }
}

/// Stock keyed by product id.
pub struct InMemoryStock(HashMap<ProductId, StockItem>);

impl InMemoryStock {
    #[must_use]
    pub fn new(stock: Vec<(ProductId, StockItem)>) -> Self {
        Self(stock.into_iter().collect())
    }
}

#[async_trait]
impl StockSource for InMemoryStock {
    async fn stock(&self, id: ProductId) -> Result<Option<StockItem>, RepositoryError> {
        Ok(self.0.get(&id).copied())
    }
}

/// Settings as a flat path -> value map; store scope is ignored.
#[derive(Default)]
pub struct InMemorySettings {
    values: HashMap<String, String>,
}

impl InMemorySettings {
    /// Reminder job enabled with the given stock threshold and a support
    /// sender identity.
    #[must_use]
    pub fn enabled(threshold: i64) -> Self {
        let mut settings = Self::default();
        settings.set("product_reminder/settings/enable", "1");
        settings.set(
            "product_reminder/settings/stock_threshold",
            &threshold.to_string(),
        );
        settings.set("trans_email/ident_support/name", "Shop Support");
        settings.set("trans_email/ident_support/email", "reminders@example.com");
        settings
    }

    /// Reminder job disabled.
    #[must_use]
    pub fn disabled() -> Self {
        let mut settings = Self::default();
        settings.set("product_reminder/settings/enable", "0");
        settings
    }

    pub fn set(&mut self, path: &str, value: &str) {
        self.values.insert(path.to_string(), value.to_string());
    }
}

#[async_trait]
impl SettingsSource for InMemorySettings {
    async fn flag(&self, path: &str, _store: StoreId) -> Result<bool, RepositoryError> {
        Ok(parse_flag(self.values.get(path).map(String::as_str)))
    }

    async fn value(
        &self,
        path: &str,
        _store: StoreId,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(self.values.get(path).cloned())
    }
}

/// Transport double that records every message and can be told to reject
/// specific recipients.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<ReminderEmail>>,
    fail_for: Mutex<HashSet<String>>,
}

impl RecordingMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `address` fail.
    pub fn fail_for(&self, address: &str) {
        self.fail_for
            .lock()
            .expect("lock poisoned")
            .insert(address.to_string());
    }

    /// Messages the transport accepted, in send order.
    #[must_use]
    pub fn sent(&self) -> Vec<ReminderEmail> {
        self.sent.lock().expect("lock poisoned").clone()
    }

    /// Recipient addresses of accepted messages, in send order.
    #[must_use]
    pub fn recipients(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|e| e.to_address.to_string())
            .collect()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, email: &ReminderEmail) -> Result<(), EmailError> {
        let rejected = self
            .fail_for
            .lock()
            .expect("lock poisoned")
            .contains(email.to_address.as_str());
        if rejected {
            return Err(EmailError::Transport("recipient rejected".into()));
        }

        self.sent.lock().expect("lock poisoned").push(email.clone());
        Ok(())
    }
}

/// In-memory email log with store-assigned ids.
pub struct InMemoryEmailLog {
    entries: Mutex<Vec<EmailLogEntry>>,
    next_id: AtomicI64,
}

impl InMemoryEmailLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Pre-populate the log (for retention tests).
    #[must_use]
    pub fn seeded(rows: Vec<NewEmailLogEntry>) -> Self {
        let log = Self::new();
        {
            let mut entries = log.entries.lock().expect("lock poisoned");
            for row in rows {
                let id = log.next_id.fetch_add(1, Ordering::SeqCst);
                entries.push(EmailLogEntry {
                    id: EmailLogId::new(id),
                    customer_email: row.customer_email,
                    customer_name: row.customer_name,
                    product_name: row.product_name,
                    status: row.status,
                    sent_at: row.sent_at,
                });
            }
        }
        log
    }

    /// Snapshot of all entries, insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<EmailLogEntry> {
        self.entries.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl EmailLogStore for InMemoryEmailLog {
    async fn append(&self, entry: NewEmailLogEntry) -> Result<EmailLogId, RepositoryError> {
        let id = EmailLogId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.entries
            .lock()
            .expect("lock poisoned")
            .push(EmailLogEntry {
                id,
                customer_email: entry.customer_email,
                customer_name: entry.customer_name,
                product_name: entry.product_name,
                status: entry.status,
                sent_at: entry.sent_at,
            });
        Ok(id)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut entries = self.entries.lock().expect("lock poisoned");
        let before = entries.len();
        entries.retain(|e| e.sent_at >= cutoff);
        Ok((before - entries.len()) as u64)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self.entries.lock().expect("lock poisoned").len() as i64)
    }
}

// =============================================================================
// Fixture builders
// =============================================================================

/// An order created `days_ago` with one visible item per product id.
#[must_use]
pub fn order(id: i32, email: Option<&str>, days_ago: i64, product_ids: &[i32]) -> Order {
    Order {
        id: OrderId::new(id),
        customer_email: email.map(|e| Email::parse(e).expect("valid test email")),
        customer_name: "Ada Lovelace".to_string(),
        created_at: Utc::now() - Duration::days(days_ago),
        items: product_ids
            .iter()
            .enumerate()
            .map(|(i, product_id)| OrderItem {
                id: OrderItemId::new(id * 100 + i as i32),
                product_id: ProductId::new(*product_id),
                qty_ordered: 1,
                parent_item_id: None,
            })
            .collect(),
    }
}

/// A catalog snapshot with the given reminder flag.
#[must_use]
pub fn product(id: i32, name: &str, reminder_eligible: bool) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Decimal::new(2450, 2),
        image: Some(format!("/p/{id}.jpg")),
        url: format!("https://shop.example.com/p/{id}"),
        reminder_eligible,
    }
}

/// A stock record for `product_id`.
#[must_use]
pub fn stock(product_id: i32, qty: i64, in_stock: bool) -> (ProductId, StockItem) {
    (ProductId::new(product_id), StockItem { in_stock, qty })
}

// =============================================================================
// Harness
// =============================================================================

/// A reminder job wired to in-memory collaborators.
pub struct Harness {
    pub mailer: Arc<RecordingMailer>,
    pub log: Arc<InMemoryEmailLog>,
    job: ReminderJob,
}

impl Harness {
    #[must_use]
    pub fn new(
        orders: Vec<Order>,
        products: Vec<ProductSnapshot>,
        stock_items: Vec<(ProductId, StockItem)>,
        settings: InMemorySettings,
    ) -> Self {
        let settings: Arc<dyn SettingsSource> = Arc::new(settings);
        let mailer = Arc::new(RecordingMailer::new());
        let log = Arc::new(InMemoryEmailLog::new());

        let dispatcher = Dispatcher::new(
            Arc::clone(&mailer) as Arc<dyn MailTransport>,
            Arc::clone(&log) as Arc<dyn EmailLogStore>,
            Arc::clone(&settings),
            TEST_STORE,
            "https://cdn.example.com/media/".to_string(),
            SenderIdentity {
                name: "Customer Support".to_string(),
                email: "support@example.com".to_string(),
            },
        );

        let job = ReminderJob::new(
            settings,
            Arc::new(InMemoryOrders(orders)),
            Arc::new(InMemoryProducts::new(products)),
            Arc::new(InMemoryStock::new(stock_items)),
            dispatcher,
            TEST_STORE,
        );

        Self { mailer, log, job }
    }

    /// Execute one reminder run.
    pub async fn run(&self) -> RunSummary {
        self.job.execute().await
    }
}
