//! Email log retention pruning.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use replenish_core::{EmailLogId, EmailStatus};
use replenish_integration_tests::InMemoryEmailLog;
use replenish_worker::db::{EmailLogStore, RepositoryError};
use replenish_worker::models::NewEmailLogEntry;
use replenish_worker::reminder::PruneJob;

fn entry(days_ago: i64) -> NewEmailLogEntry {
    NewEmailLogEntry {
        customer_email: "a@x.com".to_string(),
        customer_name: "Ada Lovelace".to_string(),
        product_name: "Green Tea".to_string(),
        status: EmailStatus::Sent,
        sent_at: Utc::now() - Duration::days(days_ago),
    }
}

#[tokio::test]
async fn prune_deletes_only_entries_older_than_the_window() {
    // 7-day retention: the 8- and 10-day-old rows go, the 6-day-old stays.
    let log = Arc::new(InMemoryEmailLog::seeded(vec![
        entry(10),
        entry(8),
        entry(6),
    ]));

    let deleted = PruneJob::new(Arc::clone(&log) as Arc<dyn EmailLogStore>)
        .execute()
        .await;

    assert_eq!(deleted, 2);
    let remaining = log.entries();
    assert_eq!(remaining.len(), 1);
    let kept = remaining.first().expect("one entry");
    assert!(kept.sent_at >= Utc::now() - Duration::days(7));
}

#[tokio::test]
async fn prune_keeps_entries_inside_the_window() {
    let log = Arc::new(InMemoryEmailLog::seeded(vec![entry(6), entry(1), entry(0)]));

    let deleted = PruneJob::new(Arc::clone(&log) as Arc<dyn EmailLogStore>)
        .execute()
        .await;

    assert_eq!(deleted, 0);
    assert_eq!(log.entries().len(), 3);
}

#[tokio::test]
async fn prune_on_empty_log_deletes_nothing() {
    let log = Arc::new(InMemoryEmailLog::new());

    let deleted = PruneJob::new(Arc::clone(&log) as Arc<dyn EmailLogStore>)
        .execute()
        .await;

    assert_eq!(deleted, 0);
    assert!(log.entries().is_empty());
}

/// Store double whose delete always fails.
struct BrokenLog;

#[async_trait]
impl EmailLogStore for BrokenLog {
    async fn append(&self, _entry: NewEmailLogEntry) -> Result<EmailLogId, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".into()))
    }

    async fn delete_older_than(
        &self,
        _cutoff: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".into()))
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".into()))
    }
}

#[tokio::test]
async fn prune_swallows_storage_failures() {
    // The scheduler must never see the error; the job reports zero deleted.
    let deleted = PruneJob::new(Arc::new(BrokenLog)).execute().await;
    assert_eq!(deleted, 0);
}
