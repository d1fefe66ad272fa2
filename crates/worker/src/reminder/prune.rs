//! Retention pruning for the email log.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::db::EmailLogStore;

/// Email log entries older than this many days are deleted.
pub const RETENTION_DAYS: i64 = 7;

/// Scheduled job that ages out old email log rows.
///
/// Runs independently of the reminder job against the same store. Storage
/// failures are logged and swallowed; the scheduler never sees an error.
pub struct PruneJob {
    log: Arc<dyn EmailLogStore>,
}

impl PruneJob {
    #[must_use]
    pub fn new(log: Arc<dyn EmailLogStore>) -> Self {
        Self { log }
    }

    /// Delete entries with `sent_at` strictly before now minus the
    /// retention window. Returns the number deleted (0 on failure).
    pub async fn execute(&self) -> u64 {
        tracing::info!("email log cleanup started");

        let cutoff = Utc::now() - Duration::days(RETENTION_DAYS);

        match self.log.delete_older_than(cutoff).await {
            Ok(0) => {
                tracing::info!("no old email log entries to delete");
                0
            }
            Ok(deleted) => {
                tracing::info!(deleted, cutoff = %cutoff, "deleted old email log entries");
                deleted
            }
            Err(e) => {
                tracing::error!(error = %e, "email log cleanup failed");
                0
            }
        }
    }
}
