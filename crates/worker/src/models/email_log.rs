//! Email log rows - the durable audit trail of reminder dispatches.

use chrono::{DateTime, Utc};

use replenish_core::{EmailLogId, EmailStatus};

/// A persisted email log row.
///
/// Append-only: rows are never mutated after insertion and are removed only
/// by the retention prune job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailLogEntry {
    pub id: EmailLogId,
    pub customer_email: String,
    pub customer_name: String,
    pub product_name: String,
    pub status: EmailStatus,
    pub sent_at: DateTime<Utc>,
}

/// A log row about to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewEmailLogEntry {
    pub customer_email: String,
    pub customer_name: String,
    pub product_name: String,
    pub status: EmailStatus,
    pub sent_at: DateTime<Utc>,
}
