//! Email log repository.
//!
//! The `product_reminder_email_log` table is append-only: the dispatcher
//! inserts one row per attempt and the prune job range-deletes by age.
//! Nothing ever updates a row in place.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use replenish_core::{EmailLogId, EmailStatus};

use super::RepositoryError;
use crate::models::{EmailLogEntry, NewEmailLogEntry};

/// Durable store for reminder dispatch attempts.
#[async_trait]
pub trait EmailLogStore: Send + Sync {
    /// Append one attempt. Returns the id the store assigned.
    async fn append(&self, entry: NewEmailLogEntry) -> Result<EmailLogId, RepositoryError>;

    /// Delete all entries with `sent_at` strictly before `cutoff`.
    /// Returns the exact number of rows deleted.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError>;

    /// Total number of entries currently in the log.
    async fn count(&self) -> Result<i64, RepositoryError>;
}

/// `PostgreSQL`-backed email log store.
#[derive(Clone)]
pub struct PgEmailLogStore {
    pool: PgPool,
}

impl PgEmailLogStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the most recent entries, newest first.
    ///
    /// Not used by the jobs themselves; operators inspect the log through
    /// this when diagnosing a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row holds an unknown status.
    pub async fn recent(&self, limit: i64) -> Result<Vec<EmailLogEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, EmailLogRow>(
            r"
            SELECT entity_id, customer_email, customer_name, product_name, email_status, sent_at
            FROM product_reminder_email_log
            ORDER BY sent_at DESC, entity_id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EmailLogEntry::try_from).collect()
    }
}

#[async_trait]
impl EmailLogStore for PgEmailLogStore {
    async fn append(&self, entry: NewEmailLogEntry) -> Result<EmailLogId, RepositoryError> {
        let id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO product_reminder_email_log
                (customer_email, customer_name, product_name, email_status, sent_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING entity_id
            ",
        )
        .bind(&entry.customer_email)
        .bind(&entry.customer_name)
        .bind(&entry.product_name)
        .bind(entry.status.as_str())
        .bind(entry.sent_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(EmailLogId::new(id))
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM product_reminder_email_log
            WHERE sent_at < $1
            ",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM product_reminder_email_log
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

/// Internal row type for email log queries.
#[derive(Debug, sqlx::FromRow)]
struct EmailLogRow {
    entity_id: i64,
    customer_email: String,
    customer_name: String,
    product_name: String,
    email_status: String,
    sent_at: DateTime<Utc>,
}

impl TryFrom<EmailLogRow> for EmailLogEntry {
    type Error = RepositoryError;

    fn try_from(row: EmailLogRow) -> Result<Self, Self::Error> {
        let status = EmailStatus::from_str_opt(&row.email_status).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "unknown email_status {:?} on entity {}",
                row.email_status, row.entity_id
            ))
        })?;

        Ok(Self {
            id: EmailLogId::new(row.entity_id),
            customer_email: row.customer_email,
            customer_name: row.customer_name,
            product_name: row.product_name,
            status,
            sent_at: row.sent_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(status: &str) -> EmailLogRow {
        EmailLogRow {
            entity_id: 1,
            customer_email: "a@x.com".into(),
            customer_name: "Ada".into(),
            product_name: "Tea".into(),
            email_status: status.into(),
            sent_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion_maps_status() {
        let entry = EmailLogEntry::try_from(row("sent")).unwrap();
        assert_eq!(entry.status, EmailStatus::Sent);
        assert_eq!(entry.id, EmailLogId::new(1));
    }

    #[test]
    fn test_row_conversion_rejects_unknown_status() {
        let err = EmailLogEntry::try_from(row("queued")).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
