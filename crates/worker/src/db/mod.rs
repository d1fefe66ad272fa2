//! Database access for the worker's `PostgreSQL` database.
//!
//! # Tables
//!
//! - `sales_order` / `sales_order_item` - order history scanned by the job
//! - `catalog_product` - catalog snapshots (price, image, reminder flag)
//! - `cataloginventory_stock_item` - per-product stock state
//! - `store_settings` - store-scoped key/value configuration
//! - `product_reminder_email_log` - the append-only dispatch audit trail
//!
//! # Migrations
//!
//! Migrations live in `crates/worker/migrations/` and run via:
//! ```bash
//! cargo run -p replenish-cli -- migrate
//! ```
//!
//! Queries use the runtime-checked sqlx API with explicit row structs so the
//! crate builds without a live database.

pub mod email_log;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use email_log::{EmailLogStore, PgEmailLogStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// The backing store refused the operation (used by test doubles and
    /// non-Postgres implementations).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
