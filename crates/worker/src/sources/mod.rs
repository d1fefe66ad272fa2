//! Read-only collaborators the reminder job joins over.
//!
//! The job needs three external datasets: recent orders, current catalog
//! snapshots, and current stock. Each is behind a trait so the pipeline can
//! be exercised against in-memory implementations; production wires up the
//! `PostgreSQL` implementations in [`pg`].

pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use replenish_core::{ProductId, StoreId};

use crate::db::RepositoryError;
use crate::models::{Order, ProductSnapshot, StockItem};

pub use pg::{PgOrderSource, PgProductSource, PgStockSource};

/// Order history access.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// All orders created at or after `cutoff`, oldest first, with their
    /// line items attached.
    async fn orders_created_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError>;
}

/// Catalog access.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// The current snapshot for one product in the given store scope, or
    /// `None` if the product no longer exists.
    async fn product(
        &self,
        id: ProductId,
        store: StoreId,
    ) -> Result<Option<ProductSnapshot>, RepositoryError>;
}

/// Inventory access.
#[async_trait]
pub trait StockSource: Send + Sync {
    /// The current stock record for one product, or `None` if inventory has
    /// no record for it. A missing record never counts as in stock.
    async fn stock(&self, id: ProductId) -> Result<Option<StockItem>, RepositoryError>;
}
