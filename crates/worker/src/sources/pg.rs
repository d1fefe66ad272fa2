//! `PostgreSQL` implementations of the collaborator traits.
//!
//! Queries are runtime-checked sqlx with explicit row structs. Product and
//! settings style lookups resolve store scope with a default-scope fallback:
//! a row for the requested store wins over the scope-0 row.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use replenish_core::{Email, OrderId, OrderItemId, ProductId, StoreId};

use crate::db::RepositoryError;
use crate::models::{Order, OrderItem, ProductSnapshot, StockItem};

use super::{OrderSource, ProductSource, StockSource};

/// Orders from the `sales_order` / `sales_order_item` tables.
#[derive(Clone)]
pub struct PgOrderSource {
    pool: PgPool,
}

impl PgOrderSource {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_email: Option<String>,
    customer_name: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    qty_ordered: i32,
    parent_item_id: Option<i32>,
}

#[async_trait]
impl OrderSource for PgOrderSource {
    async fn orders_created_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let order_rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_email, customer_name, created_at
            FROM sales_order
            WHERE created_at >= $1
            ORDER BY created_at, id
            ",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT i.id, i.order_id, i.product_id, i.qty_ordered, i.parent_item_id
            FROM sales_order_item i
            JOIN sales_order o ON o.id = i.order_id
            WHERE o.created_at >= $1
            ORDER BY i.order_id, i.id
            ",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            items_by_order
                .entry(row.order_id)
                .or_default()
                .push(OrderItem {
                    id: OrderItemId::new(row.id),
                    product_id: ProductId::new(row.product_id),
                    qty_ordered: row.qty_ordered,
                    parent_item_id: row.parent_item_id.map(OrderItemId::new),
                });
        }

        let orders = order_rows
            .into_iter()
            .map(|row| {
                let customer_email = row.customer_email.as_deref().and_then(|raw| {
                    match Email::parse(raw) {
                        Ok(email) => Some(email),
                        Err(e) => {
                            tracing::warn!(
                                order_id = row.id,
                                error = %e,
                                "order has unparseable customer email; treating as absent"
                            );
                            None
                        }
                    }
                });

                Order {
                    id: OrderId::new(row.id),
                    customer_email,
                    customer_name: row.customer_name.unwrap_or_default(),
                    created_at: row.created_at,
                    items: items_by_order.remove(&row.id).unwrap_or_default(),
                }
            })
            .collect();

        Ok(orders)
    }
}

/// Catalog snapshots from the `catalog_product` table.
#[derive(Clone)]
pub struct PgProductSource {
    pool: PgPool,
}

impl PgProductSource {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    price: Decimal,
    small_image: Option<String>,
    url: String,
    repurchase_reminder: bool,
}

#[async_trait]
impl ProductSource for PgProductSource {
    async fn product(
        &self,
        id: ProductId,
        store: StoreId,
    ) -> Result<Option<ProductSnapshot>, RepositoryError> {
        // Store-specific row wins over the default-scope row.
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, small_image, url, repurchase_reminder
            FROM catalog_product
            WHERE id = $1 AND store_id IN ($2, $3)
            ORDER BY store_id DESC
            LIMIT 1
            ",
        )
        .bind(id)
        .bind(StoreId::DEFAULT)
        .bind(store)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ProductSnapshot {
            id: ProductId::new(row.id),
            name: row.name,
            price: row.price,
            image: row.small_image,
            url: row.url,
            reminder_eligible: row.repurchase_reminder,
        }))
    }
}

/// Stock records from the `cataloginventory_stock_item` table.
#[derive(Clone)]
pub struct PgStockSource {
    pool: PgPool,
}

impl PgStockSource {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    qty: i64,
    is_in_stock: bool,
}

#[async_trait]
impl StockSource for PgStockSource {
    async fn stock(&self, id: ProductId) -> Result<Option<StockItem>, RepositoryError> {
        let row = sqlx::query_as::<_, StockRow>(
            r"
            SELECT qty, is_in_stock
            FROM cataloginventory_stock_item
            WHERE product_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| StockItem {
            in_stock: row.is_in_stock,
            qty: row.qty,
        }))
    }
}
