//! Eligibility evaluation for one order item.

use std::sync::Arc;

use rust_decimal::Decimal;

use replenish_core::{Email, ProductId, StoreId};

use crate::models::{Order, OrderItem};
use crate::sources::{ProductSource, StockSource};

use super::dedup::DedupKey;

/// A qualifying (product, customer) pair with everything the dispatcher
/// needs to render the email. Ephemeral: produced here, consumed by the
/// dispatcher, never persisted.
#[derive(Debug, Clone)]
pub struct ReminderCandidate {
    pub product_id: ProductId,
    pub customer_email: Email,
    pub customer_name: String,
    pub product_name: String,
    pub product_price: Decimal,
    pub product_url: String,
    pub product_image: Option<String>,
}

impl ReminderCandidate {
    /// The per-run dedup identity of this candidate.
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            product_id: self.product_id,
            customer_email: self.customer_email.clone(),
        }
    }
}

/// Why an item did not qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The product no longer exists in the catalog.
    ProductMissing,
    /// The catalog lookup itself failed.
    ProductLookupFailed,
    /// The product does not participate in repurchase reminders.
    NotReminderEligible,
    /// Inventory has no record for the product.
    NoStockRecord,
    /// The stock lookup itself failed.
    StockLookupFailed,
    /// The product is marked out of stock.
    OutOfStock,
    /// Stock is above the reminder threshold.
    AboveThreshold,
}

/// Result of evaluating one order item.
#[derive(Debug, Clone)]
pub enum EvalOutcome {
    Eligible(ReminderCandidate),
    Skip(SkipReason),
}

/// Decides which order items qualify for a reminder.
///
/// Pure decision over the supplied lookups: the only side effects are the
/// product and stock reads themselves. Lookup failures degrade to skips so
/// one bad item never aborts a run.
pub struct Evaluator {
    products: Arc<dyn ProductSource>,
    stock: Arc<dyn StockSource>,
    store: StoreId,
    threshold: i64,
}

impl Evaluator {
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductSource>,
        stock: Arc<dyn StockSource>,
        store: StoreId,
        threshold: i64,
    ) -> Self {
        Self {
            products,
            stock,
            store,
            threshold,
        }
    }

    /// Evaluate one visible order item for the given customer.
    ///
    /// Eligible iff the product still exists, carries the reminder flag, has
    /// a stock record marked in-stock, and its quantity is at or below the
    /// threshold (inclusive boundary).
    pub async fn evaluate(&self, order: &Order, email: &Email, item: &OrderItem) -> EvalOutcome {
        let product = match self.products.product(item.product_id, self.store).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                tracing::warn!(
                    product_id = %item.product_id,
                    order_id = %order.id,
                    "product not found; skipping item"
                );
                return EvalOutcome::Skip(SkipReason::ProductMissing);
            }
            Err(e) => {
                tracing::warn!(
                    product_id = %item.product_id,
                    order_id = %order.id,
                    error = %e,
                    "product lookup failed; skipping item"
                );
                return EvalOutcome::Skip(SkipReason::ProductLookupFailed);
            }
        };

        if !product.reminder_eligible {
            return EvalOutcome::Skip(SkipReason::NotReminderEligible);
        }

        let stock = match self.stock.stock(item.product_id).await {
            Ok(Some(stock)) => stock,
            Ok(None) => {
                // Missing stock data never counts as eligible.
                return EvalOutcome::Skip(SkipReason::NoStockRecord);
            }
            Err(e) => {
                tracing::warn!(
                    product_id = %item.product_id,
                    error = %e,
                    "stock lookup failed; skipping item"
                );
                return EvalOutcome::Skip(SkipReason::StockLookupFailed);
            }
        };

        if !stock.in_stock {
            return EvalOutcome::Skip(SkipReason::OutOfStock);
        }

        if stock.qty > self.threshold {
            return EvalOutcome::Skip(SkipReason::AboveThreshold);
        }

        EvalOutcome::Eligible(ReminderCandidate {
            product_id: product.id,
            customer_email: email.clone(),
            customer_name: order.customer_name.clone(),
            product_name: product.name,
            product_price: product.price,
            product_url: product.url,
            product_image: product.image,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use replenish_core::{OrderId, OrderItemId};

    use crate::db::RepositoryError;
    use crate::models::{ProductSnapshot, StockItem};

    use super::*;

    struct MapProducts(HashMap<ProductId, ProductSnapshot>);

    #[async_trait]
    impl ProductSource for MapProducts {
        async fn product(
            &self,
            id: ProductId,
            _store: StoreId,
        ) -> Result<Option<ProductSnapshot>, RepositoryError> {
            Ok(self.0.get(&id).cloned())
        }
    }

    struct MapStock(HashMap<ProductId, StockItem>);

    #[async_trait]
    impl StockSource for MapStock {
        async fn stock(&self, id: ProductId) -> Result<Option<StockItem>, RepositoryError> {
            Ok(self.0.get(&id).copied())
        }
    }

    struct FailingStock;

    #[async_trait]
    impl StockSource for FailingStock {
        async fn stock(&self, _id: ProductId) -> Result<Option<StockItem>, RepositoryError> {
            Err(RepositoryError::Unavailable("inventory offline".into()))
        }
    }

    fn product(id: i32, eligible: bool) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::new(1999, 2),
            image: None,
            url: format!("https://shop.example.com/p/{id}"),
            reminder_eligible: eligible,
        }
    }

    fn order_with_item(product_id: i32) -> (Order, Email) {
        let email = Email::parse("a@x.com").unwrap();
        let order = Order {
            id: OrderId::new(1),
            customer_email: Some(email.clone()),
            customer_name: "Ada".into(),
            created_at: Utc::now(),
            items: vec![OrderItem {
                id: OrderItemId::new(1),
                product_id: ProductId::new(product_id),
                qty_ordered: 1,
                parent_item_id: None,
            }],
        };
        (order, email)
    }

    fn evaluator(
        products: Vec<ProductSnapshot>,
        stock: Vec<(i32, StockItem)>,
        threshold: i64,
    ) -> Evaluator {
        let products: HashMap<_, _> = products.into_iter().map(|p| (p.id, p)).collect();
        let stock: HashMap<_, _> = stock
            .into_iter()
            .map(|(id, s)| (ProductId::new(id), s))
            .collect();
        Evaluator::new(
            Arc::new(MapProducts(products)),
            Arc::new(MapStock(stock)),
            StoreId::new(1),
            threshold,
        )
    }

    async fn eval_one(evaluator: &Evaluator, order: &Order, email: &Email) -> EvalOutcome {
        let item = order.items.first().unwrap();
        evaluator.evaluate(order, email, item).await
    }

    #[tokio::test]
    async fn test_qty_at_threshold_is_eligible() {
        let e = evaluator(
            vec![product(1, true)],
            vec![(
                1,
                StockItem {
                    in_stock: true,
                    qty: 5,
                },
            )],
            5,
        );
        let (order, email) = order_with_item(1);
        assert!(matches!(
            eval_one(&e, &order, &email).await,
            EvalOutcome::Eligible(_)
        ));
    }

    #[tokio::test]
    async fn test_qty_above_threshold_is_not_eligible() {
        let e = evaluator(
            vec![product(1, true)],
            vec![(
                1,
                StockItem {
                    in_stock: true,
                    qty: 6,
                },
            )],
            5,
        );
        let (order, email) = order_with_item(1);
        assert!(matches!(
            eval_one(&e, &order, &email).await,
            EvalOutcome::Skip(SkipReason::AboveThreshold)
        ));
    }

    #[tokio::test]
    async fn test_ineligible_flag_skips_even_at_zero_stock() {
        let e = evaluator(
            vec![product(1, false)],
            vec![(
                1,
                StockItem {
                    in_stock: true,
                    qty: 0,
                },
            )],
            5,
        );
        let (order, email) = order_with_item(1);
        assert!(matches!(
            eval_one(&e, &order, &email).await,
            EvalOutcome::Skip(SkipReason::NotReminderEligible)
        ));
    }

    #[tokio::test]
    async fn test_missing_product_skips() {
        let e = evaluator(vec![], vec![], 5);
        let (order, email) = order_with_item(1);
        assert!(matches!(
            eval_one(&e, &order, &email).await,
            EvalOutcome::Skip(SkipReason::ProductMissing)
        ));
    }

    #[tokio::test]
    async fn test_missing_stock_record_skips() {
        let e = evaluator(vec![product(1, true)], vec![], 5);
        let (order, email) = order_with_item(1);
        assert!(matches!(
            eval_one(&e, &order, &email).await,
            EvalOutcome::Skip(SkipReason::NoStockRecord)
        ));
    }

    #[tokio::test]
    async fn test_out_of_stock_skips() {
        let e = evaluator(
            vec![product(1, true)],
            vec![(
                1,
                StockItem {
                    in_stock: false,
                    qty: 2,
                },
            )],
            5,
        );
        let (order, email) = order_with_item(1);
        assert!(matches!(
            eval_one(&e, &order, &email).await,
            EvalOutcome::Skip(SkipReason::OutOfStock)
        ));
    }

    #[tokio::test]
    async fn test_stock_lookup_failure_degrades_to_skip() {
        let products: HashMap<_, _> = [(ProductId::new(1), product(1, true))].into();
        let e = Evaluator::new(
            Arc::new(MapProducts(products)),
            Arc::new(FailingStock),
            StoreId::new(1),
            5,
        );
        let (order, email) = order_with_item(1);
        assert!(matches!(
            eval_one(&e, &order, &email).await,
            EvalOutcome::Skip(SkipReason::StockLookupFailed)
        ));
    }
}
