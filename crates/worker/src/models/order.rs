//! Sales order records as read by the reminder job.

use chrono::{DateTime, Utc};

use replenish_core::{Email, OrderId, OrderItemId, ProductId};

/// An order placed by a customer, with its line items.
///
/// Read-only to the worker: orders are produced by the storefront and only
/// scanned here. `customer_email` is `None` when the order record carries no
/// parseable address, in which case the whole order is skipped.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub customer_email: Option<Email>,
    pub customer_name: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Line items a customer actually sees on the order.
    ///
    /// Child items generated for configurable/bundle parents carry a
    /// `parent_item_id` and are excluded, matching the storefront's notion
    /// of visible items.
    pub fn visible_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(|item| item.is_visible())
    }
}

/// One line item on an order.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub qty_ordered: i32,
    pub parent_item_id: Option<OrderItemId>,
}

impl OrderItem {
    /// Whether this item is shown to the customer (it has no parent item).
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.parent_item_id.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, parent: Option<i32>) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(id),
            product_id: ProductId::new(100 + id),
            qty_ordered: 1,
            parent_item_id: parent.map(OrderItemId::new),
        }
    }

    #[test]
    fn test_visible_items_excludes_children() {
        let order = Order {
            id: OrderId::new(1),
            customer_email: Some(Email::parse("a@x.com").unwrap()),
            customer_name: "Ada".into(),
            created_at: Utc::now(),
            items: vec![item(1, None), item(2, Some(1)), item(3, None)],
        };

        let visible: Vec<_> = order.visible_items().map(|i| i.id.as_i32()).collect();
        assert_eq!(visible, vec![1, 3]);
    }
}
