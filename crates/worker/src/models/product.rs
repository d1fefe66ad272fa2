//! Catalog and stock records as read by the reminder job.

use rust_decimal::Decimal;

use replenish_core::ProductId;

/// Current catalog state for one product.
///
/// `image` is a path under the media base URL (leading slash included, e.g.
/// `/s/h/shirt.jpg`); `url` is the absolute product page URL.
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub url: String,
    /// Whether the product participates in repurchase reminders.
    pub reminder_eligible: bool,
}

/// Current inventory state for one product.
#[derive(Debug, Clone, Copy)]
pub struct StockItem {
    pub in_stock: bool,
    pub qty: i64,
}
