//! Order domain types.
//!
//! Orders and their items are written exactly once, at checkout. Items are
//! immutable afterwards; only the order's status can change.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use pizzeria_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// A placed order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Customer who placed the order.
    pub customer_id: UserId,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Cached decimal sum of (quantity x price) over the order's items,
    /// written at checkout.
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated (status changes).
    pub updated_at: DateTime<Utc>,
}

/// A single line of an order.
///
/// `price` is the unit price snapshot carried over from the cart, not a
/// live reference to the product's current price.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    /// Unique item ID.
    pub id: OrderItemId,
    /// Order this line belongs to.
    pub order_id: OrderId,
    /// Product this line references. Unique within an order.
    pub product_id: ProductId,
    /// Units ordered. Always positive.
    pub quantity: i64,
    /// Unit price snapshot at checkout time.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl OrderItem {
    /// Line total: quantity x snapshot price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An order with its items eagerly loaded.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
