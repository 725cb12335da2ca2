//! Checkout: the cart-to-order transition.
//!
//! Converts the session cart into a persistent order with immutable line
//! snapshots. The multi-row write is a single transaction (see
//! [`OrderRepository::create_from_cart`]); lines whose product went
//! unavailable since add-to-cart are skipped with a warning rather than
//! failing the whole order.

use sqlx::SqlitePool;

use pizzeria_core::{ProductId, UserId};

use crate::db::{OrderRepository, RepositoryError};
use crate::models::cart::Cart;
use crate::models::order::OrderWithItems;

/// Errors from checkout.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The cart has no entries; nothing was written.
    #[error("cart is empty")]
    EmptyCart,

    /// The transactional write failed and was rolled back.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result of a successful checkout.
#[derive(Debug)]
pub struct CheckoutReceipt {
    /// The created order, with the items that were actually persisted.
    pub order: OrderWithItems,
    /// Products skipped because they were no longer available.
    pub skipped: Vec<ProductId>,
}

/// Service for converting carts into orders.
pub struct CheckoutService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Check out the cart for `customer`.
    ///
    /// On success the cart is cleared unconditionally, even when some
    /// lines were skipped. The order total is the decimal sum over the
    /// items actually persisted, at their cart snapshot prices.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no entries (no
    /// state changes). Returns `CheckoutError::Repository` if the
    /// transaction failed; nothing is persisted and the cart is kept.
    pub async fn checkout(
        &self,
        cart: &mut Cart,
        customer: UserId,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let (order, skipped) = self.orders.create_from_cart(customer, cart).await?;

        for product_id in &skipped {
            tracing::warn!(
                order_id = %order.order.id,
                product_id = %product_id,
                "skipped unavailable product at checkout"
            );
        }

        cart.clear();

        Ok(CheckoutReceipt { order, skipped })
    }
}
