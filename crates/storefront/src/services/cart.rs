//! Cart service: mutation and resolution of the session cart.
//!
//! The cart is passed in explicitly; this service never touches the
//! session. Prices are snapshotted into the cart at add-time and stay
//! frozen until the entry is removed and re-added.

use rust_decimal::Decimal;
use serde::Serialize;

use pizzeria_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::models::cart::{Cart, CartEntry};

/// Smallest quantity an add request is clamped up to.
pub const MIN_ADD_QUANTITY: i64 = 1;

/// Largest quantity an add request is clamped down to.
///
/// Only `add` clamps; explicit quantity updates accept any positive value.
pub const MAX_ADD_QUANTITY: i64 = 10;

/// Errors from cart operations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The product doesn't exist or is not currently purchasable.
    #[error("product {0} not found or unavailable")]
    ProductNotFound(ProductId),

    /// Catalog lookup failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Outcome of an explicit quantity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartUpdate {
    /// The entry's quantity was replaced.
    Updated {
        /// The new quantity.
        quantity: i64,
    },
    /// The new quantity was zero or negative, so the entry was removed.
    Removed,
    /// No entry for this product; nothing changed. Non-fatal.
    NotInCart,
}

/// A resolved cart line, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i64,
    /// Snapshot unit price, not the product's current price.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub line_total: Decimal,
    pub image_url: Option<String>,
}

/// The resolved cart with its exact decimal total.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    /// Total units across all lines (the cart badge count).
    pub unit_count: i64,
}

/// Service for cart mutation and resolution.
pub struct CartService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// Add a product to the cart.
    ///
    /// The requested quantity is clamped into `[1, 10]`. If the product is
    /// already in the cart the quantity accumulates; otherwise a new entry
    /// snapshots the product's current price, name, and image.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if the product is missing or
    /// unavailable; the cart is unchanged.
    pub async fn add(
        &self,
        cart: &mut Cart,
        product_id: ProductId,
        requested_quantity: i64,
    ) -> Result<CartEntry, CartError> {
        let product = self
            .products
            .get_available(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;

        let quantity = requested_quantity.clamp(MIN_ADD_QUANTITY, MAX_ADD_QUANTITY);

        if let Some(entry) = cart.get_mut(product_id) {
            entry.quantity += quantity;
            return Ok(entry.clone());
        }

        let entry = CartEntry {
            quantity,
            price: product.price,
            name: product.name,
            image_url: product.image_url,
        };
        cart.insert(product_id, entry.clone());
        Ok(entry)
    }

    /// Remove a product from the cart.
    ///
    /// Returns the removed entry, or `None` if the product wasn't in the
    /// cart (a non-fatal condition callers surface as a warning).
    pub fn remove(cart: &mut Cart, product_id: ProductId) -> Option<CartEntry> {
        cart.remove(product_id)
    }

    /// Replace the quantity of an existing entry.
    ///
    /// A quantity of zero or less removes the entry. Unlike `add`, the new
    /// quantity is not clamped upward.
    pub fn update_quantity(cart: &mut Cart, product_id: ProductId, quantity: i64) -> CartUpdate {
        if cart.get(product_id).is_none() {
            return CartUpdate::NotInCart;
        }

        if quantity <= 0 {
            cart.remove(product_id);
            return CartUpdate::Removed;
        }

        if let Some(entry) = cart.get_mut(product_id) {
            entry.quantity = quantity;
        }
        CartUpdate::Updated { quantity }
    }

    /// Resolve the cart against the catalog and total it.
    ///
    /// Entries whose product no longer exists are silently dropped from
    /// the cart (it self-heals) and excluded from the total. Surviving
    /// lines are totalled at their snapshot price, exactly, in decimal.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a catalog lookup fails.
    pub async fn view(&self, cart: &mut Cart) -> Result<CartView, RepositoryError> {
        let ids: Vec<ProductId> = cart.iter().map(|(id, _)| id).collect();

        let mut items = Vec::with_capacity(ids.len());
        let mut total = Decimal::ZERO;

        for product_id in ids {
            let Some(product) = self.products.get(product_id).await? else {
                // Product vanished from the catalog since it was added.
                cart.remove(product_id);
                continue;
            };

            let Some(entry) = cart.get(product_id) else {
                continue;
            };

            let line_total = entry.price * Decimal::from(entry.quantity);
            total += line_total;
            items.push(CartLine {
                product_id,
                name: product.name,
                quantity: entry.quantity,
                price: entry.price,
                line_total,
                image_url: product.image_url,
            });
        }

        Ok(CartView {
            items,
            total,
            unit_count: cart.unit_count(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::testing::{memory_pool, seed_product, set_available};

    #[tokio::test]
    async fn test_add_accumulates_quantity() {
        let pool = memory_pool().await;
        let product = seed_product(&pool, "Margherita", "12.99").await;
        let service = CartService::new(&pool);
        let mut cart = Cart::new();

        service.add(&mut cart, product.id, 2).await.unwrap();
        let entry = service.add(&mut cart, product.id, 3).await.unwrap();

        assert_eq!(entry.quantity, 5);
        assert_eq!(cart.get(product.id).unwrap().quantity, 5);
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn test_add_clamps_quantity() {
        let pool = memory_pool().await;
        let product = seed_product(&pool, "Margherita", "12.99").await;
        let service = CartService::new(&pool);

        let mut cart = Cart::new();
        let entry = service.add(&mut cart, product.id, 0).await.unwrap();
        assert_eq!(entry.quantity, 1);

        let mut cart = Cart::new();
        let entry = service.add(&mut cart, product.id, 999).await.unwrap();
        assert_eq!(entry.quantity, 10);
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails() {
        let pool = memory_pool().await;
        let service = CartService::new(&pool);
        let mut cart = Cart::new();

        let err = service
            .add(&mut cart, ProductId::new(999), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound(_)));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_add_unavailable_product_fails() {
        let pool = memory_pool().await;
        let product = seed_product(&pool, "Margherita", "12.99").await;
        set_available(&pool, product.id, false).await;
        let service = CartService::new(&pool);
        let mut cart = Cart::new();

        let err = service.add(&mut cart, product.id, 1).await.unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound(id) if id == product.id));
    }

    #[tokio::test]
    async fn test_add_snapshots_price() {
        let pool = memory_pool().await;
        let product = seed_product(&pool, "Margherita", "12.99").await;
        let service = CartService::new(&pool);
        let mut cart = Cart::new();

        service.add(&mut cart, product.id, 1).await.unwrap();

        // Raise the catalog price after the entry is created.
        sqlx::query("UPDATE products SET price = '99.00' WHERE id = ?")
            .bind(product.id)
            .execute(&pool)
            .await
            .unwrap();

        let view = service.view(&mut cart).await.unwrap();
        assert_eq!(view.total, "12.99".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn test_remove_missing_is_non_fatal() {
        let pool = memory_pool().await;
        let product = seed_product(&pool, "Margherita", "12.99").await;
        let service = CartService::new(&pool);
        let mut cart = Cart::new();

        service.add(&mut cart, product.id, 1).await.unwrap();
        assert!(CartService::remove(&mut cart, product.id).is_some());
        assert!(CartService::remove(&mut cart, product.id).is_none());
    }

    #[tokio::test]
    async fn test_update_quantity_replaces_not_accumulates() {
        let pool = memory_pool().await;
        let product = seed_product(&pool, "Margherita", "12.99").await;
        let service = CartService::new(&pool);
        let mut cart = Cart::new();

        service.add(&mut cart, product.id, 2).await.unwrap();
        let outcome = CartService::update_quantity(&mut cart, product.id, 7);

        assert_eq!(outcome, CartUpdate::Updated { quantity: 7 });
        assert_eq!(cart.get(product.id).unwrap().quantity, 7);

        // Updates are not clamped to 10 the way adds are.
        let outcome = CartService::update_quantity(&mut cart, product.id, 25);
        assert_eq!(outcome, CartUpdate::Updated { quantity: 25 });
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes() {
        let pool = memory_pool().await;
        let product = seed_product(&pool, "Margherita", "12.99").await;
        let service = CartService::new(&pool);
        let mut cart = Cart::new();

        service.add(&mut cart, product.id, 2).await.unwrap();
        let outcome = CartService::update_quantity(&mut cart, product.id, 0);

        assert_eq!(outcome, CartUpdate::Removed);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_is_non_fatal() {
        let mut cart = Cart::new();
        let outcome = CartService::update_quantity(&mut cart, ProductId::new(4), 3);
        assert_eq!(outcome, CartUpdate::NotInCart);
    }

    #[tokio::test]
    async fn test_view_totals_exactly() {
        let pool = memory_pool().await;
        let pizza = seed_product(&pool, "Margherita", "12.99").await;
        let drink = seed_product(&pool, "Lemonade", "10.00").await;
        let service = CartService::new(&pool);
        let mut cart = Cart::new();

        service.add(&mut cart, pizza.id, 2).await.unwrap();
        service.add(&mut cart, drink.id, 1).await.unwrap();

        let view = service.view(&mut cart).await.unwrap();
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.total, "35.98".parse::<Decimal>().unwrap());
        assert_eq!(view.unit_count, 3);
    }

    #[tokio::test]
    async fn test_view_unit_count_tracks_the_healed_cart() {
        let pool = memory_pool().await;
        let keep = seed_product(&pool, "Margherita", "12.99").await;
        let gone = seed_product(&pool, "Quattro", "15.50").await;
        let service = CartService::new(&pool);
        let mut cart = Cart::new();

        service.add(&mut cart, keep.id, 2).await.unwrap();
        service.add(&mut cart, gone.id, 5).await.unwrap();

        ProductRepository::new(&pool).delete(gone.id).await.unwrap();

        // The dropped entry's units don't count.
        let view = service.view(&mut cart).await.unwrap();
        assert_eq!(view.unit_count, 2);
    }

    #[tokio::test]
    async fn test_view_is_idempotent() {
        let pool = memory_pool().await;
        let product = seed_product(&pool, "Margherita", "12.99").await;
        let service = CartService::new(&pool);
        let mut cart = Cart::new();

        service.add(&mut cart, product.id, 3).await.unwrap();

        let first = service.view(&mut cart).await.unwrap();
        let second = service.view(&mut cart).await.unwrap();

        assert_eq!(first.total, second.total);
        assert_eq!(first.items.len(), second.items.len());
        assert_eq!(first.items[0].quantity, second.items[0].quantity);
    }

    #[tokio::test]
    async fn test_view_drops_deleted_products() {
        let pool = memory_pool().await;
        let keep = seed_product(&pool, "Margherita", "12.99").await;
        let gone = seed_product(&pool, "Quattro", "15.50").await;
        let service = CartService::new(&pool);
        let mut cart = Cart::new();

        service.add(&mut cart, keep.id, 1).await.unwrap();
        service.add(&mut cart, gone.id, 1).await.unwrap();

        ProductRepository::new(&pool).delete(gone.id).await.unwrap();

        let view = service.view(&mut cart).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.total, "12.99".parse::<Decimal>().unwrap());
        // The stale entry is gone from the cart itself, not just the view.
        assert!(cart.get(gone.id).is_none());
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn test_view_keeps_unavailable_products() {
        // Unavailability only matters at add and checkout time; an entry
        // whose product was merely toggled off still shows in the cart.
        let pool = memory_pool().await;
        let product = seed_product(&pool, "Margherita", "12.99").await;
        let service = CartService::new(&pool);
        let mut cart = Cart::new();

        service.add(&mut cart, product.id, 1).await.unwrap();
        set_available(&pool, product.id, false).await;

        let view = service.view(&mut cart).await.unwrap();
        assert_eq!(view.items.len(), 1);
    }
}
