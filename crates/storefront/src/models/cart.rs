//! The session-held shopping cart.
//!
//! A [`Cart`] is an ordered map from product ID to [`CartEntry`]. It is
//! owned by exactly one session and is never persisted to the relational
//! store: route handlers load it from the session, pass it explicitly into
//! the cart/checkout services, and save it back after mutation.
//!
//! Keys are the string form of the product ID so the serialized cart is a
//! plain JSON object in the session store.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pizzeria_core::ProductId;

/// One cart line: desired quantity plus display fields snapshotted at
/// add-time. The price is deliberately frozen; it only refreshes if the
/// entry is removed and re-added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Units the customer wants.
    pub quantity: i64,
    /// Unit price snapshot taken when the entry was created.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    /// Product name snapshot, for display without a catalog lookup.
    pub name: String,
    /// Product image snapshot.
    pub image_url: Option<String>,
}

/// Session-scoped cart: product ID -> entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: BTreeMap<String, CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Look up the entry for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartEntry> {
        self.entries.get(&product_id.to_string())
    }

    /// Mutable lookup of the entry for a product.
    pub fn get_mut(&mut self, product_id: ProductId) -> Option<&mut CartEntry> {
        self.entries.get_mut(&product_id.to_string())
    }

    /// Insert or replace the entry for a product.
    pub fn insert(&mut self, product_id: ProductId, entry: CartEntry) {
        self.entries.insert(product_id.to_string(), entry);
    }

    /// Remove the entry for a product, returning it if present.
    pub fn remove(&mut self, product_id: ProductId) -> Option<CartEntry> {
        self.entries.remove(&product_id.to_string())
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total number of units across all entries.
    #[must_use]
    pub fn unit_count(&self) -> i64 {
        self.entries.values().map(|e| e.quantity).sum()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate entries in product-ID order.
    ///
    /// Keys that do not parse as product IDs are skipped; they can only
    /// appear if the serialized session data was tampered with.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, &CartEntry)> {
        self.entries
            .iter()
            .filter_map(|(key, entry)| Some((ProductId::new(key.parse().ok()?), entry)))
    }
}
