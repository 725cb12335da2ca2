//! Catalog domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pizzeria_core::{CategoryId, ProductId};

/// A product category (e.g. "Classic Pizzas", "Drinks").
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL-safe identifier, unique across categories.
    pub slug: String,
}

/// A catalog product.
///
/// `is_available` is a plain admin toggle; there is no stock counter.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Category this product belongs to, if any.
    pub category_id: Option<CategoryId>,
    /// Display name.
    pub name: String,
    /// Description shown on the detail page.
    pub description: String,
    /// Current unit price. Non-negative, two fraction digits.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    /// Optional product image.
    pub image_url: Option<String>,
    /// Whether customers can currently buy this product.
    pub is_available: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating or updating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub category_id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

const fn default_available() -> bool {
    true
}
