//! Catalog route handlers.
//!
//! Public listing and detail show only available products; admins see the
//! whole catalog, unavailable entries included, through the same routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pizzeria_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::models::{Category, CurrentUser, NewProduct, Product};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Restrict the listing to one category by slug.
    pub category: Option<String>,
}

/// Category detail payload: the category and its products.
#[derive(Debug, Serialize)]
pub struct CategoryDetail {
    pub category: Category,
    pub products: Vec<Product>,
}

fn is_admin(auth: &OptionalAuth) -> bool {
    auth.0.as_ref().is_some_and(CurrentUser::is_admin)
}

/// Reject negative prices before they reach the catalog.
fn validate_price(price: Decimal) -> Result<()> {
    if price < Decimal::ZERO {
        return Err(AppError::BadRequest("price must not be negative".to_owned()));
    }
    Ok(())
}

/// GET /products - list the catalog, optionally filtered by category slug.
pub async fn index(
    State(state): State<AppState>,
    auth: OptionalAuth,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool());
    let category = params.category.as_deref();

    let listing = if is_admin(&auth) {
        products.list(category).await?
    } else {
        products.list_available(category).await?
    };

    Ok(Json(listing))
}

/// GET /products/{id} - product detail.
///
/// Unavailable products 404 for everyone but admins.
pub async fn show(
    State(state): State<AppState>,
    auth: OptionalAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let products = ProductRepository::new(state.pool());

    let product = if is_admin(&auth) {
        products.get(id).await?
    } else {
        products.get_available(id).await?
    };

    product
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// POST /products - create a product (admin).
#[instrument(skip_all, fields(name = %new.name))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(new): Json<NewProduct>,
) -> Result<impl IntoResponse> {
    validate_price(new.price)?;

    let products = ProductRepository::new(state.pool());
    let product = products.create(&new).await?;

    tracing::info!(product_id = %product.id, "created product");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /products/{id} - replace a product's fields (admin).
#[instrument(skip_all, fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(new): Json<NewProduct>,
) -> Result<Json<Product>> {
    validate_price(new.price)?;

    let products = ProductRepository::new(state.pool());
    let product = products.update(id, &new).await?;

    Ok(Json(product))
}

/// DELETE /products/{id} - delete a product (admin).
///
/// Order items referencing the product go with it.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let products = ProductRepository::new(state.pool());

    if products.delete(id).await? {
        tracing::info!(product_id = %id, "deleted product");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("product {id}")))
    }
}

/// GET /categories - list all categories.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let products = ProductRepository::new(state.pool());
    Ok(Json(products.list_categories().await?))
}

/// GET /categories/{slug} - a category and its products.
pub async fn category(
    State(state): State<AppState>,
    auth: OptionalAuth,
    Path(slug): Path<String>,
) -> Result<Json<CategoryDetail>> {
    let products = ProductRepository::new(state.pool());

    let category = products
        .get_category_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    let listing = if is_admin(&auth) {
        products.list(Some(&slug)).await?
    } else {
        products.list_available(Some(&slug)).await?
    };

    Ok(Json(CategoryDetail {
        category,
        products: listing,
    }))
}

/// New category form data.
#[derive(Debug, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
}

/// POST /categories - create a category (admin).
#[instrument(skip_all, fields(slug = %new.slug))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(new): Json<NewCategory>,
) -> Result<impl IntoResponse> {
    if new.name.trim().is_empty() || new.slug.trim().is_empty() {
        return Err(AppError::BadRequest(
            "category name and slug must not be empty".to_owned(),
        ));
    }

    let products = ProductRepository::new(state.pool());
    let category = products.create_category(&new.name, &new.slug).await?;

    Ok((StatusCode::CREATED, Json(category)))
}
