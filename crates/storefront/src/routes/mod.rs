//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Storefront landing payload
//!
//! # Auth
//! POST /auth/register          - Create an account
//! POST /auth/login             - Login action
//! POST /auth/logout            - Logout action
//! GET  /account                - Current account (requires auth)
//!
//! # Catalog
//! GET  /products               - Product listing (?category=slug)
//! GET  /products/{id}          - Product detail
//! POST /products               - Create product (admin)
//! PUT  /products/{id}          - Replace product (admin)
//! DELETE /products/{id}        - Delete product (admin)
//! GET  /categories             - Category listing
//! GET  /categories/{slug}      - Category detail with its products
//! POST /categories             - Create category (admin)
//!
//! # Cart (session-held, requires auth)
//! GET  /cart                   - Resolved cart with total
//! POST /cart/add               - Add a product
//! POST /cart/update            - Replace a line's quantity
//! POST /cart/remove            - Remove a line
//!
//! # Checkout & orders (require auth)
//! POST /checkout               - Convert the cart into an order
//! GET  /orders                 - Own order history, newest first
//! GET  /orders/{id}            - Order detail (owner or admin)
//!
//! # Admin
//! GET  /admin/orders           - All orders (?status=pending|paid|...)
//! POST /admin/orders/{id}/status - Set an order's status
//! ```

pub mod auth;
pub mod cart;
pub mod home;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/{id}", get(products::show))
        .route("/{id}", put(products::update))
        .route("/{id}", delete(products::destroy))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::categories).post(products::create_category))
        .route("/{slug}", get(products::category))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::admin_index))
        .route("/orders/{id}/status", post(orders::set_status))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/account", get(auth::account))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        .nest("/orders", order_routes())
        .nest("/admin", admin_routes())
}
