//! Cart and checkout route handlers.
//!
//! The cart itself is stored in the session; handlers load it, hand it to
//! the services, and write it back. Every cart operation requires a
//! logged-in user. Non-fatal oddities (removing a line that isn't there,
//! lines skipped at checkout) come back as warnings in the response
//! instead of errors.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use pizzeria_core::ProductId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::cart::Cart;
use crate::models::order::OrderWithItems;
use crate::models::session_keys;
use crate::services::{CartService, CartUpdate, CartView, CheckoutService};
use crate::state::AppState;

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub product_id: ProductId,
    /// Defaults to one; clamped into the allowed range.
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

/// Quantity-update form data.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove-from-cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub product_id: ProductId,
}

/// Response to a cart mutation: what happened, plus the resolved cart.
#[derive(Debug, Serialize)]
pub struct CartMutationResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub cart: CartView,
}

/// Response to checkout: the created order plus per-line warnings.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: OrderWithItems,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session, defaulting to empty.
async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_else(Cart::new))
}

/// Write the cart back to the session.
async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /cart - the resolved cart with its total.
///
/// Resolution drops lines whose product vanished from the catalog, so the
/// session copy is rewritten afterwards.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    session: Session,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;

    let view = CartService::new(state.pool()).view(&mut cart).await?;
    save_cart(&session, &cart).await?;

    Ok(Json(view))
}

/// POST /cart/add - add a product to the cart.
#[instrument(skip_all, fields(product_id = %request.product_id, quantity = request.quantity))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    session: Session,
    Json(request): Json<AddRequest>,
) -> Result<Json<CartMutationResponse>> {
    let mut cart = load_cart(&session).await?;
    let service = CartService::new(state.pool());

    let entry = service
        .add(&mut cart, request.product_id, request.quantity)
        .await?;
    let message = format!("Added {} to your cart", entry.name);

    let view = service.view(&mut cart).await?;
    save_cart(&session, &cart).await?;

    Ok(Json(CartMutationResponse {
        message,
        warnings: Vec::new(),
        cart: view,
    }))
}

/// POST /cart/update - replace a line's quantity; zero or less removes it.
#[instrument(skip_all, fields(product_id = %request.product_id, quantity = request.quantity))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    session: Session,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<CartMutationResponse>> {
    let mut cart = load_cart(&session).await?;

    let mut warnings = Vec::new();
    let message = match CartService::update_quantity(&mut cart, request.product_id, request.quantity)
    {
        CartUpdate::Updated { quantity } => format!("Quantity set to {quantity}"),
        CartUpdate::Removed => "Item removed from your cart".to_owned(),
        CartUpdate::NotInCart => {
            warnings.push(format!(
                "Product {} was not in your cart.",
                request.product_id
            ));
            "Cart unchanged".to_owned()
        }
    };

    let view = CartService::new(state.pool()).view(&mut cart).await?;
    save_cart(&session, &cart).await?;

    Ok(Json(CartMutationResponse {
        message,
        warnings,
        cart: view,
    }))
}

/// POST /cart/remove - remove a line from the cart.
#[instrument(skip_all, fields(product_id = %request.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    session: Session,
    Json(request): Json<RemoveRequest>,
) -> Result<Json<CartMutationResponse>> {
    let mut cart = load_cart(&session).await?;

    let mut warnings = Vec::new();
    let message = match CartService::remove(&mut cart, request.product_id) {
        Some(entry) => format!("Removed {} from your cart", entry.name),
        None => {
            warnings.push(format!(
                "Product {} was not in your cart.",
                request.product_id
            ));
            "Cart unchanged".to_owned()
        }
    };

    let view = CartService::new(state.pool()).view(&mut cart).await?;
    save_cart(&session, &cart).await?;

    Ok(Json(CartMutationResponse {
        message,
        warnings,
        cart: view,
    }))
}

/// POST /checkout - convert the session cart into an order.
///
/// Requires a logged-in user. Lines whose product went unavailable are
/// skipped and reported as warnings; the cart is cleared either way.
#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    session: Session,
) -> Result<impl IntoResponse> {
    let mut cart = load_cart(&session).await?;

    let receipt = CheckoutService::new(state.pool())
        .checkout(&mut cart, current.id)
        .await?;
    save_cart(&session, &cart).await?;

    let warnings = receipt
        .skipped
        .iter()
        .map(|id| format!("Product {id} is no longer available."))
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order: receipt.order,
            warnings,
        }),
    ))
}
