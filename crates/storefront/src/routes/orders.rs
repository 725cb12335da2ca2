//! Order route handlers: customer history plus the admin board.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use pizzeria_core::OrderId;

use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::order::{Order, OrderWithItems};
use crate::services::OrderService;
use crate::state::AppState;

/// Query parameters for the admin order board.
#[derive(Debug, Deserialize)]
pub struct AdminListParams {
    /// Exact-match status filter; unrecognized values match nothing.
    pub status: Option<String>,
}

/// Status-update form data.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// GET /orders - the logged-in user's order history, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<OrderWithItems>>> {
    let service = OrderService::new(state.pool());
    Ok(Json(service.list_for_customer(current.id).await?))
}

/// GET /orders/{id} - one order, visible to its customer and to admins.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>> {
    let service = OrderService::new(state.pool());
    Ok(Json(service.get(id, &current).await?))
}

/// GET /admin/orders - every order, optionally filtered by status.
pub async fn admin_index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Vec<OrderWithItems>>> {
    let service = OrderService::new(state.pool());
    Ok(Json(
        service.list_all(&admin, params.status.as_deref()).await?,
    ))
}

/// POST /admin/orders/{id}/status - set an order's status.
#[instrument(skip_all, fields(order_id = %id, status = %request.status))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<Order>> {
    let service = OrderService::new(state.pool());
    let order = service.set_status(id, &request.status, &admin).await?;

    tracing::info!(order_id = %order.id, status = %order.status, "order status changed");
    Ok(Json(order))
}
