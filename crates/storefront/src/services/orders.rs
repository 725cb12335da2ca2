//! Order query and status service.
//!
//! Enforces the visibility rules: customers see their own orders, admins
//! see everything and are the only role allowed to change a status.

use sqlx::SqlitePool;

use pizzeria_core::{OrderId, OrderStatus, UserId};

use crate::db::{OrderRepository, RepositoryError};
use crate::models::order::{Order, OrderWithItems};
use crate::models::session::CurrentUser;

/// Errors from order queries and status updates.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// No order with this ID.
    #[error("order not found")]
    NotFound,

    /// The requester is neither the order's customer nor an admin.
    #[error("permission denied")]
    PermissionDenied,

    /// The supplied status is not one of the recognized values.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Storage failure.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for OrderError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// Service for order listing, detail, and status transitions.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// List a customer's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer: UserId,
    ) -> Result<Vec<OrderWithItems>, OrderError> {
        Ok(self.orders.list_for_customer(customer).await?)
    }

    /// List all orders, admin only, optionally filtered on exact status.
    ///
    /// The filter string is matched verbatim; an unrecognized value
    /// matches no orders rather than erroring.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::PermissionDenied` for non-admin requesters.
    pub async fn list_all(
        &self,
        requester: &CurrentUser,
        status_filter: Option<&str>,
    ) -> Result<Vec<OrderWithItems>, OrderError> {
        if !requester.is_admin() {
            return Err(OrderError::PermissionDenied);
        }

        Ok(self.orders.list_all(status_filter).await?)
    }

    /// Get one order with items.
    ///
    /// Visible to the order's customer and to admins.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order doesn't exist.
    /// Returns `OrderError::PermissionDenied` for anyone else's order.
    pub async fn get(
        &self,
        id: OrderId,
        requester: &CurrentUser,
    ) -> Result<OrderWithItems, OrderError> {
        let order = self
            .orders
            .get_with_items(id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if order.order.customer_id != requester.id && !requester.is_admin() {
            return Err(OrderError::PermissionDenied);
        }

        Ok(order)
    }

    /// Set an order's status from its raw string form, admin only.
    ///
    /// Any recognized status may follow any other; there is deliberately
    /// no transition state machine. An unrecognized value fails with
    /// `InvalidStatus` and leaves the order untouched.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::PermissionDenied` for non-admin requesters.
    /// Returns `OrderError::InvalidStatus` for unrecognized status values.
    /// Returns `OrderError::NotFound` if the order doesn't exist.
    pub async fn set_status(
        &self,
        id: OrderId,
        raw_status: &str,
        requester: &CurrentUser,
    ) -> Result<Order, OrderError> {
        if !requester.is_admin() {
            return Err(OrderError::PermissionDenied);
        }

        let status = raw_status
            .parse::<OrderStatus>()
            .map_err(|_| OrderError::InvalidStatus(raw_status.to_owned()))?;

        Ok(self.orders.set_status(id, status).await?)
    }
}
