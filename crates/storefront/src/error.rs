//! Unified error handling.
//!
//! Provides a unified `AppError` type that maps service and repository
//! errors onto HTTP responses. All route handlers should return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, CartError, CheckoutError, OrderError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Internal(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Cart(err) => match err {
                CartError::ProductNotFound(_) => StatusCode::NOT_FOUND,
                CartError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Order(err) => match err {
                OrderError::NotFound => StatusCode::NOT_FOUND,
                OrderError::PermissionDenied => StatusCode::FORBIDDEN,
                OrderError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
                OrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Internal details never leave the server.
    fn message(&self) -> String {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "Not found".to_string(),
                RepositoryError::Conflict(msg) => msg.clone(),
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    "Internal server error".to_string()
                }
            },
            Self::Internal(_) | Self::Session(_) => "Internal server error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    "Internal server error".to_string()
                }
            },
            Self::Cart(err) => match err {
                CartError::ProductNotFound(id) => format!("Product {id} is not available"),
                CartError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => "Your cart is empty".to_string(),
                CheckoutError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Order(err) => match err {
                OrderError::NotFound => "Order not found".to_string(),
                OrderError::PermissionDenied => {
                    "You do not have permission to access this order".to_string()
                }
                OrderError::InvalidStatus(raw) => format!("Invalid status: {raw}"),
                OrderError::Repository(_) => "Internal server error".to_string(),
            },
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request error");
        }

        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
