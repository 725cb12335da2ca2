//! Database operations for the storefront `SQLite` store.
//!
//! ## Tables
//!
//! - `users` / `profiles` - Accounts and their role (customer or admin)
//! - `categories` / `products` - The catalog
//! - `orders` / `order_items` - Orders materialized from session carts at checkout
//!
//! The session cart itself is never written here; it lives in the
//! tower-sessions store until checkout.
//!
//! # Migrations
//!
//! Migrations are embedded from `crates/storefront/migrations/` and run at
//! startup via [`migrate`].

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub mod orders;
pub mod products;
pub mod users;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Parse a decimal column stored as TEXT.
///
/// Money columns hold exact decimal strings; a value that fails to parse
/// means the database was written by something other than this code.
pub(crate) fn parse_decimal(
    raw: &str,
    column: &str,
) -> Result<rust_decimal::Decimal, RepositoryError> {
    raw.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid decimal in {column}: {raw:?} ({e})"))
    })
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Foreign keys are enabled on every connection; the database file is
/// created if it does not exist.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Run the embedded schema migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}
