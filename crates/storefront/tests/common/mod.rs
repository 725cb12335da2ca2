//! Shared fixtures for integration tests.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use pizzeria_core::Role;
use pizzeria_storefront::db::{self, UserRepository};
use pizzeria_storefront::models::{CurrentUser, User};
use pizzeria_storefront::services::AuthService;

/// Fresh in-memory database with migrations applied.
///
/// A single connection is required: every `:memory:` connection is its
/// own database.
pub async fn pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid connection string")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("in-memory database");

    db::migrate(&pool).await.expect("migrations");
    pool
}

/// Register a customer through the real auth service.
pub async fn register(pool: &SqlitePool, email: &str, password: &str) -> User {
    AuthService::new(pool)
        .register(email, password)
        .await
        .expect("registration")
}

/// Register a user and promote them to admin.
pub async fn register_admin(pool: &SqlitePool, email: &str, password: &str) -> User {
    let users = UserRepository::new(pool);
    let user = register(pool, email, password).await;
    users.set_role(user.id, Role::Admin).await.expect("set role");
    users
        .get_by_id(user.id)
        .await
        .expect("lookup")
        .expect("user exists")
}

pub fn as_current(user: &User) -> CurrentUser {
    CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.profile.role,
    }
}
