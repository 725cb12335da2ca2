//! Business logic services.
//!
//! Services sit between the route handlers and the repositories: they hold
//! the policy (quantity clamping, price snapshotting, permission checks,
//! the best-effort checkout) while the repositories hold the SQL.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService, CartUpdate, CartView};
pub use checkout::{CheckoutError, CheckoutReceipt, CheckoutService};
pub use orders::{OrderError, OrderService};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    //! Shared fixtures for service tests: an in-memory database with the
    //! schema applied, plus seed helpers.

    use std::str::FromStr;

    use sqlx::SqlitePool;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    use pizzeria_core::{Email, ProductId, Role};

    use crate::db::{ProductRepository, UserRepository};
    use crate::models::product::{NewProduct, Product};
    use crate::models::session::CurrentUser;
    use crate::models::user::User;

    /// Fresh in-memory database with migrations applied.
    ///
    /// A single connection is required: every `:memory:` connection is its
    /// own database.
    pub async fn memory_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();

        crate::db::migrate(&pool).await.unwrap();
        pool
    }

    pub async fn seed_product(pool: &SqlitePool, name: &str, price: &str) -> Product {
        ProductRepository::new(pool)
            .create(&NewProduct {
                category_id: None,
                name: name.to_string(),
                description: String::new(),
                price: price.parse().unwrap(),
                image_url: None,
                is_available: true,
            })
            .await
            .unwrap()
    }

    pub async fn set_available(pool: &SqlitePool, id: ProductId, available: bool) {
        sqlx::query("UPDATE products SET is_available = ? WHERE id = ?")
            .bind(available)
            .bind(id)
            .execute(pool)
            .await
            .unwrap();
    }

    pub async fn seed_user(pool: &SqlitePool, email: &str) -> User {
        UserRepository::new(pool)
            .create(&Email::parse(email).unwrap(), "not-a-real-hash")
            .await
            .unwrap()
    }

    pub async fn seed_admin(pool: &SqlitePool, email: &str) -> User {
        let users = UserRepository::new(pool);
        let user = seed_user(pool, email).await;
        users.set_role(user.id, Role::Admin).await.unwrap();
        users.get_by_id(user.id).await.unwrap().unwrap()
    }

    pub fn as_current(user: &User) -> CurrentUser {
        CurrentUser {
            id: user.id,
            email: user.email.clone(),
            role: user.profile.role,
        }
    }

    pub async fn order_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    pub async fn stored_status(pool: &SqlitePool, order_id: i64) -> String {
        sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }
}
