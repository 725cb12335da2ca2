//! Landing page handler.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::{Category, CurrentUser, Product};
use crate::state::AppState;

/// How many products the landing payload features.
const FEATURED_PRODUCTS: usize = 6;

/// How many categories the landing payload shows.
const FEATURED_CATEGORIES: usize = 4;

/// Landing payload: a taste of the catalog.
#[derive(Debug, Serialize)]
pub struct HomePayload {
    pub featured_products: Vec<Product>,
    pub categories: Vec<Category>,
}

/// GET / - featured products and the first categories.
///
/// Customers see available products only; admins see the catalog as it
/// is, unavailable entries included.
pub async fn home(
    State(state): State<AppState>,
    auth: OptionalAuth,
) -> Result<Json<HomePayload>> {
    let products = ProductRepository::new(state.pool());
    let admin = auth.0.as_ref().is_some_and(CurrentUser::is_admin);

    let mut featured = if admin {
        products.list(None).await?
    } else {
        products.list_available(None).await?
    };
    featured.truncate(FEATURED_PRODUCTS);

    let mut categories = products.list_categories().await?;
    categories.truncate(FEATURED_CATEGORIES);

    Ok(Json(HomePayload {
        featured_products: featured,
        categories,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use secrecy::SecretString;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::services::testing::{as_current, memory_pool, seed_admin, seed_product, set_available};

    fn test_state(pool: sqlx::SqlitePool) -> AppState {
        let config = StorefrontConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            base_url: "http://localhost:0".to_owned(),
            session_secret: SecretString::from("kX9vQ2mRfT7wB4nJc6hL1pZsD8gA5yEu"),
        };
        AppState::new(config, pool)
    }

    #[tokio::test]
    async fn test_home_filters_unavailable_products_by_role() {
        let pool = memory_pool().await;
        let on_menu = seed_product(&pool, "Margherita", "12.99").await;
        let off_menu = seed_product(&pool, "Calzone", "11.00").await;
        set_available(&pool, off_menu.id, false).await;
        let state = test_state(pool.clone());

        // Anonymous visitors only see what's orderable.
        let Json(payload) = home(State(state.clone()), OptionalAuth(None)).await.unwrap();
        assert_eq!(payload.featured_products.len(), 1);
        assert_eq!(payload.featured_products[0].id, on_menu.id);

        // Admins see the whole catalog.
        let admin = seed_admin(&pool, "admin@example.com").await;
        let Json(payload) = home(State(state), OptionalAuth(Some(as_current(&admin))))
            .await
            .unwrap();
        assert_eq!(payload.featured_products.len(), 2);
    }
}
