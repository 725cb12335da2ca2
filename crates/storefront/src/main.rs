//! Pizzeria storefront - the public ordering site.
//!
//! # Architecture
//!
//! - Axum web framework serving a JSON API
//! - `SQLite` for the catalog, accounts, and orders
//! - tower-sessions (`SQLite`-backed) for the login state and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pizzeria_storefront::config::StorefrontConfig;
use pizzeria_storefront::state::AppState;
use pizzeria_storefront::{db, middleware, routes};

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pizzeria_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize database connection pool and apply migrations
    let pool = db::create_pool(config.database_url())
        .await
        .expect("Failed to create database pool");
    db::migrate(&pool).await.expect("Failed to run migrations");
    tracing::info!("Database ready");

    // Build application state
    let state = AppState::new(config, pool);

    // Session store shares the pool; its table is managed separately
    let session_store = SqliteStore::new(state.pool().clone());
    session_store
        .migrate()
        .await
        .expect("Failed to create session table");
    let session_layer = middleware::create_session_layer(session_store, state.config());

    let addr = state.config().socket_addr();

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
