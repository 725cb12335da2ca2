//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. `TraceLayer` (request tracing)
//! 2. Session layer (tower-sessions with `SQLite` store)

pub mod auth;
pub mod session;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, set_current_user};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
