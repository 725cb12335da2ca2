//! Session-related types.
//!
//! Types stored in the session: the authenticated user's identity and the
//! shopping cart.

use serde::{Deserialize, Serialize};

use pizzeria_core::{Email, Role, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user and
/// authorize admin-only operations without a database round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Role at login time.
    pub role: Role,
}

impl CurrentUser {
    /// Whether this user may perform admin-only operations.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Session keys for stored data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for storing the shopping cart.
    pub const CART: &str = "cart";
}
