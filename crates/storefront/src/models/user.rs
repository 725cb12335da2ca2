//! User domain types.
//!
//! These types represent validated domain objects separate from database
//! row types. Password hashes never appear on them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pizzeria_core::{Email, ProfileId, Role, UserId};

/// A storefront user.
///
/// Every user carries its [`Profile`]; the profile row is created in the
/// same transaction as the user, so the pairing is guaranteed.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Role and contact details.
    pub profile: Profile,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user has the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.profile.role.is_admin()
    }
}

/// Role and contact information attached to a user.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    /// Database ID of this profile.
    pub id: ProfileId,
    /// User who owns this profile.
    pub user_id: UserId,
    /// Customer or admin.
    pub role: Role,
    /// Optional contact phone number.
    pub phone_number: Option<String>,
    /// Optional delivery address.
    pub address: Option<String>,
}
