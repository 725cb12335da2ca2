//! User roles.

use serde::{Deserialize, Serialize};

/// Role attached to a user's profile.
///
/// Admins can manage the catalog, see unavailable products, and view or
/// update any order. Customers only see their own orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular shopper. The default for newly created profiles.
    #[default]
    Customer,
    /// Staff role with full read access and catalog/order mutation rights.
    Admin,
}

impl Role {
    /// Whether this role grants admin privileges.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for role in [Role::Customer, Role::Admin] {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_invalid_role() {
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Customer.is_admin());
    }
}
