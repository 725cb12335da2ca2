//! Order status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// New orders start as `Pending`. Any status may move to any other status;
/// there is deliberately no transition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed but not yet paid.
    #[default]
    Pending,
    /// Payment received.
    Paid,
    /// Handed to the customer.
    Delivered,
    /// Cancelled by staff.
    Cancelled,
}

impl OrderStatus {
    /// All recognized statuses, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Paid, Self::Delivered, Self::Cancelled];

    /// The status as its canonical lowercase string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_invalid_status() {
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("PAID".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");
    }

    #[test]
    fn test_default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }
}
