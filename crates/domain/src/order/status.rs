use serde::{Deserialize, Serialize};

/// Status of an order.
///
/// The regular flow is `Pending -> Confirmed -> Shipped -> Delivered`. Any
/// non-terminal status may move to `Cancelled`. `Delivered` and `Cancelled`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order was placed and awaits confirmation.
    #[default]
    Pending,

    Confirmed,

    Shipped,

    Delivered,

    Cancelled,
}

impl OrderStatus {
    /// Returns true if no further status change is allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns true if the order may move from this status to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        match (self, next) {
            (OrderStatus::Pending, OrderStatus::Confirmed)
            | (OrderStatus::Confirmed, OrderStatus::Shipped)
            | (OrderStatus::Shipped, OrderStatus::Delivered) => true,
            (current, OrderStatus::Cancelled) => !current.is_terminal(),
            _ => false,
        }
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
