use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::menu::MenuItem;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ];

    /// The only status this one may move to. `None` once completed.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Completed),
            OrderStatus::Completed => None,
        }
    }

    pub fn is_active(self) -> bool {
        self != OrderStatus::Completed
    }

    /// Pending and preparing orders still occupy the kitchen.
    pub fn is_in_kitchen(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Preparing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
        }
    }

    /// Label of the staff action that advances an order out of this status.
    pub fn action_label(self) -> Option<&'static str> {
        match self {
            OrderStatus::Pending => Some("Start Preparing"),
            OrderStatus::Preparing => Some("Mark Ready"),
            OrderStatus::Ready => Some("Complete"),
            OrderStatus::Completed => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub menu_item: MenuItem,
    pub quantity: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> Option<u32> {
        self.menu_item.price.checked_mul(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub token: String,
    pub student_name: String,
    pub items: Vec<OrderItem>,
    /// Frozen at creation; later menu price changes do not apply.
    pub total_price: u32,
    pub pickup_time: DateTime<Utc>,
    pub order_time: DateTime<Utc>,
    pub status: OrderStatus,
    pub is_group_order: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_members: Option<Vec<String>>,
}

impl Order {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Broadcast to live queue subscribers whenever an order changes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum OrderEvent {
    Placed { order: Order },
    StatusChanged { order: Order, previous: OrderStatus },
}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn advancement_from_pending_visits_each_status_once() {
        let mut visited = vec![OrderStatus::Pending];
        let mut current = OrderStatus::Pending;
        while let Some(next) = current.next() {
            assert!(!visited.contains(&next), "{next:?} revisited");
            visited.push(next);
            current = next;
        }

        assert_eq!(visited, OrderStatus::ALL.to_vec());
        assert_eq!(current.next(), None);
    }

    #[test]
    fn only_completed_is_inactive() {
        for status in OrderStatus::ALL {
            assert_eq!(status.is_active(), status != OrderStatus::Completed);
            assert_eq!(status.action_label().is_some(), status.is_active());
        }
    }

    #[test]
    fn status_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"preparing\"");
        assert_eq!(OrderStatus::Preparing.as_str(), "preparing");
    }
}
