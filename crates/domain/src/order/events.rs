//! Order domain events.

use chrono::{DateTime, Utc};
use common::EntityId;
use serde::{Deserialize, Serialize};

use crate::event::DomainEvent;
use crate::money::Money;

use super::OrderStatus;

/// Events that can occur on an order aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was placed.
    OrderCreated(OrderCreatedData),

    /// Order moved along the fulfilment flow.
    OrderStatusChanged(OrderStatusChangedData),

    /// Order was cancelled.
    OrderCancelled(OrderCancelledData),

    /// Order was soft-deleted.
    OrderDeleted(OrderDeletedData),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated(_) => "OrderCreated",
            OrderEvent::OrderStatusChanged(_) => "OrderStatusChanged",
            OrderEvent::OrderCancelled(_) => "OrderCancelled",
            OrderEvent::OrderDeleted(_) => "OrderDeleted",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderCreated(data) => data.occurred_at,
            OrderEvent::OrderStatusChanged(data) => data.occurred_at,
            OrderEvent::OrderCancelled(data) => data.occurred_at,
            OrderEvent::OrderDeleted(data) => data.occurred_at,
        }
    }

    fn subject_id(&self) -> EntityId {
        match self {
            OrderEvent::OrderCreated(data) => data.order_id,
            OrderEvent::OrderStatusChanged(data) => data.order_id,
            OrderEvent::OrderCancelled(data) => data.order_id,
            OrderEvent::OrderDeleted(data) => data.order_id,
        }
    }
}

/// Data for OrderCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreatedData {
    pub order_id: EntityId,

    /// The user who placed the order.
    pub user_id: EntityId,

    pub total_price: Money,
    pub item_count: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Data for OrderStatusChanged event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusChangedData {
    pub order_id: EntityId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Data for OrderCancelled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCancelledData {
    pub order_id: EntityId,
    pub occurred_at: DateTime<Utc>,
}

/// Data for OrderDeleted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDeletedData {
    pub order_id: EntityId,
    pub occurred_at: DateTime<Utc>,
}

// Convenience constructors for events
impl OrderEvent {
    pub fn order_created(
        order_id: EntityId,
        user_id: EntityId,
        total_price: Money,
        item_count: usize,
    ) -> Self {
        OrderEvent::OrderCreated(OrderCreatedData {
            order_id,
            user_id,
            total_price,
            item_count,
            occurred_at: Utc::now(),
        })
    }

    pub fn order_status_changed(order_id: EntityId, from: OrderStatus, to: OrderStatus) -> Self {
        OrderEvent::OrderStatusChanged(OrderStatusChangedData {
            order_id,
            from,
            to,
            occurred_at: Utc::now(),
        })
    }

    pub fn order_cancelled(order_id: EntityId) -> Self {
        OrderEvent::OrderCancelled(OrderCancelledData {
            order_id,
            occurred_at: Utc::now(),
        })
    }

    pub fn order_deleted(order_id: EntityId) -> Self {
        OrderEvent::OrderDeleted(OrderDeletedData {
            order_id,
            occurred_at: Utc::now(),
        })
    }
}
