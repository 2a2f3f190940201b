use chrono::{DateTime, Utc};
use common::EntityId;
use serde::{Deserialize, Serialize};

use crate::lifecycle::{Lifecycle, LifecycleError};
use crate::money::Money;

/// A line of an [`Order`](super::Order).
///
/// Items are created with their order and soft-deleted together with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    lifecycle: Lifecycle,
    order_id: EntityId,
    product_id: EntityId,
    quantity: u32,

    /// Unit price captured when the order was placed.
    price: Money,
}

impl OrderItem {
    pub(crate) fn new(order_id: EntityId, line: NewOrderItem, now: DateTime<Utc>) -> Self {
        Self {
            lifecycle: Lifecycle::new(now),
            order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            price: line.price,
        }
    }

    pub fn id(&self) -> EntityId {
        self.lifecycle.id()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn order_id(&self) -> EntityId {
        self.order_id
    }

    pub fn product_id(&self) -> EntityId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn price(&self) -> Money {
        self.price
    }

    /// Returns quantity times unit price, or `None` if it overflows.
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_mul(self.quantity)
    }

    pub fn is_deleted(&self) -> bool {
        self.lifecycle.is_deleted()
    }

    pub(crate) fn soft_delete(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        self.lifecycle.soft_delete(now)
    }
}

/// Input for one order line, priced by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: EntityId,
    pub quantity: u32,
    pub price: Money,
}

impl NewOrderItem {
    pub fn new(product_id: EntityId, quantity: u32, price: Money) -> Self {
        Self {
            product_id,
            quantity,
            price,
        }
    }
}
