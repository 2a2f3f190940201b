//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{EntityId, Version};
use serde::{Deserialize, Serialize};
use store::Record;

use crate::aggregate::AggregateRoot;
use crate::error::DomainError;
use crate::event::EventBuffer;
use crate::lifecycle::Lifecycle;
use crate::money::Money;

use super::{NewOrderItem, OrderEvent, OrderItem, OrderStatus};

const AGGREGATE_TYPE: &str = "order";

/// Order aggregate root.
///
/// Owns one or more [`OrderItem`]s. The total is fixed when the order is
/// placed. Deleting an order soft-deletes every item in the same mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    lifecycle: Lifecycle,
    user_id: EntityId,
    status: OrderStatus,
    total_price: Money,
    items: Vec<OrderItem>,
    version: Version,
    #[serde(skip)]
    events: EventBuffer<OrderEvent>,
}

impl Order {
    /// Places a new pending order and raises `OrderCreated`.
    pub fn create(user_id: EntityId, lines: Vec<NewOrderItem>) -> Result<Self, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::validation("order must have at least one item"));
        }
        for line in &lines {
            if line.quantity == 0 {
                return Err(DomainError::validation(format!(
                    "quantity for product {} must be greater than 0",
                    line.product_id
                )));
            }
            if !line.price.is_positive() {
                return Err(DomainError::validation(format!(
                    "price for product {} must be positive, got {}",
                    line.product_id, line.price
                )));
            }
        }

        let total_price = lines
            .iter()
            .try_fold(Money::zero(), |total, line| {
                line.price
                    .checked_mul(line.quantity)
                    .and_then(|line_total| total.checked_add(line_total))
            })
            .ok_or_else(|| DomainError::validation("order total overflows"))?;

        let now = Utc::now();
        let lifecycle = Lifecycle::new(now);
        let order_id = lifecycle.id();
        let items: Vec<OrderItem> = lines
            .into_iter()
            .map(|line| OrderItem::new(order_id, line, now))
            .collect();

        let mut events = EventBuffer::new();
        events.push(OrderEvent::order_created(
            order_id,
            user_id,
            total_price,
            items.len(),
        ));

        Ok(Self {
            lifecycle,
            user_id,
            status: OrderStatus::Pending,
            total_price,
            items,
            version: Version::initial(),
            events,
        })
    }

    pub fn id(&self) -> EntityId {
        self.lifecycle.id()
    }

    pub fn user_id(&self) -> EntityId {
        self.user_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Returns every item, deleted or not.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns the items that are not deleted.
    pub fn active_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(|item| !item.is_deleted())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_deleted(&self) -> bool {
        self.lifecycle.is_deleted()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Moves the order to a new status and raises `OrderStatusChanged`.
    ///
    /// Moving to `Cancelled` is the same as [`cancel`](Self::cancel).
    pub fn change_status(&mut self, to: OrderStatus) -> Result<(), DomainError> {
        if to == OrderStatus::Cancelled {
            return self.cancel();
        }
        self.ensure_active()?;
        self.ensure_transition(to)?;

        let from = self.status;
        self.status = to;
        self.lifecycle.touch(Utc::now());
        self.events
            .push(OrderEvent::order_status_changed(self.id(), from, to));
        Ok(())
    }

    /// Cancels a non-terminal order and raises `OrderCancelled`.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.ensure_transition(OrderStatus::Cancelled)?;

        self.status = OrderStatus::Cancelled;
        self.lifecycle.touch(Utc::now());
        self.events.push(OrderEvent::order_cancelled(self.id()));
        Ok(())
    }

    /// Soft-deletes the order and its items, then raises `OrderDeleted`.
    pub fn delete(&mut self) -> Result<(), DomainError> {
        self.soft_delete_at(Utc::now())?;
        self.events.push(OrderEvent::order_deleted(self.id()));
        Ok(())
    }

    fn soft_delete_at(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.lifecycle
            .soft_delete(now)
            .map_err(|e| DomainError::lifecycle(AGGREGATE_TYPE, e))?;

        for item in self.items.iter_mut().filter(|item| !item.is_deleted()) {
            item.soft_delete(now)
                .map_err(|e| DomainError::lifecycle("order item", e))?;
        }
        Ok(())
    }

    /// Restores a deleted order. Raises no event and leaves the items deleted.
    pub fn restore(&mut self) -> Result<(), DomainError> {
        self.lifecycle
            .restore(Utc::now())
            .map_err(|e| DomainError::lifecycle(AGGREGATE_TYPE, e))
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_deleted() {
            return Err(DomainError::AlreadyDeleted {
                aggregate_type: AGGREGATE_TYPE,
                id: self.id(),
            });
        }
        Ok(())
    }

    fn ensure_transition(&self, to: OrderStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(to) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status,
                to,
            });
        }
        Ok(())
    }
}

impl Record for Order {
    fn record_type() -> &'static str {
        AGGREGATE_TYPE
    }

    fn id(&self) -> EntityId {
        self.lifecycle.id()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.lifecycle.created_at()
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.lifecycle.deleted_at()
    }

    fn mark_deleted(&mut self, now: DateTime<Utc>) {
        // Repositories only call this on an active order.
        let _ = self.soft_delete_at(now);
    }

    fn mark_restored(&mut self, now: DateTime<Utc>) {
        let _ = self.lifecycle.restore(now);
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn snapshot(&self) -> Self {
        Self {
            events: EventBuffer::new(),
            ..self.clone()
        }
    }
}

impl AggregateRoot for Order {
    type Event = OrderEvent;

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn events(&self) -> &EventBuffer<OrderEvent> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventBuffer<OrderEvent> {
        &mut self.events
    }
}
