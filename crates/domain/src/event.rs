//! Domain events and the per-aggregate event buffer.

use chrono::{DateTime, Utc};
use common::EntityId;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::order::OrderEvent;
use crate::product::ProductEvent;
use crate::user::UserEvent;

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone + std::fmt::Debug {
    /// Returns the event type name.
    ///
    /// Handlers use it for routing and it is attached to every log line.
    fn event_type(&self) -> &'static str;

    /// Returns when the event happened.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Returns the identifier of the aggregate the event is about.
    fn subject_id(&self) -> EntityId;
}

/// Ordered buffer of events an aggregate has raised but not yet dispatched.
///
/// The buffer is transient: aggregates skip it on serialization and
/// repositories never store it.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBuffer<E> {
    events: Vec<E>,
}

impl<E> EventBuffer<E> {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends an event. No deduplication is performed.
    pub fn push(&mut self, event: E) {
        self.events.push(event);
    }

    /// Returns the buffered events in the order they were raised.
    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.events.iter()
    }

    /// Empties the buffer. Clearing an empty buffer is a no-op.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<E> Default for EventBuffer<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Union of every aggregate's events.
///
/// Handlers and publishers see this type so that a single dispatcher can
/// serve all aggregate services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum AnyEvent {
    User(UserEvent),
    Product(ProductEvent),
    Order(OrderEvent),
}

impl AnyEvent {
    /// Returns the aggregate type the event belongs to.
    pub fn aggregate_type(&self) -> &'static str {
        match self {
            AnyEvent::User(_) => "user",
            AnyEvent::Product(_) => "product",
            AnyEvent::Order(_) => "order",
        }
    }
}

impl DomainEvent for AnyEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AnyEvent::User(e) => e.event_type(),
            AnyEvent::Product(e) => e.event_type(),
            AnyEvent::Order(e) => e.event_type(),
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AnyEvent::User(e) => e.occurred_at(),
            AnyEvent::Product(e) => e.occurred_at(),
            AnyEvent::Order(e) => e.occurred_at(),
        }
    }

    fn subject_id(&self) -> EntityId {
        match self {
            AnyEvent::User(e) => e.subject_id(),
            AnyEvent::Product(e) => e.subject_id(),
            AnyEvent::Order(e) => e.subject_id(),
        }
    }
}

impl From<UserEvent> for AnyEvent {
    fn from(event: UserEvent) -> Self {
        AnyEvent::User(event)
    }
}

impl From<ProductEvent> for AnyEvent {
    fn from(event: ProductEvent) -> Self {
        AnyEvent::Product(event)
    }
}

impl From<OrderEvent> for AnyEvent {
    fn from(event: OrderEvent) -> Self {
        AnyEvent::Order(event)
    }
}
