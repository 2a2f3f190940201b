//! Aggregate root trait.

use store::Record;

use crate::event::{AnyEvent, DomainEvent, EventBuffer};
use crate::lifecycle::{Lifecycle, LifecycleState};

/// Trait for aggregate roots.
///
/// An aggregate root owns a [`Lifecycle`], its child entities, and a buffer
/// of events raised by its mutations. Mutations append to the buffer; the
/// [`EventDispatcher`](crate::EventDispatcher) drains it after the aggregate
/// has been persisted.
///
/// Aggregates are also [`Record`]s, so any [`Repository`](store::Repository)
/// can store them. [`Record::record_type`] doubles as the aggregate type name
/// and [`Record::snapshot`] must drop the event buffer.
pub trait AggregateRoot: Record {
    /// The type of events this aggregate raises.
    type Event: DomainEvent + Into<AnyEvent>;

    /// Returns the lifecycle record.
    fn lifecycle(&self) -> &Lifecycle;

    /// Returns the pending event buffer.
    fn events(&self) -> &EventBuffer<Self::Event>;

    /// Returns the pending event buffer for draining.
    fn events_mut(&mut self) -> &mut EventBuffer<Self::Event>;

    /// Returns the soft-delete state.
    fn state(&self) -> LifecycleState {
        self.lifecycle().state()
    }

    /// Returns the pending events in the order they were raised.
    fn pending_events(&self) -> &[Self::Event] {
        self.events().events()
    }

    /// Drops all pending events.
    fn clear_events(&mut self) {
        self.events_mut().clear();
    }
}
