//! Event dispatcher delivering buffered aggregate events to handlers and a publisher.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::aggregate::AggregateRoot;
use crate::event::{AnyEvent, DomainEvent};

/// Failure reported by an [`EventHandler`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure reported by an [`EventPublisher`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PublishError {
    message: String,
}

impl PublishError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors returned by [`EventDispatcher::dispatch`].
///
/// When dispatch fails the aggregate's buffer is left untouched.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A local handler rejected an event. Later handlers and the publisher
    /// were not called.
    #[error("handler {handler} failed on {event_type}: {source}")]
    Handler {
        handler: &'static str,
        event_type: &'static str,
        #[source]
        source: HandlerError,
    },

    /// The external publisher rejected the batch.
    #[error("publishing {batch_size} events failed: {source}")]
    Publisher {
        batch_size: usize,
        #[source]
        source: PublishError,
    },
}

/// A local, in-process reaction to domain events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Returns the handler name, used in errors and logs.
    fn name(&self) -> &'static str;

    /// Returns true if this handler wants the event.
    fn can_handle(&self, event: &AnyEvent) -> bool;

    /// Handles one event.
    async fn handle(&self, event: &AnyEvent) -> Result<(), HandlerError>;
}

/// Forwards dispatched events to an external system.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one dispatch batch, in order.
    async fn publish(&self, events: &[AnyEvent]) -> Result<(), PublishError>;
}

/// Delivers an aggregate's pending events, then clears its buffer.
///
/// Handlers run in registration order for every event, then the whole batch
/// goes to the publisher. The first failure aborts the dispatch and leaves
/// the buffer as it was, so a later retry sees the same events.
///
/// Build the dispatcher once at startup and share it behind an `Arc`.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no handlers and no publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler. Handlers run in the order they were registered.
    pub fn register(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Sets the external publisher.
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if an external publisher is configured.
    pub fn has_publisher(&self) -> bool {
        self.publisher.is_some()
    }

    /// Dispatches the aggregate's pending events and clears its buffer.
    ///
    /// Returns the number of events dispatched. An empty buffer is a
    /// successful dispatch of zero events.
    pub async fn dispatch<A: AggregateRoot>(
        &self,
        aggregate: &mut A,
    ) -> Result<usize, DispatchError> {
        let events: Vec<AnyEvent> = aggregate
            .pending_events()
            .iter()
            .cloned()
            .map(Into::into)
            .collect();

        if events.is_empty() {
            return Ok(0);
        }

        tracing::debug!(
            aggregate_type = A::record_type(),
            aggregate_id = %aggregate.id(),
            events = events.len(),
            "dispatching domain events"
        );

        if let Err(err) = self.deliver(&events).await {
            metrics::counter!(
                "domain_event_dispatch_failures_total",
                "aggregate" => A::record_type()
            )
            .increment(1);
            return Err(err);
        }

        aggregate.clear_events();
        metrics::counter!("domain_events_dispatched_total", "aggregate" => A::record_type())
            .increment(events.len() as u64);

        Ok(events.len())
    }

    /// Runs handlers and the publisher over a batch without touching any buffer.
    pub async fn deliver(&self, events: &[AnyEvent]) -> Result<(), DispatchError> {
        for event in events {
            for handler in &self.handlers {
                if !handler.can_handle(event) {
                    continue;
                }
                if let Err(source) = handler.handle(event).await {
                    tracing::warn!(
                        handler = handler.name(),
                        event_type = event.event_type(),
                        error = %source,
                        "event handler failed"
                    );
                    return Err(DispatchError::Handler {
                        handler: handler.name(),
                        event_type: event.event_type(),
                        source,
                    });
                }
            }
        }

        if let Some(publisher) = &self.publisher {
            publisher
                .publish(events)
                .await
                .map_err(|source| {
                    tracing::warn!(
                        batch_size = events.len(),
                        error = %source,
                        "event publisher failed"
                    );
                    DispatchError::Publisher {
                        batch_size: events.len(),
                        source,
                    }
                })?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("EventDispatcher")
            .field("handlers", &names)
            .field("publisher", &self.publisher.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;
    use crate::user::{User, UserEvent};
    use crate::Money;
    use common::EntityId;
    use tokio::sync::Mutex;

    /// Records every event it sees, optionally failing on one event type.
    struct RecordingHandler {
        name: &'static str,
        seen: Arc<Mutex<Vec<(&'static str, &'static str)>>>,
        fail_on: Option<&'static str>,
        only_users: bool,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        fn name(&self) -> &'static str {
            self.name
        }

        fn can_handle(&self, event: &AnyEvent) -> bool {
            !self.only_users || matches!(event, AnyEvent::User(_))
        }

        async fn handle(&self, event: &AnyEvent) -> Result<(), HandlerError> {
            if self.fail_on == Some(event.event_type()) {
                return Err(HandlerError::new("boom"));
            }
            self.seen.lock().await.push((self.name, event.event_type()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        batches: Mutex<Vec<Vec<&'static str>>>,
        fail: bool,
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(&self, events: &[AnyEvent]) -> Result<(), PublishError> {
            if self.fail {
                return Err(PublishError::new("bus down"));
            }
            self.batches
                .lock()
                .await
                .push(events.iter().map(|e| e.event_type()).collect());
            Ok(())
        }
    }

    type Seen = Arc<Mutex<Vec<(&'static str, &'static str)>>>;

    fn handler(
        name: &'static str,
        seen: &Seen,
        fail_on: Option<&'static str>,
    ) -> Arc<dyn EventHandler> {
        Arc::new(RecordingHandler {
            name,
            seen: Arc::clone(seen),
            fail_on,
            only_users: false,
        })
    }

    fn user_with_two_events() -> User {
        let mut user = User::create("alice@example.com", "alice", "Alice", "Liddell").unwrap();
        user.delete().unwrap();
        user
    }

    #[tokio::test]
    async fn empty_buffer_is_trivial_success() {
        let seen: Seen = Arc::default();
        let dispatcher = EventDispatcher::new().register(handler("a", &seen, None));
        let mut user = User::create("bob@example.com", "bob", "Bob", "B").unwrap();
        user.clear_events();

        let dispatched = dispatcher.dispatch(&mut user).await.unwrap();

        assert_eq!(dispatched, 0);
        assert!(seen.lock().await.is_empty());
    }

    #[tokio::test]
    async fn handlers_run_in_registration_order_per_event() {
        let seen: Seen = Arc::default();
        let publisher = Arc::new(RecordingPublisher::default());
        let dispatcher = EventDispatcher::new()
            .register(handler("first", &seen, None))
            .register(handler("second", &seen, None))
            .with_publisher(publisher.clone());
        let mut user = user_with_two_events();

        let dispatched = dispatcher.dispatch(&mut user).await.unwrap();

        assert_eq!(dispatched, 2);
        assert!(user.pending_events().is_empty());
        assert_eq!(
            *seen.lock().await,
            vec![
                ("first", "UserCreated"),
                ("second", "UserCreated"),
                ("first", "UserDeleted"),
                ("second", "UserDeleted"),
            ]
        );
        assert_eq!(
            *publisher.batches.lock().await,
            vec![vec!["UserCreated", "UserDeleted"]]
        );
    }

    #[tokio::test]
    async fn handler_failure_keeps_buffer_and_skips_publisher() {
        let seen: Seen = Arc::default();
        let publisher = Arc::new(RecordingPublisher::default());
        let dispatcher = EventDispatcher::new()
            .register(handler("ok", &seen, None))
            .register(handler("fails", &seen, Some("UserDeleted")))
            .with_publisher(publisher.clone());
        let mut user = user_with_two_events();

        let err = dispatcher.dispatch(&mut user).await.unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Handler {
                handler: "fails",
                event_type: "UserDeleted",
                ..
            }
        ));
        assert_eq!(user.pending_events().len(), 2);
        assert!(publisher.batches.lock().await.is_empty());
    }

    #[tokio::test]
    async fn publisher_failure_keeps_buffer() {
        let seen: Seen = Arc::default();
        let publisher = Arc::new(RecordingPublisher {
            fail: true,
            ..Default::default()
        });
        let dispatcher = EventDispatcher::new()
            .register(handler("ok", &seen, None))
            .with_publisher(publisher);
        let mut user = user_with_two_events();

        let err = dispatcher.dispatch(&mut user).await.unwrap_err();

        assert!(matches!(err, DispatchError::Publisher { batch_size: 2, .. }));
        assert_eq!(user.pending_events().len(), 2);
    }

    #[tokio::test]
    async fn retry_after_failure_sees_same_events() {
        let seen: Seen = Arc::default();
        let failing = EventDispatcher::new().register(handler("fails", &seen, Some("UserCreated")));
        let healthy = EventDispatcher::new().register(handler("ok", &seen, None));
        let mut user = User::create("carol@example.com", "carol", "Carol", "C").unwrap();

        assert!(failing.dispatch(&mut user).await.is_err());
        assert_eq!(healthy.dispatch(&mut user).await.unwrap(), 1);
        assert!(user.pending_events().is_empty());
    }

    #[tokio::test]
    async fn can_handle_filters_events() {
        let seen: Seen = Arc::default();
        let dispatcher = EventDispatcher::new().register(Arc::new(RecordingHandler {
            name: "users-only",
            seen: Arc::clone(&seen),
            fail_on: None,
            only_users: true,
        }));
        let mut product = Product::create(
            "Widget",
            "A widget",
            "WID-1",
            "tools",
            Money::from_cents(999),
            EntityId::new(),
        )
        .unwrap();

        assert_eq!(dispatcher.dispatch(&mut product).await.unwrap(), 1);
        assert!(seen.lock().await.is_empty());
        assert!(product.pending_events().is_empty());
    }

    #[tokio::test]
    async fn deliver_does_not_need_an_aggregate() {
        let seen: Seen = Arc::default();
        let dispatcher = EventDispatcher::new().register(handler("a", &seen, None));
        let events = vec![AnyEvent::from(UserEvent::user_deleted(EntityId::new()))];

        dispatcher.deliver(&events).await.unwrap();

        assert_eq!(*seen.lock().await, vec![("a", "UserDeleted")]);
    }

    #[test]
    fn debug_lists_handler_names() {
        let seen: Seen = Arc::default();
        let dispatcher = EventDispatcher::new().register(handler("logger", &seen, None));
        let debug = format!("{dispatcher:?}");
        assert!(debug.contains("logger"));
        assert_eq!(dispatcher.handler_count(), 1);
        assert!(!dispatcher.has_publisher());
    }
}
