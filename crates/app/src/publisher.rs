//! External event publisher backed by a bounded channel.

use async_trait::async_trait;
use domain::{AnyEvent, EventPublisher, PublishError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Receiving side of the event channel. Each message is one dispatch batch.
pub type EventReceiver = mpsc::Receiver<Vec<AnyEvent>>;

/// Publishes each dispatched batch as one message on an `mpsc` channel.
///
/// The consumer (a message bus bridge, an outbox writer) owns the receiver.
/// Publishing never waits: it fails when the channel is full or the receiver
/// has been dropped, so a slow or absent consumer cannot stall a write.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: mpsc::Sender<Vec<AnyEvent>>,
}

impl ChannelPublisher {
    /// Creates a publisher and the receiver for its batches.
    pub fn channel(capacity: usize) -> (Self, EventReceiver) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Returns true if the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[async_trait]
impl EventPublisher for ChannelPublisher {
    async fn publish(&self, events: &[AnyEvent]) -> Result<(), PublishError> {
        self.sender
            .try_send(events.to_vec())
            .map_err(|err| match err {
                TrySendError::Full(_) => PublishError::new("event channel full"),
                TrySendError::Closed(_) => PublishError::new("event channel closed"),
            })?;

        metrics::counter!("events_published_total").increment(events.len() as u64);
        tracing::debug!(batch_size = events.len(), "published event batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{DomainEvent, EntityId, UserEvent};

    #[tokio::test]
    async fn batches_arrive_in_order() {
        let (publisher, mut receiver) = ChannelPublisher::channel(4);
        let first: AnyEvent = UserEvent::user_created(EntityId::new(), "a@b.c", "a").into();
        let second: AnyEvent = UserEvent::user_deleted(EntityId::new()).into();

        publisher.publish(&[first, second]).await.unwrap();

        let batch = receiver.recv().await.unwrap();
        let types: Vec<&str> = batch.iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["UserCreated", "UserDeleted"]);
    }

    #[tokio::test]
    async fn full_channel_is_an_error() {
        let (publisher, mut receiver) = ChannelPublisher::channel(1);
        let event: AnyEvent = UserEvent::user_deleted(EntityId::new()).into();

        publisher.publish(std::slice::from_ref(&event)).await.unwrap();
        let err = publisher.publish(&[event]).await.unwrap_err();
        assert_eq!(err.to_string(), "event channel full");

        assert_eq!(receiver.recv().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn closed_receiver_is_an_error() {
        let (publisher, receiver) = ChannelPublisher::channel(1);
        drop(receiver);

        assert!(publisher.is_closed());
        let event: AnyEvent = UserEvent::user_deleted(EntityId::new()).into();
        assert!(publisher.publish(&[event]).await.is_err());
    }
}
