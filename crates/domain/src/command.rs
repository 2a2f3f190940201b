//! Load, mutate, persist, dispatch: the write path shared by the aggregate services.

use std::marker::PhantomData;
use std::sync::Arc;

use common::EntityId;
use store::Repository;

use crate::aggregate::AggregateRoot;
use crate::dispatcher::EventDispatcher;
use crate::error::DomainError;

/// Runs mutations against aggregates stored in a repository.
///
/// Every write goes through two separate steps: [`persist`](Self::persist)
/// and then [`publish_events`](Self::publish_events). Events are never
/// dispatched for a write that failed to persist. If dispatch fails after a
/// successful persist the write stays durable and the error is returned to
/// the caller.
///
/// `R` is usually an aggregate-specific repository port held as a trait
/// object, e.g. `CommandHandler<User, dyn UserRepository>`.
pub struct CommandHandler<A, R: ?Sized> {
    repository: Arc<R>,
    dispatcher: Arc<EventDispatcher>,
    _phantom: PhantomData<fn() -> A>,
}

impl<A, R> CommandHandler<A, R>
where
    A: AggregateRoot,
    R: Repository<A> + ?Sized,
{
    /// Creates a handler over the given repository and dispatcher.
    pub fn new(repository: Arc<R>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            repository,
            dispatcher,
            _phantom: PhantomData,
        }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Loads an active aggregate.
    pub async fn load(&self, id: EntityId) -> Result<A, DomainError> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(A::record_type(), id))
    }

    /// Loads an aggregate whether or not it is deleted.
    ///
    /// Fails with `NotFound` only if no record exists at all.
    pub async fn load_including_deleted(&self, id: EntityId) -> Result<A, DomainError> {
        self.repository
            .get_by_id_including_deleted(id)
            .await?
            .ok_or_else(|| DomainError::not_found(A::record_type(), id))
    }

    /// Stores a freshly created aggregate and dispatches its events.
    pub async fn create(&self, mut aggregate: A) -> Result<A, DomainError> {
        let version = self.repository.create(&aggregate).await?;
        aggregate.set_version(version);
        metrics::counter!(
            "aggregate_writes_total",
            "aggregate" => A::record_type(),
            "op" => "create"
        )
        .increment(1);

        self.publish_events(&mut aggregate).await?;
        Ok(aggregate)
    }

    /// Loads an aggregate (including deleted), applies a mutation, persists
    /// it and dispatches the raised events.
    ///
    /// The mutation decides whether a deleted aggregate may be changed.
    pub async fn execute<F>(&self, id: EntityId, command_fn: F) -> Result<A, DomainError>
    where
        F: FnOnce(&mut A) -> Result<(), DomainError> + Send,
    {
        let mut aggregate = self.load_including_deleted(id).await?;
        command_fn(&mut aggregate)?;

        self.persist(&mut aggregate).await?;
        self.publish_events(&mut aggregate).await?;
        Ok(aggregate)
    }

    /// Writes the aggregate back with a version check.
    pub async fn persist(&self, aggregate: &mut A) -> Result<(), DomainError> {
        let version = self.repository.update(aggregate).await?;
        aggregate.set_version(version);
        metrics::counter!(
            "aggregate_writes_total",
            "aggregate" => A::record_type(),
            "op" => "update"
        )
        .increment(1);
        Ok(())
    }

    /// Dispatches the aggregate's pending events.
    pub async fn publish_events(&self, aggregate: &mut A) -> Result<usize, DomainError> {
        self.dispatcher.dispatch(aggregate).await.map_err(|err| {
            tracing::error!(
                aggregate_type = A::record_type(),
                aggregate_id = %aggregate.id(),
                error = %err,
                "write persisted but event dispatch failed"
            );
            DomainError::from(err)
        })
    }
}
