//! Domain error types.

use common::EntityId;
use store::StoreError;
use thiserror::Error;

use crate::dispatcher::DispatchError;
use crate::lifecycle::LifecycleError;
use crate::order::OrderStatus;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No record with this id exists, deleted or not.
    #[error("{aggregate_type} not found: {id}")]
    NotFound {
        aggregate_type: &'static str,
        id: EntityId,
    },

    /// The aggregate is deleted and the operation needs it active.
    #[error("{aggregate_type} is already deleted")]
    AlreadyDeleted {
        aggregate_type: &'static str,
        id: EntityId,
    },

    /// Restore was requested on an active aggregate.
    #[error("{aggregate_type} is not deleted")]
    NotDeleted {
        aggregate_type: &'static str,
        id: EntityId,
    },

    /// An active aggregate already holds a unique value.
    #[error("{aggregate_type} with {field} '{value}' already exists")]
    DuplicateKey {
        aggregate_type: &'static str,
        field: &'static str,
        value: String,
    },

    /// Input rejected by a business rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The order state machine does not allow this change.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// The write was persisted but dispatching its events failed.
    #[error("Event dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// An error occurred in the repository.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation {
                record_type,
                field,
                value,
            } => DomainError::DuplicateKey {
                aggregate_type: record_type,
                field,
                value,
            },
            other => DomainError::Store(other),
        }
    }
}

impl DomainError {
    /// Tags a lifecycle transition error with the aggregate type.
    pub fn lifecycle(aggregate_type: &'static str, err: LifecycleError) -> Self {
        match err {
            LifecycleError::AlreadyDeleted(id) => {
                DomainError::AlreadyDeleted { aggregate_type, id }
            }
            LifecycleError::NotDeleted(id) => DomainError::NotDeleted { aggregate_type, id },
        }
    }

    pub fn not_found(aggregate_type: &'static str, id: EntityId) -> Self {
        DomainError::NotFound { aggregate_type, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }
}
