use thiserror::Error;

use crate::{EntityId, Version};

/// Errors that can occur when interacting with a repository.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the identifier, deleted or not.
    #[error("{record_type} not found: {id}")]
    NotFound {
        record_type: &'static str,
        id: EntityId,
    },

    /// A record with the same identifier has already been created.
    #[error("{record_type} already exists: {id}")]
    DuplicateId {
        record_type: &'static str,
        id: EntityId,
    },

    /// The stored version did not match the version the caller loaded.
    #[error(
        "Concurrency conflict for {record_type} {id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        record_type: &'static str,
        id: EntityId,
        expected: Version,
        actual: Version,
    },

    /// A soft delete was requested for a record that is already deleted.
    #[error("{record_type} {id} is already deleted")]
    AlreadyDeleted {
        record_type: &'static str,
        id: EntityId,
    },

    /// A restore was requested for a record that is not deleted.
    #[error("{record_type} {id} is not deleted")]
    NotDeleted {
        record_type: &'static str,
        id: EntityId,
    },

    /// Another active record already holds a value that must be unique.
    #[error("{record_type} with {field} '{value}' already exists")]
    UniqueViolation {
        record_type: &'static str,
        field: &'static str,
        value: String,
    },

    /// The backing store could not be reached or rejected the operation.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true if this error reports a missing record rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StoreError>;
