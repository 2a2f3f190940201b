//! Entity lifecycle record and the soft-delete state machine.
//!
//! Every aggregate and every child entity embeds a [`Lifecycle`]. It owns the
//! identity and the timestamps, and it is the only place where the
//! `Active`/`Deleted` state can change.

use chrono::{DateTime, Utc};
use common::EntityId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Soft-delete state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// The entity is visible to default reads.
    Active,

    /// The entity has been logically deleted.
    Deleted,
}

impl LifecycleState {
    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Active => "active",
            LifecycleState::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Delete was requested on an entity that is already deleted.
    #[error("entity {0} is already deleted")]
    AlreadyDeleted(EntityId),

    /// Restore was requested on an entity that is not deleted.
    #[error("entity {0} is not deleted")]
    NotDeleted(EntityId),
}

/// Identity, timestamps and soft-delete marker of an entity.
///
/// `created_at` never changes after construction. `deleted_at` is `None`
/// while the entity is active. A delete on a deleted entity and a restore on
/// an active entity are errors, never silent no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    id: EntityId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Lifecycle {
    /// Creates an active lifecycle with a fresh identifier.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_id(EntityId::new(), now)
    }

    /// Creates an active lifecycle with the given identifier.
    pub fn with_id(id: EntityId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns true if the entity is logically deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the current state.
    pub fn state(&self) -> LifecycleState {
        if self.is_deleted() {
            LifecycleState::Deleted
        } else {
            LifecycleState::Active
        }
    }

    /// Refreshes the update timestamp after an ordinary mutation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Transitions `Active -> Deleted`.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        if self.is_deleted() {
            return Err(LifecycleError::AlreadyDeleted(self.id));
        }
        self.deleted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Transitions `Deleted -> Active`.
    pub fn restore(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        if !self.is_deleted() {
            return Err(LifecycleError::NotDeleted(self.id));
        }
        self.deleted_at = None;
        self.updated_at = now;
        Ok(())
    }
}
