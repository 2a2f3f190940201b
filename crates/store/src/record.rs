//! Contract between stored records and repositories.

use chrono::{DateTime, Utc};

use crate::{EntityId, Version};

/// A soft-deletable record that a [`Repository`](crate::Repository) can persist.
///
/// The repository only looks at identity, version and the soft-delete column.
/// Everything else is opaque to it.
pub trait Record: Clone + Send + Sync + 'static {
    /// Returns the record type name, used in errors and logs.
    fn record_type() -> &'static str;

    /// Returns the record identifier.
    fn id(&self) -> EntityId;

    /// Returns the creation timestamp. Listings are ordered by it.
    fn created_at(&self) -> DateTime<Utc>;

    /// Returns the soft-delete timestamp, if the record is deleted.
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Marks an active record deleted at `now`.
    ///
    /// Called by [`Repository::soft_delete`](crate::Repository::soft_delete).
    /// Implementations apply every side effect of their own soft delete
    /// (flags, owned children, timestamps) but raise no domain events.
    fn mark_deleted(&mut self, now: DateTime<Utc>);

    /// Clears the soft-delete mark of a deleted record at `now`.
    ///
    /// Called by [`Repository::restore`](crate::Repository::restore).
    fn mark_restored(&mut self, now: DateTime<Utc>);

    /// Returns the `(field, value)` pairs no two active records may share.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Returns the persisted version.
    fn version(&self) -> Version;

    /// Sets the persisted version.
    fn set_version(&mut self, version: Version);

    /// Returns a copy holding only the state that is persisted.
    ///
    /// Transient state (such as buffered domain events) must not be part of
    /// the copy.
    fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Returns true if the record is soft-deleted.
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}
