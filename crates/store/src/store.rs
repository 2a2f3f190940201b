use async_trait::async_trait;

use crate::{EntityId, ListQuery, Record, Result, Version};

/// Core trait for repository implementations.
///
/// A repository persists whole records. Lookups by id come in two flavors:
/// [`get_by_id`](Repository::get_by_id) only sees active records, while
/// [`get_by_id_including_deleted`](Repository::get_by_id_including_deleted)
/// ignores the soft-delete column. A missing record is `Ok(None)`, never an
/// error, so callers can tell "absent" apart from a backend failure.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// Inserts a new record.
    ///
    /// Fails with `DuplicateId` if the identifier is taken and with
    /// `UniqueViolation` if another active record holds one of its
    /// [`unique_keys`](Record::unique_keys). Returns the version assigned to
    /// the stored record.
    async fn create(&self, record: &R) -> Result<Version>;

    /// Retrieves an active record by id.
    async fn get_by_id(&self, id: EntityId) -> Result<Option<R>>;

    /// Retrieves a record by id regardless of its soft-delete state.
    async fn get_by_id_including_deleted(&self, id: EntityId) -> Result<Option<R>>;

    /// Replaces a stored record.
    ///
    /// The stored version must equal `record.version()`, otherwise the write
    /// fails with `ConcurrencyConflict`. An active record is checked for
    /// `UniqueViolation` like on create. Returns the new version.
    async fn update(&self, record: &R) -> Result<Version>;

    /// Soft-deletes a stored record through [`Record::mark_deleted`].
    ///
    /// No domain events are raised. Fails with `AlreadyDeleted` on a deleted
    /// record.
    async fn soft_delete(&self, id: EntityId) -> Result<()>;

    /// Restores a stored record through [`Record::mark_restored`].
    ///
    /// Fails with `NotDeleted` on an active record and with
    /// `UniqueViolation` if its unique values were taken in the meantime.
    async fn restore(&self, id: EntityId) -> Result<()>;

    /// Physically removes a record. This cannot be undone.
    async fn delete(&self, id: EntityId) -> Result<()>;

    /// Lists records matching the query, ordered by creation time.
    async fn list(&self, query: ListQuery) -> Result<Vec<R>>;
}

/// Extension trait providing convenience methods for repositories.
#[async_trait]
pub trait RepositoryExt<R: Record>: Repository<R> {
    /// Checks if a record exists, deleted or not.
    async fn exists(&self, id: EntityId) -> Result<bool> {
        Ok(self.get_by_id_including_deleted(id).await?.is_some())
    }

    /// Counts the records visible to the query, ignoring offset and limit.
    async fn count(&self, query: ListQuery) -> Result<usize> {
        let query = ListQuery {
            offset: None,
            limit: None,
            ..query
        };
        Ok(self.list(query).await?.len())
    }
}

// Blanket implementation for all Repository implementations
impl<R: Record, T: Repository<R> + ?Sized> RepositoryExt<R> for T {}
