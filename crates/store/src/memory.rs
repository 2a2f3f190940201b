use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    EntityId, ListQuery, Record, Result, StoreError, Version,
    store::Repository,
};

/// In-memory repository implementation.
///
/// Stores persistent snapshots of records in a map guarded by an async
/// `RwLock`. Cloning the repository shares the underlying map.
pub struct InMemoryRepository<R> {
    records: Arc<RwLock<HashMap<EntityId, R>>>,
}

impl<R> Clone for InMemoryRepository<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<R> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<R: Record> InMemoryRepository<R> {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored records, deleted or not.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Removes every record.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Returns the first active record matching the predicate.
    ///
    /// Used by uniqueness lookups, which only consider active records.
    pub async fn find_active<F>(&self, predicate: F) -> Option<R>
    where
        F: Fn(&R) -> bool,
    {
        let records = self.records.read().await;
        let mut matches: Vec<&R> = records
            .values()
            .filter(|r| !r.is_deleted() && predicate(*r))
            .collect();
        matches.sort_by_key(|r| (r.created_at(), r.id()));
        matches.first().map(|r| (*r).clone())
    }

    /// Lists records matching both the query and the predicate.
    pub async fn list_where<F>(&self, query: ListQuery, predicate: F) -> Vec<R>
    where
        F: Fn(&R) -> bool,
    {
        let records = self.records.read().await;
        let mut matches: Vec<R> = records
            .values()
            .filter(|r| query.matches(*r) && predicate(*r))
            .cloned()
            .collect();
        matches.sort_by_key(|r| (r.created_at(), r.id()));
        query.paginate(matches)
    }

    /// Rejects `record` if it is active and another active record shares
    /// one of its unique keys.
    fn check_unique(records: &HashMap<EntityId, R>, record: &R) -> Result<()> {
        if record.is_deleted() {
            return Ok(());
        }

        for (field, value) in record.unique_keys() {
            let taken = records
                .values()
                .filter(|other| other.id() != record.id() && !other.is_deleted())
                .any(|other| {
                    other
                        .unique_keys()
                        .iter()
                        .any(|(f, v)| *f == field && *v == value)
                });
            if taken {
                return Err(StoreError::UniqueViolation {
                    record_type: R::record_type(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }

    fn not_found(id: EntityId) -> StoreError {
        StoreError::NotFound {
            record_type: R::record_type(),
            id,
        }
    }
}

#[async_trait]
impl<R: Record> Repository<R> for InMemoryRepository<R> {
    async fn create(&self, record: &R) -> Result<Version> {
        let id = record.id();
        let mut records = self.records.write().await;

        if records.contains_key(&id) {
            return Err(StoreError::DuplicateId {
                record_type: R::record_type(),
                id,
            });
        }
        Self::check_unique(&records, record)?;

        let mut stored = record.snapshot();
        stored.set_version(Version::first());
        records.insert(id, stored);

        tracing::debug!(record_type = R::record_type(), %id, "record created");
        metrics::counter!("store_writes_total", "op" => "create").increment(1);

        Ok(Version::first())
    }

    async fn get_by_id(&self, id: EntityId) -> Result<Option<R>> {
        let records = self.records.read().await;
        Ok(records.get(&id).filter(|r| !r.is_deleted()).cloned())
    }

    async fn get_by_id_including_deleted(&self, id: EntityId) -> Result<Option<R>> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn update(&self, record: &R) -> Result<Version> {
        let id = record.id();
        let mut records = self.records.write().await;

        let current = records.get(&id).ok_or_else(|| Self::not_found(id))?;
        let actual = current.version();
        let expected = record.version();

        if actual != expected {
            return Err(StoreError::ConcurrencyConflict {
                record_type: R::record_type(),
                id,
                expected,
                actual,
            });
        }
        Self::check_unique(&records, record)?;

        let new_version = actual.next();
        let mut stored = record.snapshot();
        stored.set_version(new_version);
        records.insert(id, stored);

        metrics::counter!("store_writes_total", "op" => "update").increment(1);

        Ok(new_version)
    }

    async fn soft_delete(&self, id: EntityId) -> Result<()> {
        let mut records = self.records.write().await;
        let stored = records.get_mut(&id).ok_or_else(|| Self::not_found(id))?;

        if stored.is_deleted() {
            return Err(StoreError::AlreadyDeleted {
                record_type: R::record_type(),
                id,
            });
        }

        stored.mark_deleted(Utc::now());
        let next = stored.version().next();
        stored.set_version(next);

        metrics::counter!("store_writes_total", "op" => "soft_delete").increment(1);
        Ok(())
    }

    async fn restore(&self, id: EntityId) -> Result<()> {
        let mut records = self.records.write().await;
        let mut restored = records
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))?;

        if !restored.is_deleted() {
            return Err(StoreError::NotDeleted {
                record_type: R::record_type(),
                id,
            });
        }

        restored.mark_restored(Utc::now());
        Self::check_unique(&records, &restored)?;
        let next = restored.version().next();
        restored.set_version(next);
        records.insert(id, restored);

        metrics::counter!("store_writes_total", "op" => "restore").increment(1);
        Ok(())
    }

    async fn delete(&self, id: EntityId) -> Result<()> {
        let mut records = self.records.write().await;
        records.remove(&id).ok_or_else(|| Self::not_found(id))?;

        tracing::debug!(record_type = R::record_type(), %id, "record hard deleted");
        metrics::counter!("store_writes_total", "op" => "delete").increment(1);
        Ok(())
    }

    async fn list(&self, query: ListQuery) -> Result<Vec<R>> {
        Ok(self.list_where(query, |_| true).await)
    }
}
