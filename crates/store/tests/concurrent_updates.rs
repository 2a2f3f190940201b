//! Concurrency tests for the in-memory repository.
//!
//! Two writers that loaded the same version race to update; the version
//! check must let exactly one of them through.

use chrono::{DateTime, Utc};
use store::{EntityId, InMemoryRepository, ListQuery, Record, Repository, StoreError, Version};

#[derive(Debug, Clone)]
struct Counter {
    id: EntityId,
    value: u32,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    version: Version,
}

impl Record for Counter {
    fn record_type() -> &'static str {
        "counter"
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
    }

    fn mark_restored(&mut self, _now: DateTime<Utc>) {
        self.deleted_at = None;
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

fn counter() -> Counter {
    Counter {
        id: EntityId::new(),
        value: 0,
        created_at: Utc::now(),
        deleted_at: None,
        version: Version::initial(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_writers_on_same_version_only_one_wins() {
    let repo: InMemoryRepository<Counter> = InMemoryRepository::new();
    let mut record = counter();
    record.version = repo.create(&record).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let repo = repo.clone();
        let mut copy = record.clone();
        handles.push(tokio::spawn(async move {
            copy.value = i + 1;
            repo.update(&copy).await
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(version) => {
                assert_eq!(version, Version::new(2));
                successes += 1;
            }
            Err(StoreError::ConcurrencyConflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn writers_on_different_records_do_not_interfere() {
    let repo: InMemoryRepository<Counter> = InMemoryRepository::new();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            let mut record = counter();
            record.version = repo.create(&record).await?;
            record.value = 42;
            repo.update(&record).await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), Version::new(2));
    }

    let all = repo.list(ListQuery::active()).await.unwrap();
    assert_eq!(all.len(), 10);
    assert!(all.iter().all(|c| c.value == 42));
}
