use serde::{Deserialize, Serialize};

use crate::Record;

/// Which records a listing may return, based on their soft-delete state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only records that are not deleted.
    #[default]
    Active,

    /// Active and deleted records.
    All,

    /// Only deleted records.
    DeletedOnly,
}

impl Visibility {
    /// Returns true if a record with the given deleted flag is visible.
    pub fn includes(&self, is_deleted: bool) -> bool {
        match self {
            Visibility::Active => !is_deleted,
            Visibility::All => true,
            Visibility::DeletedOnly => is_deleted,
        }
    }
}

/// Builder for listing queries.
///
/// Filters by visibility first, then applies offset and limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Which soft-delete states to include.
    pub visibility: Visibility,

    /// Number of records to skip.
    pub offset: Option<usize>,

    /// Maximum number of records to return.
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Creates a query for active records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for active records.
    pub fn active() -> Self {
        Self::default()
    }

    /// Creates a query for active and deleted records.
    pub fn including_deleted() -> Self {
        Self {
            visibility: Visibility::All,
            ..Default::default()
        }
    }

    /// Creates a query for deleted records only.
    pub fn deleted_only() -> Self {
        Self {
            visibility: Visibility::DeletedOnly,
            ..Default::default()
        }
    }

    /// Sets the visibility class.
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Skips the first `offset` matching records.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns at most `limit` records.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the record passes the visibility filter.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.visibility.includes(record.is_deleted())
    }

    /// Applies offset and limit to an already filtered, ordered list.
    pub fn paginate<T>(&self, records: Vec<T>) -> Vec<T> {
        let offset = self.offset.unwrap_or(0);
        let records = records.into_iter().skip(offset);
        match self.limit {
            Some(limit) => records.take(limit).collect(),
            None => records.collect(),
        }
    }
}
