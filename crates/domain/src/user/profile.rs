use chrono::{DateTime, NaiveDate, Utc};
use common::EntityId;
use serde::{Deserialize, Serialize};

use crate::lifecycle::{Lifecycle, LifecycleError};

/// Optional personal details owned by a [`User`](super::User).
///
/// A profile is only created through [`User::attach_profile`](super::User::attach_profile)
/// and is soft-deleted together with its user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    lifecycle: Lifecycle,
    user_id: EntityId,
    bio: Option<String>,
    avatar: Option<String>,
    date_of_birth: Option<NaiveDate>,
}

impl Profile {
    pub(crate) fn new(
        user_id: EntityId,
        details: ProfileDetails,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::new(now),
            user_id,
            bio: details.bio,
            avatar: details.avatar,
            date_of_birth: details.date_of_birth,
        }
    }

    pub fn id(&self) -> EntityId {
        self.lifecycle.id()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn user_id(&self) -> EntityId {
        self.user_id
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn is_deleted(&self) -> bool {
        self.lifecycle.is_deleted()
    }

    pub(crate) fn soft_delete(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        self.lifecycle.soft_delete(now)
    }

    pub(crate) fn restore(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        self.lifecycle.restore(now)
    }
}

/// Input for attaching a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl ProfileDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    pub fn date_of_birth(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = Some(date_of_birth);
        self
    }
}
