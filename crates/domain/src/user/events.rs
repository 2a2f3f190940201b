//! User domain events.

use chrono::{DateTime, Utc};
use common::EntityId;
use serde::{Deserialize, Serialize};

use crate::event::DomainEvent;

/// Events that can occur on a user aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserEvent {
    /// User was created.
    UserCreated(UserCreatedData),

    /// User was soft-deleted.
    UserDeleted(UserDeletedData),
}

impl DomainEvent for UserEvent {
    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::UserCreated(_) => "UserCreated",
            UserEvent::UserDeleted(_) => "UserDeleted",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            UserEvent::UserCreated(data) => data.occurred_at,
            UserEvent::UserDeleted(data) => data.occurred_at,
        }
    }

    fn subject_id(&self) -> EntityId {
        match self {
            UserEvent::UserCreated(data) => data.user_id,
            UserEvent::UserDeleted(data) => data.user_id,
        }
    }
}

/// Data for UserCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreatedData {
    pub user_id: EntityId,
    pub email: String,
    pub username: String,
    pub occurred_at: DateTime<Utc>,
}

/// Data for UserDeleted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDeletedData {
    pub user_id: EntityId,
    pub occurred_at: DateTime<Utc>,
}

// Convenience constructors for events
impl UserEvent {
    pub fn user_created(
        user_id: EntityId,
        email: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        UserEvent::UserCreated(UserCreatedData {
            user_id,
            email: email.into(),
            username: username.into(),
            occurred_at: Utc::now(),
        })
    }

    pub fn user_deleted(user_id: EntityId) -> Self {
        UserEvent::UserDeleted(UserDeletedData {
            user_id,
            occurred_at: Utc::now(),
        })
    }
}
