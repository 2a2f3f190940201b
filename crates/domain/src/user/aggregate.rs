//! User aggregate implementation.

use chrono::{DateTime, Utc};
use common::{EntityId, Version};
use serde::{Deserialize, Serialize};
use store::Record;

use crate::aggregate::AggregateRoot;
use crate::error::DomainError;
use crate::event::EventBuffer;
use crate::lifecycle::Lifecycle;

use super::{Profile, ProfileDetails, UserEvent};

const AGGREGATE_TYPE: &str = "user";

/// User aggregate root.
///
/// Owns at most one [`Profile`]. Deleting a user soft-deletes the profile in
/// the same mutation. Restoring a user leaves the profile deleted; call
/// [`User::restore_profile`] to bring it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    lifecycle: Lifecycle,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    is_active: bool,
    profile: Option<Profile>,
    version: Version,
    #[serde(skip)]
    events: EventBuffer<UserEvent>,
}

impl User {
    /// Creates a new active user and raises `UserCreated`.
    ///
    /// The email is trimmed and lowercased, the username is trimmed.
    pub fn create(
        email: &str,
        username: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Self, DomainError> {
        let email = email.trim().to_lowercase();
        let username = username.trim().to_string();

        if email.is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        if !email.contains('@') {
            return Err(DomainError::validation(format!("invalid email: {email}")));
        }
        if username.is_empty() {
            return Err(DomainError::validation("username is required"));
        }

        let lifecycle = Lifecycle::new(Utc::now());
        let mut events = EventBuffer::new();
        events.push(UserEvent::user_created(lifecycle.id(), &email, &username));

        Ok(Self {
            lifecycle,
            email,
            username,
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            is_active: true,
            profile: None,
            version: Version::initial(),
            events,
        })
    }

    pub fn id(&self) -> EntityId {
        self.lifecycle.id()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_deleted(&self) -> bool {
        self.lifecycle.is_deleted()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Attaches a profile to an active user.
    ///
    /// Fails if the user already has an active profile. A profile left
    /// deleted by an earlier user delete is replaced.
    pub fn attach_profile(&mut self, details: ProfileDetails) -> Result<&Profile, DomainError> {
        self.ensure_active()?;
        if self.profile.as_ref().is_some_and(|p| !p.is_deleted()) {
            return Err(DomainError::validation("user already has a profile"));
        }

        let now = Utc::now();
        let profile = Profile::new(self.id(), details, now);
        self.lifecycle.touch(now);
        Ok(self.profile.insert(profile))
    }

    /// Restores a profile that was soft-deleted together with the user.
    pub fn restore_profile(&mut self) -> Result<(), DomainError> {
        self.ensure_active()?;
        let now = Utc::now();
        let profile = self
            .profile
            .as_mut()
            .ok_or_else(|| DomainError::validation("user has no profile"))?;
        profile
            .restore(now)
            .map_err(|e| DomainError::lifecycle("profile", e))?;
        self.lifecycle.touch(now);
        Ok(())
    }

    /// Changes the user's display name.
    pub fn update_name(&mut self, first_name: &str, last_name: &str) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.first_name = first_name.trim().to_string();
        self.last_name = last_name.trim().to_string();
        self.lifecycle.touch(Utc::now());
        Ok(())
    }

    /// Soft-deletes the user and its profile, then raises `UserDeleted`.
    ///
    /// On an already deleted user this fails and raises nothing.
    pub fn delete(&mut self) -> Result<(), DomainError> {
        self.soft_delete_at(Utc::now())?;
        self.events.push(UserEvent::user_deleted(self.id()));
        Ok(())
    }

    /// Restores a deleted user. Raises no event and leaves the profile deleted.
    pub fn restore(&mut self) -> Result<(), DomainError> {
        self.restore_at(Utc::now())
    }

    fn soft_delete_at(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.lifecycle
            .soft_delete(now)
            .map_err(|e| DomainError::lifecycle(AGGREGATE_TYPE, e))?;
        self.is_active = false;

        if let Some(profile) = self.profile.as_mut().filter(|p| !p.is_deleted()) {
            profile
                .soft_delete(now)
                .map_err(|e| DomainError::lifecycle("profile", e))?;
        }
        Ok(())
    }

    fn restore_at(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.lifecycle
            .restore(now)
            .map_err(|e| DomainError::lifecycle(AGGREGATE_TYPE, e))?;
        self.is_active = true;
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_deleted() {
            return Err(DomainError::AlreadyDeleted {
                aggregate_type: AGGREGATE_TYPE,
                id: self.id(),
            });
        }
        Ok(())
    }
}

impl Record for User {
    fn record_type() -> &'static str {
        AGGREGATE_TYPE
    }

    fn id(&self) -> EntityId {
        self.lifecycle.id()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.lifecycle.created_at()
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.lifecycle.deleted_at()
    }

    fn mark_deleted(&mut self, now: DateTime<Utc>) {
        // Repositories only call this on an active user.
        let _ = self.soft_delete_at(now);
    }

    fn mark_restored(&mut self, now: DateTime<Utc>) {
        let _ = self.restore_at(now);
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("email", self.email.clone()),
            ("username", self.username.clone()),
        ]
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn snapshot(&self) -> Self {
        Self {
            events: EventBuffer::new(),
            ..self.clone()
        }
    }
}

impl AggregateRoot for User {
    type Event = UserEvent;

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn events(&self) -> &EventBuffer<UserEvent> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventBuffer<UserEvent> {
        &mut self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DomainEvent;
    use crate::lifecycle::LifecycleState;
    use chrono::NaiveDate;

    fn alice() -> User {
        User::create("Alice@Example.com ", " alice", "Alice", "Liddell").unwrap()
    }

    #[test]
    fn create_raises_exactly_one_created_event() {
        let user = alice();

        assert!(!user.is_deleted());
        assert!(user.is_active());
        assert_eq!(user.email(), "alice@example.com");
        assert_eq!(user.username(), "alice");
        assert_eq!(user.version(), Version::initial());
        assert_eq!(user.pending_events().len(), 1);
        assert!(matches!(
            &user.pending_events()[0],
            UserEvent::UserCreated(data)
                if data.user_id == user.id() && data.email == "alice@example.com"
        ));
    }

    #[test]
    fn create_rejects_missing_fields() {
        assert!(matches!(
            User::create("", "alice", "A", "L"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            User::create("not-an-email", "alice", "A", "L"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            User::create("alice@example.com", "   ", "A", "L"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn delete_deactivates_and_raises_deleted() {
        let mut user = alice();
        user.clear_events();

        user.delete().unwrap();

        assert!(user.is_deleted());
        assert!(!user.is_active());
        assert_eq!(user.state(), LifecycleState::Deleted);
        assert_eq!(user.pending_events().len(), 1);
        assert_eq!(user.pending_events()[0].event_type(), "UserDeleted");
    }

    #[test]
    fn second_delete_fails_without_new_event() {
        let mut user = alice();
        user.delete().unwrap();

        let err = user.delete().unwrap_err();

        assert!(matches!(err, DomainError::AlreadyDeleted { aggregate_type: "user", .. }));
        let deleted_events = user
            .pending_events()
            .iter()
            .filter(|e| e.event_type() == "UserDeleted")
            .count();
        assert_eq!(deleted_events, 1);
    }

    #[test]
    fn restore_never_deleted_fails_and_changes_nothing() {
        let mut user = alice();
        let updated_at = user.lifecycle().updated_at();

        let err = user.restore().unwrap_err();

        assert!(matches!(err, DomainError::NotDeleted { aggregate_type: "user", .. }));
        assert_eq!(err.to_string(), "user is not deleted");
        assert!(!user.is_deleted());
        assert_eq!(user.lifecycle().updated_at(), updated_at);
        assert_eq!(user.pending_events().len(), 1);
    }

    #[test]
    fn delete_then_restore_is_active_without_event() {
        let mut user = alice();
        user.delete().unwrap();
        user.clear_events();

        user.restore().unwrap();

        assert!(!user.is_deleted());
        assert!(user.is_active());
        assert!(user.pending_events().is_empty());
    }

    #[test]
    fn delete_cascades_to_profile_and_restore_does_not() {
        let mut user = alice();
        user.attach_profile(ProfileDetails::new().bio("hello")).unwrap();

        user.delete().unwrap();
        assert!(user.profile().unwrap().is_deleted());

        user.restore().unwrap();
        assert!(user.profile().unwrap().is_deleted());

        user.restore_profile().unwrap();
        assert!(!user.profile().unwrap().is_deleted());
        assert_eq!(user.profile().unwrap().bio(), Some("hello"));
    }

    #[test]
    fn attach_profile_rules() {
        let mut user = alice();
        let dob = NaiveDate::from_ymd_opt(1990, 5, 17).unwrap();

        let profile = user
            .attach_profile(ProfileDetails::new().avatar("a.png").date_of_birth(dob))
            .unwrap();
        assert_eq!(profile.date_of_birth(), Some(dob));
        assert_eq!(profile.user_id(), user.id());

        assert!(matches!(
            user.attach_profile(ProfileDetails::new()),
            Err(DomainError::Validation(_))
        ));

        user.delete().unwrap();
        assert!(matches!(
            user.attach_profile(ProfileDetails::new()),
            Err(DomainError::AlreadyDeleted { .. })
        ));
    }

    #[test]
    fn restore_profile_without_profile_fails() {
        let mut user = alice();
        assert!(matches!(user.restore_profile(), Err(DomainError::Validation(_))));

        user.attach_profile(ProfileDetails::new()).unwrap();
        assert!(matches!(
            user.restore_profile(),
            Err(DomainError::NotDeleted { aggregate_type: "profile", .. })
        ));
    }

    #[test]
    fn update_name_requires_active_user() {
        let mut user = alice();
        user.update_name("Alicia", "L.").unwrap();
        assert_eq!(user.full_name(), "Alicia L.");

        user.delete().unwrap();
        assert!(user.update_name("X", "Y").is_err());
        assert_eq!(user.first_name(), "Alicia");
    }

    #[test]
    fn snapshot_drops_pending_events() {
        let user = alice();
        let snapshot = user.snapshot();

        assert!(snapshot.pending_events().is_empty());
        assert_eq!(snapshot.email(), user.email());
        assert_eq!(user.pending_events().len(), 1);
    }

    #[test]
    fn serialization_skips_event_buffer() {
        let user = alice();
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("events").is_none());

        let back: User = serde_json::from_value(json).unwrap();
        assert_eq!(back.id(), user.id());
        assert!(back.pending_events().is_empty());
    }
}
