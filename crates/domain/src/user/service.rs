//! User service providing the user use cases.

use std::sync::Arc;

use common::EntityId;
use store::{ListQuery, Repository};

use crate::command::CommandHandler;
use crate::dispatcher::EventDispatcher;
use crate::error::DomainError;
use crate::repository::UserRepository;

use super::{ProfileDetails, User};

/// Service for managing users.
///
/// Every write follows the same path: validate, mutate the aggregate,
/// persist, then dispatch the raised events.
pub struct UserService {
    handler: CommandHandler<User, dyn UserRepository>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(repository: Arc<dyn UserRepository>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            handler: CommandHandler::new(repository, dispatcher),
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<User, dyn UserRepository> {
        &self.handler
    }

    /// Registers a new user.
    ///
    /// Email and username must not be held by another active user. The
    /// repository checks again when it stores the user, so concurrent
    /// registrations with one email cannot both succeed.
    #[tracing::instrument(skip(self))]
    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, DomainError> {
        let user = User::create(email, username, first_name, last_name)?;
        let repository = self.handler.repository();

        if repository.get_by_email(user.email()).await?.is_some() {
            return Err(DomainError::DuplicateKey {
                aggregate_type: "user",
                field: "email",
                value: user.email().to_string(),
            });
        }
        if repository.get_by_username(user.username()).await?.is_some() {
            return Err(DomainError::DuplicateKey {
                aggregate_type: "user",
                field: "username",
                value: user.username().to_string(),
            });
        }

        let user = self.handler.create(user).await?;
        tracing::info!(user_id = %user.id(), "user created");
        Ok(user)
    }

    /// Soft-deletes a user and its profile.
    #[tracing::instrument(skip(self))]
    pub async fn soft_delete_user(&self, id: EntityId) -> Result<User, DomainError> {
        self.handler.execute(id, |user| user.delete()).await
    }

    /// Restores a soft-deleted user. The profile stays deleted.
    ///
    /// Fails with `DuplicateKey` if another active user took the email or
    /// username in the meantime.
    #[tracing::instrument(skip(self))]
    pub async fn restore_user(&self, id: EntityId) -> Result<User, DomainError> {
        self.handler.execute(id, |user| user.restore()).await
    }

    /// Attaches a profile to an active user.
    #[tracing::instrument(skip(self, details))]
    pub async fn attach_profile(
        &self,
        id: EntityId,
        details: ProfileDetails,
    ) -> Result<User, DomainError> {
        self.handler
            .execute(id, |user| user.attach_profile(details).map(|_| ()))
            .await
    }

    /// Restores a profile that was deleted along with its user.
    #[tracing::instrument(skip(self))]
    pub async fn restore_user_profile(&self, id: EntityId) -> Result<User, DomainError> {
        self.handler.execute(id, |user| user.restore_profile()).await
    }

    /// Changes an active user's name.
    #[tracing::instrument(skip(self))]
    pub async fn update_user_name(
        &self,
        id: EntityId,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, DomainError> {
        self.handler
            .execute(id, |user| user.update_name(first_name, last_name))
            .await
    }

    /// Gets an active user.
    pub async fn get_user(&self, id: EntityId) -> Result<User, DomainError> {
        self.handler.load(id).await
    }

    /// Gets a user whether or not it is deleted.
    pub async fn get_user_including_deleted(&self, id: EntityId) -> Result<User, DomainError> {
        self.handler.load_including_deleted(id).await
    }

    /// Lists users in the query's visibility class.
    pub async fn list_users(&self, query: ListQuery) -> Result<Vec<User>, DomainError> {
        Ok(self.handler.repository().list(query).await?)
    }
}
