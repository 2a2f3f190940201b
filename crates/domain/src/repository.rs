//! Aggregate-specific repository ports and their in-memory adapters.

use async_trait::async_trait;
use common::EntityId;
use store::{InMemoryRepository, ListQuery, Repository};

use crate::order::Order;
use crate::product::Product;
use crate::user::User;

/// Storage port for users.
///
/// Uniqueness lookups only see active users, so a deleted user's email or
/// username can be taken again.
#[async_trait]
pub trait UserRepository: Repository<User> {
    /// Finds the active user with this email.
    async fn get_by_email(&self, email: &str) -> store::Result<Option<User>>;

    /// Finds the active user with this username.
    async fn get_by_username(&self, username: &str) -> store::Result<Option<User>>;
}

/// Storage port for products.
#[async_trait]
pub trait ProductRepository: Repository<Product> {
    /// Finds the active product with this SKU.
    async fn get_by_sku(&self, sku: &str) -> store::Result<Option<Product>>;
}

/// Storage port for orders.
#[async_trait]
pub trait OrderRepository: Repository<Order> {
    /// Lists a user's orders, filtered and paged by the query.
    async fn list_by_user(&self, user_id: EntityId, query: ListQuery) -> store::Result<Vec<Order>>;
}

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn get_by_email(&self, email: &str) -> store::Result<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self.find_active(|u| u.email() == email).await)
    }

    async fn get_by_username(&self, username: &str) -> store::Result<Option<User>> {
        let username = username.trim();
        Ok(self.find_active(|u| u.username() == username).await)
    }
}

#[async_trait]
impl ProductRepository for InMemoryRepository<Product> {
    async fn get_by_sku(&self, sku: &str) -> store::Result<Option<Product>> {
        let sku = sku.trim();
        Ok(self.find_active(|p| p.sku() == sku).await)
    }
}

#[async_trait]
impl OrderRepository for InMemoryRepository<Order> {
    async fn list_by_user(&self, user_id: EntityId, query: ListQuery) -> store::Result<Vec<Order>> {
        Ok(self.list_where(query, |o| o.user_id() == user_id).await)
    }
}
