//! Product service providing the catalog use cases.

use std::sync::Arc;

use common::EntityId;
use serde::{Deserialize, Serialize};
use store::{ListQuery, Repository};

use crate::command::CommandHandler;
use crate::dispatcher::EventDispatcher;
use crate::error::DomainError;
use crate::money::Money;
use crate::repository::ProductRepository;

use super::Product;

/// Input for adding a product to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub sku: String,
    pub category: String,
    pub price: Money,

    /// The user adding the product.
    pub created_by: EntityId,
}

impl NewProduct {
    pub fn new(
        name: impl Into<String>,
        sku: impl Into<String>,
        price: Money,
        created_by: EntityId,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            sku: sku.into(),
            category: String::new(),
            price,
            created_by,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Service for managing products.
pub struct ProductService {
    handler: CommandHandler<Product, dyn ProductRepository>,
}

impl ProductService {
    /// Creates a new product service.
    pub fn new(repository: Arc<dyn ProductRepository>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            handler: CommandHandler::new(repository, dispatcher),
        }
    }

    pub fn handler(&self) -> &CommandHandler<Product, dyn ProductRepository> {
        &self.handler
    }

    /// Adds a product. The SKU must not be held by another active product.
    ///
    /// The repository enforces the same rule when it stores the product, so
    /// two concurrent creates with one SKU cannot both succeed.
    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, DomainError> {
        let product = Product::create(
            &input.name,
            &input.description,
            &input.sku,
            &input.category,
            input.price,
            input.created_by,
        )?;

        if self
            .handler
            .repository()
            .get_by_sku(product.sku())
            .await?
            .is_some()
        {
            return Err(DomainError::DuplicateKey {
                aggregate_type: "product",
                field: "sku",
                value: product.sku().to_string(),
            });
        }

        let product = self.handler.create(product).await?;
        tracing::info!(product_id = %product.id(), sku = product.sku(), "product created");
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn soft_delete_product(&self, id: EntityId) -> Result<Product, DomainError> {
        self.handler.execute(id, |product| product.delete()).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn restore_product(&self, id: EntityId) -> Result<Product, DomainError> {
        self.handler.execute(id, |product| product.restore()).await
    }

    /// Changes the price of an active product. Existing orders keep the price
    /// they were placed at.
    #[tracing::instrument(skip(self))]
    pub async fn reprice_product(
        &self,
        id: EntityId,
        price: Money,
    ) -> Result<Product, DomainError> {
        self.handler
            .execute(id, |product| product.reprice(price))
            .await
    }

    /// Gets an active product.
    pub async fn get_product(&self, id: EntityId) -> Result<Product, DomainError> {
        self.handler.load(id).await
    }

    /// Lists products in the query's visibility class.
    pub async fn list_products(&self, query: ListQuery) -> Result<Vec<Product>, DomainError> {
        Ok(self.handler.repository().list(query).await?)
    }
}
