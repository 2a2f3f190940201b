//! Product aggregate implementation.

use chrono::{DateTime, Utc};
use common::{EntityId, Version};
use serde::{Deserialize, Serialize};
use store::Record;

use crate::aggregate::AggregateRoot;
use crate::error::DomainError;
use crate::event::EventBuffer;
use crate::lifecycle::Lifecycle;
use crate::money::Money;

use super::ProductEvent;

const AGGREGATE_TYPE: &str = "product";

/// Product aggregate root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    lifecycle: Lifecycle,
    name: String,
    description: String,
    price: Money,
    sku: String,
    category: String,
    is_active: bool,
    created_by: EntityId,
    version: Version,
    #[serde(skip)]
    events: EventBuffer<ProductEvent>,
}

impl Product {
    /// Creates a new active product and raises `ProductCreated`.
    pub fn create(
        name: &str,
        description: &str,
        sku: &str,
        category: &str,
        price: Money,
        created_by: EntityId,
    ) -> Result<Self, DomainError> {
        let name = name.trim().to_string();
        let sku = sku.trim().to_string();

        if name.is_empty() {
            return Err(DomainError::validation("product name is required"));
        }
        if sku.is_empty() {
            return Err(DomainError::validation("product SKU is required"));
        }
        if !price.is_positive() {
            return Err(DomainError::validation(format!(
                "product price must be positive, got {price}"
            )));
        }

        let lifecycle = Lifecycle::new(Utc::now());
        let mut events = EventBuffer::new();
        events.push(ProductEvent::product_created(
            lifecycle.id(),
            &name,
            &sku,
            created_by,
        ));

        Ok(Self {
            lifecycle,
            name,
            description: description.trim().to_string(),
            price,
            sku,
            category: category.trim().to_string(),
            is_active: true,
            created_by,
            version: Version::initial(),
            events,
        })
    }

    pub fn id(&self) -> EntityId {
        self.lifecycle.id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_by(&self) -> EntityId {
        self.created_by
    }

    pub fn is_deleted(&self) -> bool {
        self.lifecycle.is_deleted()
    }

    /// Changes the price of an active product.
    pub fn reprice(&mut self, price: Money) -> Result<(), DomainError> {
        if self.is_deleted() {
            return Err(DomainError::AlreadyDeleted {
                aggregate_type: AGGREGATE_TYPE,
                id: self.id(),
            });
        }
        if !price.is_positive() {
            return Err(DomainError::validation(format!(
                "product price must be positive, got {price}"
            )));
        }

        self.price = price;
        self.lifecycle.touch(Utc::now());
        Ok(())
    }

    /// Soft-deletes the product and raises `ProductDeleted`.
    pub fn delete(&mut self) -> Result<(), DomainError> {
        self.soft_delete_at(Utc::now())?;
        self.events.push(ProductEvent::product_deleted(self.id()));
        Ok(())
    }

    /// Restores a deleted product. Raises no event.
    pub fn restore(&mut self) -> Result<(), DomainError> {
        self.restore_at(Utc::now())
    }

    fn soft_delete_at(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.lifecycle
            .soft_delete(now)
            .map_err(|e| DomainError::lifecycle(AGGREGATE_TYPE, e))?;
        self.is_active = false;
        Ok(())
    }

    fn restore_at(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.lifecycle
            .restore(now)
            .map_err(|e| DomainError::lifecycle(AGGREGATE_TYPE, e))?;
        self.is_active = true;
        Ok(())
    }
}

impl Record for Product {
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
        // Repositories only call this on an active product.
        let _ = self.soft_delete_at(now);
    }

    fn mark_restored(&mut self, now: DateTime<Utc>) {
        let _ = self.restore_at(now);
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("sku", self.sku.clone())]
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

impl AggregateRoot for Product {
    type Event = ProductEvent;

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn events(&self) -> &EventBuffer<ProductEvent> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventBuffer<ProductEvent> {
        &mut self.events
    }
}
