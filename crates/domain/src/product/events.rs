//! Product domain events.

use chrono::{DateTime, Utc};
use common::EntityId;
use serde::{Deserialize, Serialize};

use crate::event::DomainEvent;

/// Events that can occur on a product aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    /// Product was added to the catalog.
    ProductCreated(ProductCreatedData),

    /// Product was soft-deleted.
    ProductDeleted(ProductDeletedData),
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "ProductCreated",
            ProductEvent::ProductDeleted(_) => "ProductDeleted",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(data) => data.occurred_at,
            ProductEvent::ProductDeleted(data) => data.occurred_at,
        }
    }

    fn subject_id(&self) -> EntityId {
        match self {
            ProductEvent::ProductCreated(data) => data.product_id,
            ProductEvent::ProductDeleted(data) => data.product_id,
        }
    }
}

/// Data for ProductCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreatedData {
    pub product_id: EntityId,
    pub name: String,
    pub sku: String,

    /// The user who created the product.
    pub created_by: EntityId,

    pub occurred_at: DateTime<Utc>,
}

/// Data for ProductDeleted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDeletedData {
    pub product_id: EntityId,
    pub occurred_at: DateTime<Utc>,
}

// Convenience constructors for events
impl ProductEvent {
    pub fn product_created(
        product_id: EntityId,
        name: impl Into<String>,
        sku: impl Into<String>,
        created_by: EntityId,
    ) -> Self {
        ProductEvent::ProductCreated(ProductCreatedData {
            product_id,
            name: name.into(),
            sku: sku.into(),
            created_by,
            occurred_at: Utc::now(),
        })
    }

    pub fn product_deleted(product_id: EntityId) -> Self {
        ProductEvent::ProductDeleted(ProductDeletedData {
            product_id,
            occurred_at: Utc::now(),
        })
    }
}
