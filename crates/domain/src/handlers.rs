//! Built-in event handlers that write lifecycle events to the log.

use std::sync::Arc;

use async_trait::async_trait;

use crate::dispatcher::{EventHandler, HandlerError};
use crate::event::AnyEvent;
use crate::order::OrderEvent;
use crate::product::ProductEvent;
use crate::user::UserEvent;

/// Logs user creation and deletion.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserLifecycleLogger;

#[async_trait]
impl EventHandler for UserLifecycleLogger {
    fn name(&self) -> &'static str {
        "user_lifecycle_logger"
    }

    fn can_handle(&self, event: &AnyEvent) -> bool {
        matches!(event, AnyEvent::User(_))
    }

    async fn handle(&self, event: &AnyEvent) -> Result<(), HandlerError> {
        match event {
            AnyEvent::User(UserEvent::UserCreated(data)) => {
                tracing::info!(
                    user_id = %data.user_id,
                    email = %data.email,
                    username = %data.username,
                    "user created"
                );
            }
            AnyEvent::User(UserEvent::UserDeleted(data)) => {
                tracing::info!(user_id = %data.user_id, "user deleted");
            }
            _ => {}
        }
        Ok(())
    }
}

/// Logs products added to the catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProductCreatedLogger;

#[async_trait]
impl EventHandler for ProductCreatedLogger {
    fn name(&self) -> &'static str {
        "product_created_logger"
    }

    fn can_handle(&self, event: &AnyEvent) -> bool {
        matches!(event, AnyEvent::Product(ProductEvent::ProductCreated(_)))
    }

    async fn handle(&self, event: &AnyEvent) -> Result<(), HandlerError> {
        if let AnyEvent::Product(ProductEvent::ProductCreated(data)) = event {
            tracing::info!(
                product_id = %data.product_id,
                name = %data.name,
                sku = %data.sku,
                created_by = %data.created_by,
                "product created"
            );
        }
        Ok(())
    }
}

/// Logs placed and cancelled orders.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrderLifecycleLogger;

#[async_trait]
impl EventHandler for OrderLifecycleLogger {
    fn name(&self) -> &'static str {
        "order_lifecycle_logger"
    }

    fn can_handle(&self, event: &AnyEvent) -> bool {
        matches!(
            event,
            AnyEvent::Order(OrderEvent::OrderCreated(_) | OrderEvent::OrderCancelled(_))
        )
    }

    async fn handle(&self, event: &AnyEvent) -> Result<(), HandlerError> {
        match event {
            AnyEvent::Order(OrderEvent::OrderCreated(data)) => {
                tracing::info!(
                    order_id = %data.order_id,
                    user_id = %data.user_id,
                    total_price = %data.total_price,
                    item_count = data.item_count,
                    "order created"
                );
            }
            AnyEvent::Order(OrderEvent::OrderCancelled(data)) => {
                tracing::info!(order_id = %data.order_id, "order cancelled");
            }
            _ => {}
        }
        Ok(())
    }
}

/// Returns the logging handlers in the order they should be registered.
pub fn default_handlers() -> Vec<Arc<dyn EventHandler>> {
    vec![
        Arc::new(UserLifecycleLogger),
        Arc::new(ProductCreatedLogger),
        Arc::new(OrderLifecycleLogger),
    ]
}
