//! Order service providing the ordering use cases.

use std::sync::Arc;

use common::EntityId;
use serde::{Deserialize, Serialize};
use store::{ListQuery, Repository};

use crate::command::CommandHandler;
use crate::dispatcher::EventDispatcher;
use crate::error::DomainError;
use crate::repository::{OrderRepository, ProductRepository, UserRepository};

use super::{NewOrderItem, Order, OrderStatus};

/// One requested line of a new order. The price comes from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: EntityId,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(product_id: EntityId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Service for managing orders.
///
/// Placing an order reads users and products but only writes the order.
pub struct OrderService {
    handler: CommandHandler<Order, dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
}

impl OrderService {
    /// Creates a new order service.
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            handler: CommandHandler::new(orders, dispatcher),
            users,
            products,
        }
    }

    pub fn handler(&self) -> &CommandHandler<Order, dyn OrderRepository> {
        &self.handler
    }

    /// Places an order for an active user.
    ///
    /// Every product must exist and be active. Each item is priced at the
    /// product's current price.
    #[tracing::instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn place_order(
        &self,
        user_id: EntityId,
        lines: Vec<OrderLine>,
    ) -> Result<Order, DomainError> {
        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(DomainError::not_found("user", user_id));
        }

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            if line.quantity == 0 {
                return Err(DomainError::validation(format!(
                    "quantity for product {} must be greater than 0",
                    line.product_id
                )));
            }
            let product = self
                .products
                .get_by_id(line.product_id)
                .await?
                .ok_or_else(|| DomainError::not_found("product", line.product_id))?;
            items.push(NewOrderItem::new(
                line.product_id,
                line.quantity,
                product.price(),
            ));
        }

        let order = self.handler.create(Order::create(user_id, items)?).await?;
        tracing::info!(
            order_id = %order.id(),
            total_price = %order.total_price(),
            "order placed"
        );
        Ok(order)
    }

    /// Moves an order along the fulfilment flow.
    #[tracing::instrument(skip(self))]
    pub async fn change_order_status(
        &self,
        id: EntityId,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        self.handler
            .execute(id, |order| order.change_status(status))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, id: EntityId) -> Result<Order, DomainError> {
        self.handler.execute(id, |order| order.cancel()).await
    }

    /// Soft-deletes an order and its items.
    #[tracing::instrument(skip(self))]
    pub async fn soft_delete_order(&self, id: EntityId) -> Result<Order, DomainError> {
        self.handler.execute(id, |order| order.delete()).await
    }

    /// Restores a soft-deleted order. Its items stay deleted.
    #[tracing::instrument(skip(self))]
    pub async fn restore_order(&self, id: EntityId) -> Result<Order, DomainError> {
        self.handler.execute(id, |order| order.restore()).await
    }

    /// Gets an active order.
    pub async fn get_order(&self, id: EntityId) -> Result<Order, DomainError> {
        self.handler.load(id).await
    }

    pub async fn list_orders(&self, query: ListQuery) -> Result<Vec<Order>, DomainError> {
        Ok(self.handler.repository().list(query).await?)
    }

    pub async fn list_orders_for_user(
        &self,
        user_id: EntityId,
        query: ListQuery,
    ) -> Result<Vec<Order>, DomainError> {
        Ok(self.handler.repository().list_by_user(user_id, query).await?)
    }
}
