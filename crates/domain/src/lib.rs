//! Domain layer for the aggregate lifecycle system.
//!
//! This crate provides:
//! - The entity lifecycle record and its soft-delete state machine
//! - Domain events, the per-aggregate event buffer and the event dispatcher
//! - User, Product and Order aggregates with their services
//! - Repository ports for each aggregate

pub mod aggregate;
pub mod command;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handlers;
pub mod lifecycle;
pub mod money;
pub mod order;
pub mod product;
pub mod repository;
pub mod user;

pub use aggregate::AggregateRoot;
pub use command::CommandHandler;
pub use dispatcher::{
    DispatchError, EventDispatcher, EventHandler, EventPublisher, HandlerError, PublishError,
};
pub use error::DomainError;
pub use event::{AnyEvent, DomainEvent, EventBuffer};
pub use lifecycle::{Lifecycle, LifecycleError, LifecycleState};
pub use money::Money;
pub use order::{
    NewOrderItem, Order, OrderEvent, OrderItem, OrderLine, OrderService, OrderStatus,
};
pub use product::{NewProduct, Product, ProductEvent, ProductService};
pub use repository::{OrderRepository, ProductRepository, UserRepository};
pub use user::{Profile, ProfileDetails, User, UserEvent, UserService};

pub use common::{EntityId, Version};
pub use store::{ListQuery, Record, Repository, Visibility};
