//! Order aggregate and related types.

mod aggregate;
mod events;
mod item;
mod service;
mod status;

pub use aggregate::Order;
pub use events::{
    OrderCancelledData, OrderCreatedData, OrderDeletedData, OrderEvent, OrderStatusChangedData,
};
pub use item::{NewOrderItem, OrderItem};
pub use service::{OrderLine, OrderService};
pub use status::OrderStatus;
