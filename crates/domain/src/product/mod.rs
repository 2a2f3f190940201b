//! Product aggregate and related types.

mod aggregate;
mod events;
mod service;

pub use aggregate::Product;
pub use events::{ProductCreatedData, ProductDeletedData, ProductEvent};
pub use service::{NewProduct, ProductService};
