//! Application wiring for the aggregate lifecycle system.
//!
//! Loads configuration from the environment, sets up structured logging and
//! optional Prometheus metrics, and builds the services around a single
//! event dispatcher. Transport layers depend on this crate.

pub mod config;
pub mod context;
pub mod error;
pub mod publisher;
pub mod telemetry;

pub use config::{Config, LogFormat};
pub use context::AppContext;
pub use error::AppError;
pub use publisher::{ChannelPublisher, EventReceiver};
