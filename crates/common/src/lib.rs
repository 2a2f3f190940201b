//! Shared types used across the lifecycle workspace.

mod types;

pub use types::{EntityId, Version};
