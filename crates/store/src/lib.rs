pub mod error;
pub mod memory;
pub mod query;
pub mod record;
pub mod store;

pub use common::{EntityId, Version};
pub use error::{Result, StoreError};
pub use memory::InMemoryRepository;
pub use query::{ListQuery, Visibility};
pub use record::Record;
pub use store::{Repository, RepositoryExt};
