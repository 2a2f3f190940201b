//! User aggregate and related types.

mod aggregate;
mod events;
mod profile;
mod service;

pub use aggregate::User;
pub use events::{UserCreatedData, UserDeletedData, UserEvent};
pub use profile::{Profile, ProfileDetails};
pub use service::UserService;
