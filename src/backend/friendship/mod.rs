//! Friendship Subsystem
//!
//! The friend-graph state machine (service + storage) and its HTTP
//! handlers.

pub mod error;
pub mod handlers;
pub mod service;
pub mod store;

pub use error::FriendshipError;
pub use service::{FriendPage, FriendshipConfig, FriendshipService};
pub use store::{MemoryRelationStore, PgRelationStore, RelationStore};
