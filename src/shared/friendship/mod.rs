//! Friendship Domain Types
//!
//! Shared types for the friend graph: user status, relationship states,
//! public profile projections, and the request/response bodies of the
//! friendship endpoints.

pub mod profile;
pub mod relationship;
pub mod requests;

pub use profile::{PublicProfile, UserStatus};
pub use relationship::RelationshipState;
pub use requests::{
    CancelFriendRequestRequest, FriendActionResponse, FriendListResponse,
    FriendRequestActionRequest, FriendRequestListResponse, FriendSuggestionsResponse,
    RelationshipStateResponse, SendFriendRequestRequest, SendFriendRequestResponse,
};
