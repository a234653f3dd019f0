//! Request and response bodies for the friendship endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::PublicProfile;
use super::relationship::RelationshipState;

/// Request to send a friend request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendFriendRequestRequest {
    /// User the request is addressed to
    pub target_id: Uuid,
}

/// Response after a friend request was sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendFriendRequestResponse {
    pub message: String,
    /// Public profile of the request target, for UI display
    pub target: PublicProfile,
}

/// Request to accept or reject a received friend request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequestActionRequest {
    /// User who originally sent the request
    pub requester_id: Uuid,
}

/// Request to cancel a friend request the caller sent earlier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelFriendRequestRequest {
    /// User the original request was addressed to
    pub target_id: Uuid,
}

/// Generic success response for accept/reject/cancel/unfriend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendActionResponse {
    pub message: String,
}

/// Response for the relationship-state endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipStateResponse {
    pub state: RelationshipState,
}

/// Paginated friend listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendListResponse {
    pub items: Vec<PublicProfile>,
    pub page: u32,
    pub page_size: u32,
    /// Total number of active friends, independent of the page
    pub total: u64,
}

/// Received or sent request listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequestListResponse {
    pub items: Vec<PublicProfile>,
    pub count: usize,
}

/// Friend suggestions listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendSuggestionsResponse {
    pub items: Vec<PublicProfile>,
}
