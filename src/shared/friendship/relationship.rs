//! Relationship state between two users, as seen from one side.

use serde::{Deserialize, Serialize};

/// The mutually exclusive relationship states a viewer can be in with
/// another user. Derived from the viewer's relation sets in priority
/// order: self, friends, request received, request sent, none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipState {
    /// The viewer is looking at their own profile
    #[serde(rename = "self")]
    Myself,
    /// The two users are friends
    Friends,
    /// The other user has sent the viewer a pending request
    RequestReceived,
    /// The viewer has sent the other user a pending request
    RequestSent,
    /// No relationship in either direction
    None,
}

impl RelationshipState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipState::Myself => "self",
            RelationshipState::Friends => "friends",
            RelationshipState::RequestReceived => "request_received",
            RelationshipState::RequestSent => "request_sent",
            RelationshipState::None => "none",
        }
    }
}
