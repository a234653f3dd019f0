//! Friendship Error Types
//!
//! Failure taxonomy of the friendship service. Guard failures are
//! deterministic and surfaced on first occurrence; only transient store
//! conflicts are retried, and exhausting the retry budget turns into
//! `Unavailable`. Every error carries an HTTP status hint so the handler
//! layer can map it without inspecting variants one by one.

use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use super::store::StoreError;

/// Errors returned by the friendship service
#[derive(Debug, Error)]
pub enum FriendshipError {
    /// The caller addressed a friendship operation to themselves
    #[error("cannot perform a friendship operation on yourself")]
    SelfOperation,

    /// The user does not exist, or is not active where activity is required
    #[error("user {user_id} not found or inactive")]
    UserNotFound {
        /// The user that failed the lookup
        user_id: Uuid,
    },

    /// The two users already share a friendship edge
    #[error("users are already friends")]
    AlreadyFriends,

    /// No friendship edge exists between the two users
    #[error("users are not friends")]
    NotFriends,

    /// A request between the pair is already pending, in either direction
    #[error("a friend request between these users is already pending")]
    RequestAlreadyExists,

    /// No pending request edge was found on both sides
    #[error("friend request not found")]
    RequestNotFound,

    /// The retry budget was exhausted by repeated write conflicts.
    /// Nothing was committed; the caller may try again later.
    #[error("operation abandoned after repeated write conflicts")]
    Unavailable,

    /// Non-transient storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FriendshipError {
    /// HTTP status hint for this error
    ///
    /// # Status Code Mapping
    ///
    /// - self-operation and duplicate-state guards - 400 Bad Request
    /// - missing users or request edges - 404 Not Found
    /// - exhausted retries and storage failures - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::SelfOperation
            | Self::AlreadyFriends
            | Self::NotFriends
            | Self::RequestAlreadyExists => StatusCode::BAD_REQUEST,
            Self::UserNotFound { .. } | Self::RequestNotFound => StatusCode::NOT_FOUND,
            Self::Unavailable | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
