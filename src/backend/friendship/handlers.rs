//! Friendship HTTP Handlers
//!
//! This module contains the HTTP handlers for the friend graph: sending,
//! answering and cancelling requests, unfriending, and the read-side
//! listings. Handlers extract the caller from the bearer token, delegate
//! to the [`FriendshipService`], and map service errors to responses
//! through [`BackendError`].

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::auth::authenticated_user;
use crate::backend::error::BackendError;
use crate::shared::friendship::{
    CancelFriendRequestRequest, FriendActionResponse, FriendListResponse,
    FriendRequestActionRequest, FriendRequestListResponse, FriendSuggestionsResponse,
    RelationshipStateResponse, SendFriendRequestRequest, SendFriendRequestResponse,
};

use super::service::FriendshipService;

/// Pagination parameters for the friend listing
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Send a friend request to another user
pub async fn send_friend_request(
    State(service): State<FriendshipService>,
    headers: HeaderMap,
    Json(request): Json<SendFriendRequestRequest>,
) -> Result<Json<SendFriendRequestResponse>, BackendError> {
    let requester_id = authenticated_user(&headers)?;
    let target = service
        .send_request(requester_id, request.target_id)
        .await?;

    Ok(Json(SendFriendRequestResponse {
        message: "friend request sent".to_string(),
        target,
    }))
}

/// Accept a friend request the caller received
pub async fn accept_friend_request(
    State(service): State<FriendshipService>,
    headers: HeaderMap,
    Json(request): Json<FriendRequestActionRequest>,
) -> Result<Json<FriendActionResponse>, BackendError> {
    let receiver_id = authenticated_user(&headers)?;
    service
        .accept_request(request.requester_id, receiver_id)
        .await?;

    Ok(Json(FriendActionResponse {
        message: "friend request accepted".to_string(),
    }))
}

/// Reject a friend request the caller received
pub async fn reject_friend_request(
    State(service): State<FriendshipService>,
    headers: HeaderMap,
    Json(request): Json<FriendRequestActionRequest>,
) -> Result<Json<FriendActionResponse>, BackendError> {
    let receiver_id = authenticated_user(&headers)?;
    service
        .reject_request(request.requester_id, receiver_id)
        .await?;

    Ok(Json(FriendActionResponse {
        message: "friend request rejected".to_string(),
    }))
}

/// Cancel a friend request the caller sent earlier
pub async fn cancel_friend_request(
    State(service): State<FriendshipService>,
    headers: HeaderMap,
    Json(request): Json<CancelFriendRequestRequest>,
) -> Result<Json<FriendActionResponse>, BackendError> {
    let requester_id = authenticated_user(&headers)?;
    service
        .cancel_request(requester_id, request.target_id)
        .await?;

    Ok(Json(FriendActionResponse {
        message: "friend request cancelled".to_string(),
    }))
}

/// Remove an existing friendship
pub async fn unfriend(
    State(service): State<FriendshipService>,
    headers: HeaderMap,
    Path(friend_id): Path<Uuid>,
) -> Result<Json<FriendActionResponse>, BackendError> {
    let user_id = authenticated_user(&headers)?;
    service.unfriend(user_id, friend_id).await?;

    Ok(Json(FriendActionResponse {
        message: "friendship removed".to_string(),
    }))
}

/// Relationship state between the caller and another user
pub async fn get_relationship_state(
    State(service): State<FriendshipService>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
) -> Result<Json<RelationshipStateResponse>, BackendError> {
    let viewer_id = authenticated_user(&headers)?;
    let state = service.relationship_state(viewer_id, user_id).await?;

    Ok(Json(RelationshipStateResponse { state }))
}

/// Paginated list of the caller's friends
pub async fn list_friends(
    State(service): State<FriendshipService>,
    headers: HeaderMap,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<FriendListResponse>, BackendError> {
    let user_id = authenticated_user(&headers)?;
    let page = service
        .list_friends(user_id, query.page, query.page_size)
        .await?;

    Ok(Json(FriendListResponse {
        items: page.items,
        page: page.page,
        page_size: page.page_size,
        total: page.total,
    }))
}

/// Pending friend requests the caller has received
pub async fn list_received_requests(
    State(service): State<FriendshipService>,
    headers: HeaderMap,
) -> Result<Json<FriendRequestListResponse>, BackendError> {
    let user_id = authenticated_user(&headers)?;
    let items = service.list_received_requests(user_id).await?;
    let count = items.len();

    Ok(Json(FriendRequestListResponse { items, count }))
}

/// Friend requests the caller has sent that are still pending
pub async fn list_sent_requests(
    State(service): State<FriendshipService>,
    headers: HeaderMap,
) -> Result<Json<FriendRequestListResponse>, BackendError> {
    let user_id = authenticated_user(&headers)?;
    let items = service.list_sent_requests(user_id).await?;
    let count = items.len();

    Ok(Json(FriendRequestListResponse { items, count }))
}

/// Friend suggestions for the caller
pub async fn suggest_friends(
    State(service): State<FriendshipService>,
    headers: HeaderMap,
) -> Result<Json<FriendSuggestionsResponse>, BackendError> {
    let user_id = authenticated_user(&headers)?;
    let items = service.suggest_friends(user_id).await?;

    Ok(Json(FriendSuggestionsResponse { items }))
}
