/**
 * API Route Handlers
 *
 * This module wires the API endpoints to their handlers.
 *
 * # Routes
 *
 * ## Authentication
 * - `POST /api/auth/signup` - Create an account
 * - `POST /api/auth/login` - Log in, returns a JWT
 * - `GET /api/auth/me` - Current account (requires authentication)
 *
 * ## Friendship
 * - `POST /api/friends/request` - Send a friend request
 * - `POST /api/friends/accept` - Accept a received request
 * - `POST /api/friends/reject` - Reject a received request
 * - `POST /api/friends/cancel` - Cancel a sent request
 * - `DELETE /api/friends/{friend_id}` - Remove a friendship
 * - `GET /api/friends` - List friends (paginated)
 * - `GET /api/friends/status/{user_id}` - Relationship state with a user
 * - `GET /api/friends/requests/received` - Received pending requests
 * - `GET /api/friends/requests/sent` - Sent pending requests
 * - `GET /api/friends/suggestions` - Friend suggestions
 *
 * All friendship routes require a JWT in the `Authorization` header; the
 * caller's user id always comes from the token, never from the body.
 */

use axum::Router;

use crate::backend::auth::{get_me, login, signup};
use crate::backend::friendship::handlers::{
    accept_friend_request, cancel_friend_request, get_relationship_state, list_friends,
    list_received_requests, list_sent_requests, reject_friend_request, send_friend_request,
    suggest_friends, unfriend,
};
use crate::backend::server::state::AppState;

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Authentication endpoints
        .route("/api/auth/signup", axum::routing::post(signup))
        .route("/api/auth/login", axum::routing::post(login))
        .route("/api/auth/me", axum::routing::get(get_me))
        // Friend request lifecycle
        .route(
            "/api/friends/request",
            axum::routing::post(send_friend_request),
        )
        .route(
            "/api/friends/accept",
            axum::routing::post(accept_friend_request),
        )
        .route(
            "/api/friends/reject",
            axum::routing::post(reject_friend_request),
        )
        .route(
            "/api/friends/cancel",
            axum::routing::post(cancel_friend_request),
        )
        .route(
            "/api/friends/{friend_id}",
            axum::routing::delete(unfriend),
        )
        // Friend graph reads
        .route("/api/friends", axum::routing::get(list_friends))
        .route(
            "/api/friends/status/{user_id}",
            axum::routing::get(get_relationship_state),
        )
        .route(
            "/api/friends/requests/received",
            axum::routing::get(list_received_requests),
        )
        .route(
            "/api/friends/requests/sent",
            axum::routing::get(list_sent_requests),
        )
        .route(
            "/api/friends/suggestions",
            axum::routing::get(suggest_friends),
        )
}
