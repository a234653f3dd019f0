//! Authentication: JWT sessions and account handlers.

pub mod handlers;
pub mod sessions;

pub use handlers::{get_me, login, signup};
pub use sessions::{create_token, verify_token, Claims};

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::backend::error::BackendError;

/// Extract and verify the calling user from the `Authorization` header.
///
/// Expects `Authorization: Bearer <jwt>`; the token's `sub` claim carries
/// the user id.
pub fn authenticated_user(headers: &HeaderMap) -> Result<Uuid, BackendError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| BackendError::unauthorized("Missing authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| BackendError::unauthorized("Malformed authorization header"))?;

    let claims =
        verify_token(token).map_err(|_| BackendError::unauthorized("Invalid or expired token"))?;

    Uuid::parse_str(&claims.sub)
        .map_err(|_| BackendError::unauthorized("Invalid user ID in token"))
}
