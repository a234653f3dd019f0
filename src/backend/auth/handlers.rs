//! Account Handlers
//!
//! Signup, login, and the current-user endpoint. Accounts are created
//! active; status changes are an operational concern outside this API.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::friendship::store::{NewUser, RelationStore, StoreError, UserRecord};
use crate::shared::friendship::UserStatus;
use crate::shared::SharedError;

use super::sessions::create_token;
use super::authenticated_user;

/// Request to create an account
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub display_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Request to log in
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account details returned to the authenticated owner
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Response carrying a session token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountResponse,
}

impl AccountResponse {
    fn from_record(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name.clone(),
            email: record.email.clone(),
            avatar_url: record.avatar_url.clone(),
            city: record.city.clone(),
            country: record.country.clone(),
        }
    }
}

fn validate_signup(request: &SignupRequest) -> Result<(), SharedError> {
    if request.display_name.trim().is_empty() {
        return Err(SharedError::validation(
            "display_name",
            "Display name cannot be empty",
        ));
    }
    if !request.email.contains('@') {
        return Err(SharedError::validation("email", "Invalid email address"));
    }
    if request.password.len() < 8 {
        return Err(SharedError::validation(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    Ok(())
}

fn map_store_error(err: StoreError) -> BackendError {
    match err {
        StoreError::DuplicateEmail => {
            BackendError::handler(StatusCode::CONFLICT, "Email already registered")
        }
        other => crate::backend::friendship::FriendshipError::from(other).into(),
    }
}

/// Create an account and return a session token
pub async fn signup(
    State(store): State<Arc<dyn RelationStore>>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    validate_signup(&request)?;

    let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create account")
    })?;

    let record = store
        .insert_user(NewUser {
            display_name: request.display_name.trim().to_string(),
            email: request.email.to_lowercase(),
            password_hash,
            avatar_url: request.avatar_url,
            city: request.city,
            country: request.country,
            status: UserStatus::Active,
        })
        .await
        .map_err(map_store_error)?;

    let token = create_token(record.id).map_err(|e| {
        tracing::error!("Failed to create session token: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session")
    })?;

    tracing::info!(user_id = %record.id, "account created");
    Ok(Json(AuthResponse {
        token,
        user: AccountResponse::from_record(&record),
    }))
}

/// Log in with email and password
pub async fn login(
    State(store): State<Arc<dyn RelationStore>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let record = store
        .fetch_user_by_email(&request.email.to_lowercase())
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| BackendError::unauthorized("Invalid email or password"))?;

    let valid = bcrypt::verify(&request.password, &record.password_hash).unwrap_or(false);
    if !valid {
        return Err(BackendError::unauthorized("Invalid email or password"));
    }

    store
        .touch_last_seen(record.id)
        .await
        .map_err(map_store_error)?;

    let token = create_token(record.id).map_err(|e| {
        tracing::error!("Failed to create session token: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session")
    })?;

    Ok(Json(AuthResponse {
        token,
        user: AccountResponse::from_record(&record),
    }))
}

/// Return the authenticated caller's account details
pub async fn get_me(
    State(store): State<Arc<dyn RelationStore>>,
    headers: HeaderMap,
) -> Result<Json<AccountResponse>, BackendError> {
    let user_id = authenticated_user(&headers)?;
    let record = store
        .fetch_user(user_id)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| BackendError::handler(StatusCode::NOT_FOUND, "User not found"))?;

    Ok(Json(AccountResponse::from_record(&record)))
}
