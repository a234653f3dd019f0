/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct is the central state container, holding:
 * - The friendship service (state machine + retry protocol)
 * - The relation store (shared with the auth handlers for account lookups)
 *
 * # Thread Safety
 *
 * Both fields are cheap clones over `Arc`s and safe to share across
 * request handlers.
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow Axum handlers to extract the piece
 * of state they need without taking the entire `AppState`.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::friendship::store::RelationStore;
use crate::backend::friendship::FriendshipService;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// The friendship state machine
    pub service: FriendshipService,
    /// The relation store, used directly by the account handlers
    pub store: Arc<dyn RelationStore>,
}

/// Allow handlers to extract the friendship service directly
impl FromRef<AppState> for FriendshipService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.service.clone()
    }
}

/// Allow handlers to extract the relation store directly
impl FromRef<AppState> for Arc<dyn RelationStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}
