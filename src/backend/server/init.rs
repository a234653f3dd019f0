/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP
 * server: storage loading, service construction, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Load the relation store (Postgres if configured, in-memory otherwise)
 * 2. Construct the friendship service over it
 * 3. Create and configure the router
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::friendship::store::RelationStore;
use crate::backend::friendship::{FriendshipConfig, FriendshipService};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_store;
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// Loads the storage backend from the environment and wires up all routes.
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing amity backend server");

    let store = load_store().await;
    create_app_with_store(store)
}

/// Create the application over an explicit store
///
/// Used by `create_app` and by tests that want the in-memory store.
pub fn create_app_with_store(store: Arc<dyn RelationStore>) -> Router<()> {
    let service = FriendshipService::new(store.clone(), FriendshipConfig::default());

    let app_state = AppState { service, store };

    tracing::info!("Router configured");
    create_router(app_state)
}
