//! Shared test fixtures: an in-memory service and user factories.

#![allow(dead_code)]

use std::sync::Arc;

use uuid::Uuid;

use amity::backend::friendship::store::{MemoryRelationStore, NewUser, RelationStore, UserRecord};
use amity::backend::friendship::{FriendshipConfig, FriendshipService};
use amity::shared::friendship::UserStatus;

/// Friendship service over a fresh in-memory store
pub fn test_service() -> (FriendshipService, Arc<MemoryRelationStore>) {
    let store = Arc::new(MemoryRelationStore::new());
    let service = FriendshipService::new(store.clone(), FriendshipConfig::default());
    (service, store)
}

pub async fn create_user(store: &MemoryRelationStore, name: &str) -> Uuid {
    create_user_with_status(store, name, UserStatus::Active).await
}

pub async fn create_user_with_status(
    store: &MemoryRelationStore,
    name: &str,
    status: UserStatus,
) -> Uuid {
    store
        .insert_user(NewUser {
            display_name: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            avatar_url: None,
            city: None,
            country: None,
            status,
        })
        .await
        .expect("insert test user")
        .id
}

pub async fn fetch(store: &MemoryRelationStore, id: Uuid) -> UserRecord {
    store
        .fetch_user(id)
        .await
        .expect("fetch test user")
        .expect("test user exists")
}
