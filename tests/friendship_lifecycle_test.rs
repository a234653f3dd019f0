//! Lifecycle tests for the friendship state machine: request, accept,
//! reject, cancel, unfriend, and the guard conditions around them.

mod common;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use amity::backend::friendship::FriendshipError;
use common::{create_user, create_user_with_status, fetch, test_service};

use amity::shared::friendship::UserStatus;

#[tokio::test]
async fn test_send_request_to_self_fails() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;

    let err = service.send_request(a, a).await.unwrap_err();
    assert_matches!(err, FriendshipError::SelfOperation);
}

#[tokio::test]
async fn test_send_request_creates_symmetric_edge() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;
    let b = create_user(&store, "bob").await;

    let target = service.send_request(a, b).await.unwrap();
    assert_eq!(target.id, b);
    assert_eq!(target.display_name, "bob");

    let alice = fetch(&store, a).await;
    let bob = fetch(&store, b).await;
    assert_eq!(alice.sent_requests, vec![b]);
    assert_eq!(bob.pending_requests, vec![a]);
    assert!(alice.friends.is_empty());
    assert!(bob.friends.is_empty());
}

#[tokio::test]
async fn test_duplicate_send_fails() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;
    let b = create_user(&store, "bob").await;

    service.send_request(a, b).await.unwrap();
    let err = service.send_request(a, b).await.unwrap_err();
    assert_matches!(err, FriendshipError::RequestAlreadyExists);

    // Still exactly one edge.
    let bob = fetch(&store, b).await;
    assert_eq!(bob.pending_requests, vec![a]);
}

#[tokio::test]
async fn test_crossed_requests_do_not_create_second_edge() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;
    let b = create_user(&store, "bob").await;

    service.send_request(a, b).await.unwrap();

    // The counter-request must be refused while the first is unresolved.
    let err = service.send_request(b, a).await.unwrap_err();
    assert_matches!(err, FriendshipError::RequestAlreadyExists);

    let alice = fetch(&store, a).await;
    let bob = fetch(&store, b).await;
    assert_eq!(alice.sent_requests, vec![b]);
    assert!(alice.pending_requests.is_empty());
    assert_eq!(bob.pending_requests, vec![a]);
    assert!(bob.sent_requests.is_empty());
}

#[tokio::test]
async fn test_send_to_missing_user_fails() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;
    let ghost = uuid::Uuid::new_v4();

    let err = service.send_request(a, ghost).await.unwrap_err();
    assert_matches!(err, FriendshipError::UserNotFound { user_id } if user_id == ghost);
}

#[tokio::test]
async fn test_send_to_inactive_user_fails() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;
    let b = create_user_with_status(&store, "bob", UserStatus::Inactive).await;

    let err = service.send_request(a, b).await.unwrap_err();
    assert_matches!(err, FriendshipError::UserNotFound { user_id } if user_id == b);
}

#[tokio::test]
async fn test_inactive_requester_cannot_send() {
    let (service, store) = test_service();
    let a = create_user_with_status(&store, "alice", UserStatus::Pending).await;
    let b = create_user(&store, "bob").await;

    let err = service.send_request(a, b).await.unwrap_err();
    assert_matches!(err, FriendshipError::UserNotFound { user_id } if user_id == a);
}

#[tokio::test]
async fn test_accept_converts_request_to_friendship() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;
    let b = create_user(&store, "bob").await;

    service.send_request(a, b).await.unwrap();
    service.accept_request(a, b).await.unwrap();

    let alice = fetch(&store, a).await;
    let bob = fetch(&store, b).await;
    assert_eq!(alice.friends, vec![b]);
    assert_eq!(bob.friends, vec![a]);
    assert!(alice.sent_requests.is_empty());
    assert!(alice.pending_requests.is_empty());
    assert!(bob.sent_requests.is_empty());
    assert!(bob.pending_requests.is_empty());
}

#[tokio::test]
async fn test_accept_without_request_fails() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;
    let b = create_user(&store, "bob").await;

    let err = service.accept_request(a, b).await.unwrap_err();
    assert_matches!(err, FriendshipError::RequestNotFound);
}

#[tokio::test]
async fn test_send_when_already_friends_fails() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;
    let b = create_user(&store, "bob").await;

    service.send_request(a, b).await.unwrap();
    service.accept_request(a, b).await.unwrap();

    let err = service.send_request(a, b).await.unwrap_err();
    assert_matches!(err, FriendshipError::AlreadyFriends);
    let err = service.send_request(b, a).await.unwrap_err();
    assert_matches!(err, FriendshipError::AlreadyFriends);
}

#[tokio::test]
async fn test_reject_removes_edge_without_friendship() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;
    let b = create_user(&store, "bob").await;

    service.send_request(a, b).await.unwrap();
    service.reject_request(a, b).await.unwrap();

    let alice = fetch(&store, a).await;
    let bob = fetch(&store, b).await;
    assert!(alice.sent_requests.is_empty());
    assert!(bob.pending_requests.is_empty());
    assert!(alice.friends.is_empty());
    assert!(bob.friends.is_empty());

    // The request is gone; answering it again fails.
    let err = service.accept_request(a, b).await.unwrap_err();
    assert_matches!(err, FriendshipError::RequestNotFound);
}

#[tokio::test]
async fn test_cancel_removes_edge_like_reject() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;
    let b = create_user(&store, "bob").await;

    service.send_request(a, b).await.unwrap();
    service.cancel_request(a, b).await.unwrap();

    let alice = fetch(&store, a).await;
    let bob = fetch(&store, b).await;
    assert!(alice.sent_requests.is_empty());
    assert!(bob.pending_requests.is_empty());
    assert!(alice.friends.is_empty());
    assert!(bob.friends.is_empty());

    // A fresh request is possible again after the cancel.
    service.send_request(a, b).await.unwrap();
}

#[tokio::test]
async fn test_cancel_without_request_fails() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;
    let b = create_user(&store, "bob").await;

    let err = service.cancel_request(a, b).await.unwrap_err();
    assert_matches!(err, FriendshipError::RequestNotFound);
}

#[tokio::test]
async fn test_unfriend_is_symmetric_and_total() {
    let (service, store) = test_service();
    let a = create_user(&store, "alice").await;
    let b = create_user(&store, "bob").await;

    service.send_request(a, b).await.unwrap();
    service.accept_request(a, b).await.unwrap();

    service.unfriend(a, b).await.unwrap();

    let alice = fetch(&store, a).await;
    let bob = fetch(&store, b).await;
    assert!(alice.friends.is_empty());
    assert!(bob.friends.is_empty());

    // The edge is already gone on both sides.
    let err = service.unfriend(a, b).await.unwrap_err();
    assert_matches!(err, FriendshipError::NotFriends);
}

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let (service, store) = test_service();
    let u1 = create_user(&store, "u1").await;
    let u2 = create_user(&store, "u2").await;

    service.send_request(u1, u2).await.unwrap();
    let first = fetch(&store, u1).await;
    let second = fetch(&store, u2).await;
    assert_eq!(first.sent_requests, vec![u2]);
    assert_eq!(second.pending_requests, vec![u1]);

    service.accept_request(u1, u2).await.unwrap();
    let first = fetch(&store, u1).await;
    let second = fetch(&store, u2).await;
    assert_eq!(first.friends, vec![u2]);
    assert_eq!(second.friends, vec![u1]);
    assert!(first.sent_requests.is_empty());
    assert!(second.pending_requests.is_empty());

    service.unfriend(u1, u2).await.unwrap();
    let first = fetch(&store, u1).await;
    let second = fetch(&store, u2).await;
    assert!(first.friends.is_empty());
    assert!(second.friends.is_empty());
}
