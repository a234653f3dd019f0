//! HTTP-level tests driving the full router over the in-memory store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use serial_test::serial;
use tower::ServiceExt;

use amity::backend::friendship::store::MemoryRelationStore;
use amity::backend::server::create_app_with_store;

fn test_app() -> Router {
    create_app_with_store(Arc::new(MemoryRelationStore::new()))
}

fn set_test_secret() {
    std::env::set_var("JWT_SECRET", "api-test-secret");
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Sign up a user and return (token, user id)
async fn signup(app: &Router, name: &str) -> (String, String) {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "display_name": name,
            "email": format!("{name}@example.com"),
            "password": "correct horse battery",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {body}");

    let token = body["token"].as_str().unwrap().to_string();
    let id = body["user"]["id"].as_str().unwrap().to_string();
    (token, id)
}

#[tokio::test]
#[serial]
async fn test_signup_login_me_flow() {
    set_test_secret();
    let app = test_app();

    let (token, id) = signup(&app, "alice").await;

    let (status, me) = request(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"].as_str().unwrap(), id);
    assert_eq!(me["display_name"], "alice");

    let (status, login) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "email": "alice@example.com",
            "password": "correct horse battery",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(login["token"].as_str().is_some());
}

#[tokio::test]
#[serial]
async fn test_signup_validation_and_duplicates() {
    set_test_secret();
    let app = test_app();

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "display_name": "short",
            "email": "short@example.com",
            "password": "short",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    signup(&app, "alice").await;
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "display_name": "alice again",
            "email": "alice@example.com",
            "password": "correct horse battery",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[serial]
async fn test_login_rejects_bad_password() {
    set_test_secret();
    let app = test_app();
    signup(&app, "alice").await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "email": "alice@example.com",
            "password": "wrong password entirely",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_friendship_routes_require_authentication() {
    set_test_secret();
    let app = test_app();

    let (status, body) = request(&app, "GET", "/api/friends", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
#[serial]
async fn test_friend_request_flow_over_http() {
    set_test_secret();
    let app = test_app();

    let (alice_token, alice_id) = signup(&app, "alice").await;
    let (bob_token, bob_id) = signup(&app, "bob").await;

    // Alice sends Bob a request.
    let (status, body) = request(
        &app,
        "POST",
        "/api/friends/request",
        Some(&alice_token),
        Some(json!({ "target_id": bob_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "send failed: {body}");
    assert_eq!(body["message"], "friend request sent");
    assert_eq!(body["target"]["display_name"], "bob");

    // Bob sees it in his received listing.
    let (status, body) = request(
        &app,
        "GET",
        "/api/friends/requests/received",
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["items"][0]["id"].as_str().unwrap(), alice_id);

    // Bob accepts.
    let (status, body) = request(
        &app,
        "POST",
        "/api/friends/accept",
        Some(&bob_token),
        Some(json!({ "requester_id": alice_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "accept failed: {body}");

    // Both sides now report the friends state.
    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/friends/status/{bob_id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "friends");

    let (status, body) = request(&app, "GET", "/api/friends", Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"].as_str().unwrap(), alice_id);

    // Alice unfriends Bob again.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/friends/{bob_id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/friends/status/{bob_id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "none");
}

#[tokio::test]
#[serial]
async fn test_error_status_mapping_over_http() {
    set_test_secret();
    let app = test_app();

    let (alice_token, alice_id) = signup(&app, "alice").await;

    // Self request maps to 400.
    let (status, body) = request(
        &app,
        "POST",
        "/api/friends/request",
        Some(&alice_token),
        Some(json!({ "target_id": alice_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    // Unknown target maps to 404.
    let (status, body) = request(
        &app,
        "POST",
        "/api/friends/request",
        Some(&alice_token),
        Some(json!({ "target_id": uuid::Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}
