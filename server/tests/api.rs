//! End-to-end router tests over the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use gatherly_auth::TokenService;
use gatherly_core::memory::MemoryStore;
use gatherly_server::{router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store.clone(),
        store.clone(),
        store,
        TokenService::new("test-secret", Duration::hours(1)),
    );
    router(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = if let Some(body) = body {
        request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    } else {
        request.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Register an account and return its bearer token.
async fn register_user(app: &Router, name: &str, email: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": "secret123",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

/// Create an event as the given admin and return its id.
async fn create_event(app: &Router, admin_token: &str, capacity: i32) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/events",
        Some(admin_token),
        Some(json!({
            "title": "Rust Meetup",
            "description": "Monthly Rust meetup",
            "date": "2026-10-01T18:00:00Z",
            "location": "Berlin",
            "capacity": capacity,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create event failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

async fn register_for_event(app: &Router, token: &str, event_id: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/registrations",
        Some(token),
        Some(json!({ "eventId": event_id })),
    )
    .await
}

#[tokio::test]
async fn health_is_ok() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_then_login() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "secret123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["role"], "user");
    assert!(body["token"].as_str().is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = app();
    register_user(&app, "Ada", "ada@example.com", "user").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Impostor",
            "email": "ada@example.com",
            "password": "secret123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn register_requires_all_fields() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "ada@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please fill all required fields");
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let app = app();
    register_user(&app, "Ada", "ada@example.com", "user").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn missing_token_is_401_before_any_role_check() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        None,
        Some(json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, no token");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some("not.a.token"),
        Some(json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, token failed");
}

#[tokio::test]
async fn non_admin_cannot_manage_events() {
    let app = app();
    let token = register_user(&app, "Ada", "ada@example.com", "user").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(&token),
        Some(json!({
            "title": "Rust Meetup",
            "description": "Monthly Rust meetup",
            "date": "2026-10-01T18:00:00Z",
            "location": "Berlin",
            "capacity": 10,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized as an admin");
}

#[tokio::test]
async fn admin_event_crud() {
    let app = app();
    let admin = register_user(&app, "Root", "root@example.com", "admin").await;
    let event_id = create_event(&app, &admin, 10).await;

    let (status, body) = send(&app, Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["registered"], 0);
    assert_eq!(body[0]["organizer"]["name"], "Root");

    let uri = format!("/api/events/{event_id}");
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Rust Meetup");
    assert_eq!(body["attendees"], json!([]));

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin),
        Some(json!({ "title": "Rust Meetup #2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Rust Meetup #2");
    assert_eq!(body["location"], "Berlin");

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event removed");

    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event not found");
}

#[tokio::test]
async fn event_creation_validates_input() {
    let app = app();
    let admin = register_user(&app, "Root", "root@example.com", "admin").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(&admin),
        Some(json!({ "title": "Rust Meetup" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please fill all required fields");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(&admin),
        Some(json!({
            "title": "Rust Meetup",
            "description": "Monthly Rust meetup",
            "date": "2026-10-01T18:00:00Z",
            "location": "Berlin",
            "capacity": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Capacity must be at least 1");
}

#[tokio::test]
async fn update_distinguishes_absent_from_empty() {
    let app = app();
    let admin = register_user(&app, "Root", "root@example.com", "admin").await;
    let event_id = create_event(&app, &admin, 10).await;
    let uri = format!("/api/events/{event_id}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin),
        Some(json!({ "description": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "");
    assert_eq!(body["title"], "Rust Meetup");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin),
        Some(json!({ "capacity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Capacity must be at least 1");
}

#[tokio::test]
async fn capacity_cannot_drop_below_confirmed_registrations() {
    let app = app();
    let admin = register_user(&app, "Root", "root@example.com", "admin").await;
    let alice = register_user(&app, "Alice", "alice@example.com", "user").await;
    let bob = register_user(&app, "Bob", "bob@example.com", "user").await;
    let event_id = create_event(&app, &admin, 2).await;

    register_for_event(&app, &alice, &event_id).await;
    register_for_event(&app, &bob, &event_id).await;

    let uri = format!("/api/events/{event_id}");
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin),
        Some(json!({ "capacity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Capacity cannot be below the number of confirmed registrations"
    );

    let (_, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(body["capacity"], 2);
    assert_eq!(body["registered"], 2);

    // Shrinking exactly to the confirmed count is allowed.
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin),
        Some(json!({ "capacity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["capacity"], 2);
}

#[tokio::test]
async fn registration_lifecycle() {
    let app = app();
    let admin = register_user(&app, "Root", "root@example.com", "admin").await;
    let user = register_user(&app, "Ada", "ada@example.com", "user").await;
    let event_id = create_event(&app, &admin, 10).await;

    let (status, body) = register_for_event(&app, &user, &event_id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "confirmed");

    let uri = format!("/api/events/{event_id}");
    let (_, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(body["registered"], 1);
    assert_eq!(body["attendees"][0]["name"], "Ada");

    let (status, body) = register_for_event(&app, &user, &event_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You are already registered for this event");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/registrations",
        Some(&user),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Event ID is required");

    let (status, body) = register_for_event(
        &app,
        &user,
        "00000000-0000-0000-0000-000000000000",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event not found");
}

#[tokio::test]
async fn full_event_frees_a_slot_on_cancellation() {
    let app = app();
    let admin = register_user(&app, "Root", "root@example.com", "admin").await;
    let alice = register_user(&app, "Alice", "alice@example.com", "user").await;
    let bob = register_user(&app, "Bob", "bob@example.com", "user").await;
    let event_id = create_event(&app, &admin, 1).await;

    let (status, body) = register_for_event(&app, &alice, &event_id).await;
    assert_eq!(status, StatusCode::CREATED);
    let registration_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = register_for_event(&app, &bob, &event_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Event capacity reached");

    let uri = format!("/api/registrations/{registration_id}");
    let (status, body) = send(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Registration cancelled successfully");

    let (status, _) = register_for_event(&app, &bob, &event_id).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn only_owner_or_admin_can_cancel() {
    let app = app();
    let admin = register_user(&app, "Root", "root@example.com", "admin").await;
    let alice = register_user(&app, "Alice", "alice@example.com", "user").await;
    let mallory = register_user(&app, "Mallory", "mallory@example.com", "user").await;
    let event_id = create_event(&app, &admin, 10).await;

    let (_, body) = register_for_event(&app, &alice, &event_id).await;
    let uri = format!("/api/registrations/{}", body["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&mallory), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to cancel this registration");

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Registration not found");
}

#[tokio::test]
async fn registration_listings_respect_roles() {
    let app = app();
    let admin = register_user(&app, "Root", "root@example.com", "admin").await;
    let alice = register_user(&app, "Alice", "alice@example.com", "user").await;
    let bob = register_user(&app, "Bob", "bob@example.com", "user").await;
    let event_id = create_event(&app, &admin, 10).await;

    register_for_event(&app, &alice, &event_id).await;
    register_for_event(&app, &bob, &event_id).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/registrations/myregistrations",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let mine = body.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["user"]["name"], "Alice");
    assert_eq!(mine[0]["event"]["title"], "Rust Meetup");

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/registrations/all",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/registrations/all",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_an_event_removes_its_registrations() {
    let app = app();
    let admin = register_user(&app, "Root", "root@example.com", "admin").await;
    let alice = register_user(&app, "Alice", "alice@example.com", "user").await;
    let event_id = create_event(&app, &admin, 10).await;

    register_for_event(&app, &alice, &event_id).await;

    let uri = format!("/api/events/{event_id}");
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/registrations/myregistrations",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}
