// End-to-end tests for the /auth endpoints
// Each test runs the full router against a fresh in-memory store

use super::*;
use crate::auth::password::test_password_service;
use crate::auth::SESSION_COOKIE;
use crate::error::ErrorResponse;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

// ============================================================================
// Test Helpers
// ============================================================================

/// Build a test server over an empty in-memory user store
fn create_test_server() -> TestServer {
    let state = AppState::new(
        Arc::new(InMemoryUserStore::new()),
        test_password_service(),
        Key::generate(),
    );

    TestServer::new(create_router(state)).unwrap()
}

fn credentials(email: &str, password: &str) -> serde_json::Value {
    json!({ "email": email, "password": password })
}

/// Sign up and return the created user
async fn signup(server: &TestServer, email: &str, password: &str) -> UserResponse {
    let response = server
        .post("/auth/signup")
        .json(&credentials(email, password))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

// ============================================================================
// Signup / whoami
// ============================================================================

#[tokio::test]
async fn test_handles_a_signup_request() {
    let server = create_test_server();

    let response = server
        .post("/auth/signup")
        .json(&credentials("admin@admin.com", "12341234"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert!(body["id"].as_i64().is_some());
    assert_eq!(body["email"], "admin@admin.com");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_signup_then_whoami() {
    let server = create_test_server();

    let response = server
        .post("/auth/signup")
        .json(&credentials("admin@admin.com", "12341234"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let cookie = response.cookie(SESSION_COOKIE);

    let response = server.get("/auth/whoami").add_cookie(cookie).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let user: UserResponse = response.json();
    assert_eq!(user.email, "admin@admin.com");
}

#[tokio::test]
async fn test_whoami_without_session() {
    let server = create_test_server();

    let response = server.get("/auth/whoami").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error_code, "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_signup_with_email_in_use() {
    let server = create_test_server();
    signup(&server, "admin@admin.com", "12341234").await;

    let response = server
        .post("/auth/signup")
        .json(&credentials("admin@admin.com", "12341234"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error_code, "EMAIL_IN_USE");
}

#[tokio::test]
async fn test_signup_with_invalid_email() {
    let server = create_test_server();

    let response = server
        .post("/auth/signup")
        .json(&credentials("not-an-email", "12341234"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error_code, "VALIDATION_ERROR");
    assert!(body.details.is_some());
}

#[tokio::test]
async fn test_signup_with_empty_password() {
    let server = create_test_server();

    let response = server
        .post("/auth/signup")
        .json(&credentials("admin@admin.com", ""))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Signin / signout
// ============================================================================

#[tokio::test]
async fn test_signin_sets_session() {
    let server = create_test_server();
    let created = signup(&server, "admin@admin.com", "12341234").await;

    let response = server
        .post("/auth/signin")
        .json(&credentials("admin@admin.com", "12341234"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let user: UserResponse = response.json();
    assert_eq!(user.id, created.id);

    let cookie = response.cookie(SESSION_COOKIE);
    let me: UserResponse = server.get("/auth/whoami").add_cookie(cookie).await.json();
    assert_eq!(me.id, created.id);
}

#[tokio::test]
async fn test_signin_with_unused_email() {
    let server = create_test_server();

    let response = server
        .post("/auth/signin")
        .json(&credentials("admin2@admin.com", "12341234"))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signin_with_wrong_password() {
    let server = create_test_server();
    signup(&server, "admin@admin.com", "123412345").await;

    let response = server
        .post("/auth/signin")
        .json(&credentials("admin@admin.com", "12341234"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error_code, "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_signout_clears_session() {
    let server = create_test_server();
    let response = server
        .post("/auth/signup")
        .json(&credentials("admin@admin.com", "12341234"))
        .await;
    let cookie = response.cookie(SESSION_COOKIE);

    let response = server.post("/auth/signout").add_cookie(cookie).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    let cleared = response.cookie(SESSION_COOKIE);

    let response = server.get("/auth/whoami").add_cookie(cleared).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// User lookup and management
// ============================================================================

#[tokio::test]
async fn test_find_all_users_by_email() {
    let server = create_test_server();
    signup(&server, "admin@admin.com", "12341234").await;
    signup(&server, "other@admin.com", "12341234").await;

    let users: Vec<UserResponse> = server
        .get("/auth")
        .add_query_param("email", "admin@admin.com")
        .await
        .json();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "admin@admin.com");
}

#[tokio::test]
async fn test_find_user_by_id() {
    let server = create_test_server();
    let created = signup(&server, "admin@admin.com", "12341234").await;

    let response = server.get(&format!("/auth/{}", created.id)).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["email"], "admin@admin.com");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_find_user_not_found() {
    let server = create_test_server();

    let response = server.get("/auth/999").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error_code, "NOT_FOUND");
}

#[tokio::test]
async fn test_find_all_users_without_email() {
    let server = create_test_server();

    let response = server.get("/auth").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error_code, "BAD_REQUEST");
}

#[tokio::test]
async fn test_update_user_email_and_password() {
    let server = create_test_server();
    let response = server
        .post("/auth/signup")
        .json(&credentials("admin@admin.com", "12341234"))
        .await;
    let created: UserResponse = response.json();
    let cookie = response.cookie(SESSION_COOKIE);

    let response = server
        .patch(&format!("/auth/{}", created.id))
        .add_cookie(cookie)
        .json(&json!({ "email": "renamed@admin.com", "password": "new-password" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: UserResponse = response.json();
    assert_eq!(updated.email, "renamed@admin.com");

    let response = server
        .post("/auth/signin")
        .json(&credentials("renamed@admin.com", "new-password"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_user_to_email_in_use() {
    let server = create_test_server();
    signup(&server, "taken@admin.com", "12341234").await;
    let response = server
        .post("/auth/signup")
        .json(&credentials("admin@admin.com", "12341234"))
        .await;
    let created: UserResponse = response.json();
    let cookie = response.cookie(SESSION_COOKIE);

    let response = server
        .patch(&format!("/auth/{}", created.id))
        .add_cookie(cookie)
        .json(&json!({ "email": "taken@admin.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_user_without_session() {
    let server = create_test_server();
    let created = signup(&server, "admin@admin.com", "12341234").await;

    let response = server
        .patch(&format!("/auth/{}", created.id))
        .json(&json!({ "password": "hijacked" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_other_user_is_forbidden() {
    let server = create_test_server();
    let victim = signup(&server, "victim@admin.com", "12341234").await;
    let cookie = server
        .post("/auth/signup")
        .json(&credentials("attacker@admin.com", "12341234"))
        .await
        .cookie(SESSION_COOKIE);

    let response = server
        .patch(&format!("/auth/{}", victim.id))
        .add_cookie(cookie)
        .json(&json!({ "password": "hijacked" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error_code, "FORBIDDEN");

    let response = server
        .post("/auth/signin")
        .json(&credentials("victim@admin.com", "12341234"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_remove_user_ends_their_session() {
    let server = create_test_server();
    let response = server
        .post("/auth/signup")
        .json(&credentials("admin@admin.com", "12341234"))
        .await;
    let created: UserResponse = response.json();
    let cookie = response.cookie(SESSION_COOKIE);

    let response = server
        .delete(&format!("/auth/{}", created.id))
        .add_cookie(cookie.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server.get(&format!("/auth/{}", created.id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server.get("/auth/whoami").add_cookie(cookie).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_remove_user_without_session() {
    let server = create_test_server();
    let created = signup(&server, "admin@admin.com", "12341234").await;

    let response = server.delete(&format!("/auth/{}", created.id)).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let response = server.get(&format!("/auth/{}", created.id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_remove_other_user_is_forbidden() {
    let server = create_test_server();
    let cookie = server
        .post("/auth/signup")
        .json(&credentials("admin@admin.com", "12341234"))
        .await
        .cookie(SESSION_COOKIE);

    let response = server.delete("/auth/999").add_cookie(cookie).await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_openapi_document_lists_auth_routes() {
    let server = create_test_server();

    let doc: serde_json::Value = server.get("/api-docs/openapi.json").await.json();

    assert!(doc["paths"]["/auth/signup"].is_object());
    assert!(doc["paths"]["/auth/whoami"].is_object());
    assert!(doc["paths"]["/auth/{id}"].is_object());
}
