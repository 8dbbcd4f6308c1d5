//! Registration, login and bearer token tests.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{TimeDelta, Utc};
use serde_json::json;

use flatshop_core::Username;
use flatshop_integration_tests::{TestApp, test_config};
use flatshop_server::services::TokenSigner;

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new();
    let credentials = json!({ "username": "alice", "password": "hunter22" });

    let registered = app.post("/register", None, credentials.clone()).await;
    assert_eq!(registered.status, StatusCode::OK);
    assert_eq!(registered.body, json!({ "message": "User created successfully" }));

    let login = app.post("/login", None, credentials).await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["tokenType"], "bearer");
    let token = login.body["token"].as_str().unwrap();
    assert_eq!(token.split('.').count(), 3);

    let username = app.state.tokens().verify(token).unwrap();
    assert_eq!(username.as_str(), "alice");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::new();
    let credentials = json!({ "username": "alice", "password": "one" });
    app.post("/register", None, credentials).await;

    let again = app
        .post("/register", None, json!({ "username": "alice", "password": "two" }))
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.detail(), "Username already exists");
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = TestApp::new();

    let empty_password = app
        .post("/register", None, json!({ "username": "alice", "password": "" }))
        .await;
    assert_eq!(empty_password.status, StatusCode::BAD_REQUEST);

    let blank_username = app
        .post("/register", None, json!({ "username": "   ", "password": "pw" }))
        .await;
    assert_eq!(blank_username.status, StatusCode::BAD_REQUEST);

    let missing_field = app
        .post("/register", None, json!({ "username": "alice" }))
        .await;
    assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);
    assert!(!missing_field.detail().is_empty());
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let app = TestApp::new();
    app.post("/register", None, json!({ "username": "alice", "password": "right" }))
        .await;

    let wrong_password = app
        .post("/login", None, json!({ "username": "alice", "password": "wrong" }))
        .await;
    let unknown_user = app
        .post("/login", None, json!({ "username": "mallory", "password": "right" }))
        .await;

    for response in [wrong_password, unknown_user] {
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.detail(), "Invalid username or password");
    }
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new();

    let response = app.get("/get_products", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.detail(), "Not authenticated");
}

#[tokio::test]
async fn test_protected_route_rejects_garbage_token() {
    let app = TestApp::new();

    let response = app.get("/get_products", Some("not-a-token")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.detail(), "Invalid token");
}

#[tokio::test]
async fn test_protected_route_rejects_other_scheme() {
    let app = TestApp::new();
    let token = app.login_as("alice").await;

    let request = Request::get("/get_products")
        .header(header::AUTHORIZATION, format!("Token {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.detail(), "Not authenticated");
}

#[tokio::test]
async fn test_expired_token() {
    let app = TestApp::new();
    let username = Username::parse("alice").unwrap();
    let issued = Utc::now() - TimeDelta::minutes(31);
    let token = app.state.tokens().issue_at(&username, issued).unwrap();

    let response = app.get("/get_products", Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.detail(), "Token expired");
}

#[tokio::test]
async fn test_token_signed_with_another_secret() {
    let app = TestApp::new();
    let mut config = test_config();
    config.token.secret = "M4x!pQ8#zR2@vK7$wL1%nT5^bH9&cJ3*".into();
    let foreign = TokenSigner::new(&config.token);

    let token = foreign
        .issue(&Username::parse("alice").unwrap())
        .unwrap();
    let response = app.get("/get_products", Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.detail(), "Invalid token");
}

#[tokio::test]
async fn test_token_for_unregistered_user_is_accepted() {
    // Tokens carry the username only; the users document is not consulted.
    let app = TestApp::new();
    let token = app
        .state
        .tokens()
        .issue(&Username::parse("ghost").unwrap())
        .unwrap();

    let response = app.get("/get_products", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
}
