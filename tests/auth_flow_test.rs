// ABOUTME: End-to-end HTTP tests for the account and session lifecycle
// ABOUTME: Registration, activation, login, identity resolution, rotation, logout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::http::{Method, StatusCode};
use common::{cookie_header, login, register_and_activate, request, test_app};
use serde_json::json;

#[tokio::test]
async fn test_registration_returns_activation_token_and_sends_code() {
    let app = test_app().await;

    let (status, _, body) = request(
        &app.router,
        Method::POST,
        "/api/v1/registration",
        None,
        Some(json!({ "name": "Alice", "email": "alice@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(!body["activationToken"].as_str().unwrap().is_empty());

    let code = app.mailer.last_code().await;
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_registration_rejects_duplicate_email() {
    let app = test_app().await;
    register_and_activate(&app, "Alice", "alice@example.com", "password123").await;

    let (status, _, body) = request(
        &app.router,
        Method::POST,
        "/api/v1/registration",
        None,
        Some(json!({ "name": "Alice", "email": "alice@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ACCOUNT_EXISTS");
}

#[tokio::test]
async fn test_activation_rejects_wrong_code() {
    let app = test_app().await;

    let (_, _, body) = request(
        &app.router,
        Method::POST,
        "/api/v1/registration",
        None,
        Some(json!({ "name": "Bob", "email": "bob@example.com", "password": "password123" })),
    )
    .await;
    let token = body["activationToken"].as_str().unwrap().to_owned();
    let code = app.mailer.last_code().await;
    let wrong = if code == "123456" { "654321" } else { "123456" };

    let (status, _, body) = request(
        &app.router,
        Method::POST,
        "/api/v1/activate-user",
        None,
        Some(json!({ "activationToken": token, "activationCode": wrong })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_ACTIVATION_CODE");
}

#[tokio::test]
async fn test_login_sets_both_session_cookies() {
    let app = test_app().await;
    register_and_activate(&app, "Alice", "alice@example.com", "password123").await;

    let (cookies, body) = login(&app, "alice@example.com", "password123").await;

    assert!(cookies.contains("accessToken="));
    assert!(cookies.contains("refreshToken="));
    assert_eq!(body["user"]["email"], "alice@example.com");
    // The password hash never leaves the server
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let app = test_app().await;
    register_and_activate(&app, "Alice", "alice@example.com", "password123").await;

    let (status_unknown, _, body_unknown) = request(
        &app.router,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "password123" })),
    )
    .await;
    let (status_wrong, _, body_wrong) = request(
        &app.router,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "not-it" })),
    )
    .await;

    assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(status_wrong, StatusCode::UNAUTHORIZED);
    assert_eq!(body_unknown["error"], body_wrong["error"]);
}

#[tokio::test]
async fn test_me_resolves_identity_from_session() {
    let app = test_app().await;
    register_and_activate(&app, "Alice", "alice@example.com", "password123").await;
    let (cookies, _) = login(&app, "alice@example.com", "password123").await;

    let (status, _, body) =
        request(&app.router, Method::GET, "/api/v1/me", Some(&cookies), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
async fn test_me_without_cookies_is_unauthenticated() {
    let app = test_app().await;

    let (status, _, body) = request(&app.router, Method::GET, "/api/v1/me", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");
}

#[tokio::test]
async fn test_refresh_rotates_cookies() {
    let app = test_app().await;
    register_and_activate(&app, "Alice", "alice@example.com", "password123").await;
    let (cookies, _) = login(&app, "alice@example.com", "password123").await;

    let (status, headers, body) = request(
        &app.router,
        Method::GET,
        "/api/v1/refresh",
        Some(&cookies),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rotated = cookie_header(&headers);
    assert!(rotated.contains("accessToken="));
    assert_ne!(rotated, cookies);

    // The rotated access token works against the authenticator
    let (status, _, _) =
        request(&app.router, Method::GET, "/api/v1/me", Some(&rotated), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_refresh_without_cookie_is_denied() {
    let app = test_app().await;

    let (status, _, _) = request(&app.router, Method::GET, "/api/v1/refresh", None, None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let app = test_app().await;
    register_and_activate(&app, "Alice", "alice@example.com", "password123").await;
    let (cookies, _) = login(&app, "alice@example.com", "password123").await;

    let (status, headers, _) = request(
        &app.router,
        Method::GET,
        "/api/v1/logout",
        Some(&cookies),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Both cookies are overwritten with empty values
    let cleared = cookie_header(&headers);
    assert!(cleared.contains("accessToken="));
    assert!(cleared.contains("refreshToken="));

    // The original, still-valid token now fails on the session lookup
    let (status, _, body) =
        request(&app.router, Method::GET, "/api/v1/me", Some(&cookies), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_refresh_after_logout_cannot_resurrect_session() {
    let app = test_app().await;
    register_and_activate(&app, "Alice", "alice@example.com", "password123").await;
    let (cookies, _) = login(&app, "alice@example.com", "password123").await;

    request(
        &app.router,
        Method::GET,
        "/api/v1/logout",
        Some(&cookies),
        None,
    )
    .await;

    let (status, _, body) = request(
        &app.router,
        Method::GET,
        "/api/v1/refresh",
        Some(&cookies),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_social_auth_creates_session_without_password() {
    let app = test_app().await;

    let (status, headers, body) = request(
        &app.router,
        Method::POST,
        "/api/v1/social-auth",
        None,
        Some(json!({ "email": "carol@example.com", "name": "Carol", "avatar": null })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_verified"], true);

    let cookies = cookie_header(&headers);
    let (status, _, _) =
        request(&app.router, Method::GET, "/api/v1/me", Some(&cookies), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoint_reports_backend() {
    let app = test_app().await;

    let (status, _, body) = request(&app.router, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["session_backend"], "up");
}

/// The full lifecycle in one scenario: register, activate, login, read
/// profile, rotate credentials, enroll, log out.
#[tokio::test]
async fn test_full_account_lifecycle() {
    let app = test_app().await;

    let user = register_and_activate(&app, "Alice", "alice@example.com", "password123").await;
    assert_eq!(user["is_verified"], true);

    let (cookies, _) = login(&app, "alice@example.com", "password123").await;

    let (status, _, body) =
        request(&app.router, Method::GET, "/api/v1/me", Some(&cookies), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Alice");

    let (status, headers, _) = request(
        &app.router,
        Method::GET,
        "/api/v1/refresh",
        Some(&cookies),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let cookies = cookie_header(&headers);

    let course_id = uuid::Uuid::new_v4();
    let (status, _, body) = request(
        &app.router,
        Method::POST,
        "/api/v1/enroll",
        Some(&cookies),
        Some(json!({ "courseId": course_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["courses"][0], course_id.to_string());

    let (status, _, _) = request(
        &app.router,
        Method::GET,
        "/api/v1/logout",
        Some(&cookies),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) =
        request(&app.router, Method::GET, "/api/v1/me", Some(&cookies), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
