// ABOUTME: Shared helpers for integration tests
// ABOUTME: Test app construction, HTTP driving, and cookie plumbing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)] // Not every test file uses every helper

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use learnhub_server::cache::SessionStore;
use learnhub_server::config::{Environment, ServerConfig};
use learnhub_server::errors::AppResult;
use learnhub_server::mailer::Mailer;
use learnhub_server::middleware::auth::RequestAuthenticator;
use learnhub_server::routes::{self, AppState};
use learnhub_server::services::AuthService;
use learnhub_server::store::InMemoryUserStore;
use learnhub_server::tokens::TokenCodec;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::util::ServiceExt;

/// Mailer that records every delivery so tests can read activation codes
#[derive(Default)]
pub struct CapturingMailer {
    pub sent: Mutex<Vec<(String, Value)>>,
}

#[async_trait::async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, to: &str, _subject: &str, _template: &str, data: Value) -> AppResult<()> {
        self.sent.lock().await.push((to.to_owned(), data));
        Ok(())
    }
}

impl CapturingMailer {
    /// Activation code from the most recent email
    pub async fn last_code(&self) -> String {
        let sent = self.sent.lock().await;
        sent.last().expect("no mail sent").1["activationCode"]
            .as_str()
            .expect("no activation code in mail")
            .to_owned()
    }
}

/// Fully wired application over in-memory backends
pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<CapturingMailer>,
    pub auth: Arc<AuthService>,
    pub cache: SessionStore,
}

/// Build a test app with development-environment cookies (no Secure flag)
pub async fn test_app() -> TestApp {
    let config = Arc::new(ServerConfig::for_tests(Environment::Testing));
    let codec = Arc::new(TokenCodec::new(config.auth.clone()));
    let cache = SessionStore::new(&config.cache).await.unwrap();
    let store = Arc::new(InMemoryUserStore::new());
    let mailer = Arc::new(CapturingMailer::default());

    let auth = Arc::new(AuthService::new(
        codec.clone(),
        cache.clone(),
        store,
        mailer.clone(),
        config.auth.session_ttl(),
    ));
    let authenticator = RequestAuthenticator::new(codec, cache.clone());

    let router = routes::router(AppState {
        config,
        auth: auth.clone(),
        authenticator,
        cache: cache.clone(),
    });

    TestApp {
        router,
        mailer,
        auth,
        cache,
    }
}

/// Drive one request through the router and decode the JSON body
pub async fn request(
    router: &Router,
    method: Method,
    uri: &str,
    cookies: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookies) = cookies {
        builder = builder.header(header::COOKIE, cookies);
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, headers, json)
}

/// Collapse Set-Cookie response headers into a Cookie request header value
pub fn cookie_header(headers: &HeaderMap) -> String {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Register and activate an account over HTTP, returning the user id
pub async fn register_and_activate(app: &TestApp, name: &str, email: &str, password: &str) -> Value {
    let (status, _, body) = request(
        &app.router,
        Method::POST,
        "/api/v1/registration",
        None,
        Some(serde_json::json!({ "name": name, "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");

    let token = body["activationToken"].as_str().unwrap().to_owned();
    let code = app.mailer.last_code().await;

    let (status, _, body) = request(
        &app.router,
        Method::POST,
        "/api/v1/activate-user",
        None,
        Some(serde_json::json!({ "activationToken": token, "activationCode": code })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "activation failed: {body}");

    body["user"].clone()
}

/// Log in over HTTP, returning the session cookie header and response body
pub async fn login(app: &TestApp, email: &str, password: &str) -> (String, Value) {
    let (status, headers, body) = request(
        &app.router,
        Method::POST,
        "/api/v1/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    (cookie_header(&headers), body)
}
