// ABOUTME: HTTP route assembly and shared application state
// ABOUTME: Thin axum layer over the auth service; no business logic in handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

/// Registration, activation, login, logout, and refresh handlers
pub mod auth;
/// Health endpoint
pub mod health;
/// Profile, admin, and entitlement handlers
pub mod users;

use crate::cache::SessionStore;
use crate::config::ServerConfig;
use crate::middleware::auth::{require_auth, RequestAuthenticator};
use crate::middleware::guard::{require_roles, ADMIN_ONLY};
use crate::services::AuthService;
use axum::extract::FromRef;
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub auth: Arc<AuthService>,
    pub authenticator: RequestAuthenticator,
    pub cache: SessionStore,
}

impl FromRef<AppState> for RequestAuthenticator {
    fn from_ref(state: &AppState) -> Self {
        state.authenticator.clone()
    }
}

/// Build the full application router
#[must_use]
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/registration", post(auth::registration))
        .route("/activate-user", post(auth::activate_user))
        .route("/login", post(auth::login))
        .route("/social-auth", post(auth::social_auth))
        .route("/refresh", get(auth::refresh));

    let authenticated = Router::new()
        .route("/logout", get(auth::logout))
        .route("/me", get(users::me))
        .route("/update-user-info", put(users::update_user_info))
        .route("/update-user-password", put(users::update_user_password))
        .route("/update-user-avatar", put(users::update_user_avatar))
        .route("/enroll", post(users::enroll))
        .route_layer(middleware::from_fn_with_state(
            state.authenticator.clone(),
            require_auth,
        ));

    // Guard layers run after the authenticator resolves the identity
    let admin = Router::new()
        .route("/users", get(users::list_users))
        .route("/user-role", put(users::update_user_role))
        .route_layer(middleware::from_fn(|req, next| {
            require_roles(ADMIN_ONLY, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(
            state.authenticator.clone(),
            require_auth,
        ));

    Router::new()
        .nest("/api/v1", public.merge(authenticated).merge(admin))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
