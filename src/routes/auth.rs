// ABOUTME: Registration, activation, login, social auth, logout, and refresh handlers
// ABOUTME: Credential transport lives here; semantics live in the auth service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

use super::AppState;
use crate::constants::cookies::REFRESH_TOKEN;
use crate::errors::{AppError, AppResult};
use crate::middleware::auth::AuthedUser;
use crate::models::{SessionSnapshot, SocialClaims, User};
use crate::security::cookies::{expired_session_cookies, session_cookies};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub success: bool,
    pub activation_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRequest {
    pub activation_token: String,
    pub activation_code: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub user: User,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub user: SessionSnapshot,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/v1/registration
pub async fn registration(
    State(state): State<AppState>,
    Json(req): Json<RegistrationRequest>,
) -> AppResult<impl IntoResponse> {
    let activation_token = state
        .auth
        .register(&req.name, &req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            success: true,
            activation_token,
        }),
    ))
}

/// POST /api/v1/activate-user
pub async fn activate_user(
    State(state): State<AppState>,
    Json(req): Json<ActivationRequest>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .auth
        .activate(&req.activation_token, &req.activation_code)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            success: true,
            user,
        }),
    ))
}

/// POST /api/v1/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let session = state.auth.login(&req.email, &req.password).await?;
    Ok(session_response(&state, jar, session))
}

/// POST /api/v1/social-auth
pub async fn social_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(claims): Json<SocialClaims>,
) -> AppResult<impl IntoResponse> {
    let session = state.auth.social_login(claims).await?;
    Ok(session_response(&state, jar, session))
}

/// GET /api/v1/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    state.auth.logout(user.snapshot.user_id).await?;

    let (access, refresh) = expired_session_cookies(&state.config);
    let jar = jar.add(access).add(refresh);

    Ok((
        jar,
        Json(MessageResponse {
            success: true,
            message: "Logged out successfully".to_owned(),
        }),
    ))
}

/// GET /api/v1/refresh
///
/// Rotation reads the refresh cookie only; a missing cookie is the same
/// rejection as an unverifiable token.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let token = jar
        .get(REFRESH_TOKEN)
        .map(|c| c.value().to_owned())
        .ok_or_else(|| AppError::permission_denied("Could not refresh token"))?;

    let rotated = state.auth.refresh_session(&token).await?;

    let (access, refresh) = session_cookies(
        &state.config,
        rotated.access_token.clone(),
        rotated.refresh_token,
    );
    let jar = jar.add(access).add(refresh);

    Ok((
        jar,
        Json(RefreshResponse {
            success: true,
            user: rotated.snapshot,
            access_token: rotated.access_token,
        }),
    ))
}

/// Attach session cookies and build the login-shaped response body
fn session_response(
    state: &AppState,
    jar: CookieJar,
    session: crate::services::IssuedSession,
) -> impl IntoResponse {
    let (access, refresh) = session_cookies(
        &state.config,
        session.access_token.clone(),
        session.refresh_token,
    );
    let jar = jar.add(access).add(refresh);

    (
        jar,
        Json(SessionResponse {
            success: true,
            user: session.user,
            access_token: session.access_token,
        }),
    )
}
