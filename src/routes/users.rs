// ABOUTME: Profile reads and account mutation handlers, plus admin operations
// ABOUTME: Every mutation goes through the service's atomic persist+recache path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

use super::auth::UserResponse;
use super::AppState;
use crate::errors::AppResult;
use crate::middleware::auth::AuthedUser;
use crate::models::{Avatar, SessionSnapshot, User, UserRole};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInfoRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAvatarRequest {
    pub avatar: Avatar,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub id: Uuid,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: Uuid,
}

/// GET /api/v1/me
///
/// Served straight from the session snapshot; no durable read.
pub async fn me(Extension(user): Extension<AuthedUser>) -> impl IntoResponse {
    Json(ProfileResponse {
        success: true,
        user: user.snapshot,
    })
}

/// PUT /api/v1/update-user-info
pub async fn update_user_info(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(req): Json<UpdateInfoRequest>,
) -> AppResult<impl IntoResponse> {
    let updated = state
        .auth
        .update_profile(user.snapshot.user_id, req.name, req.email)
        .await?;

    Ok(Json(UserResponse {
        success: true,
        user: updated,
    }))
}

/// PUT /api/v1/update-user-password
pub async fn update_user_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(req): Json<UpdatePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    let updated = state
        .auth
        .update_password(user.snapshot.user_id, &req.old_password, &req.new_password)
        .await?;

    Ok(Json(UserResponse {
        success: true,
        user: updated,
    }))
}

/// PUT /api/v1/update-user-avatar
pub async fn update_user_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(req): Json<UpdateAvatarRequest>,
) -> AppResult<impl IntoResponse> {
    let updated = state
        .auth
        .update_avatar(user.snapshot.user_id, req.avatar)
        .await?;

    Ok(Json(UserResponse {
        success: true,
        user: updated,
    }))
}

/// GET /api/v1/users (admin)
pub async fn list_users(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let users = state.auth.list_users().await?;
    Ok(Json(UserListResponse {
        success: true,
        users,
    }))
}

/// PUT /api/v1/user-role (admin)
pub async fn update_user_role(
    State(state): State<AppState>,
    Json(req): Json<UpdateRoleRequest>,
) -> AppResult<impl IntoResponse> {
    let updated = state.auth.update_role(req.id, req.role).await?;
    Ok(Json(UserResponse {
        success: true,
        user: updated,
    }))
}

/// POST /api/v1/enroll
///
/// The order-flow hook: grants a course entitlement to the caller.
pub async fn enroll(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(req): Json<EnrollRequest>,
) -> AppResult<impl IntoResponse> {
    let updated = state
        .auth
        .grant_course(user.snapshot.user_id, req.course_id)
        .await?;

    Ok(Json(UserResponse {
        success: true,
        user: updated,
    }))
}
