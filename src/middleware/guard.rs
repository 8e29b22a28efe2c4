// ABOUTME: Declarative role-based authorization gate
// ABOUTME: Routes name an allow-list; one generic layer evaluates it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

use crate::errors::{AppError, AppResult};
use crate::middleware::auth::AuthedUser;
use crate::models::UserRole;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Allow-list admitting only administrators
pub const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// Allow-list admitting every authenticated role
pub const ANY_ROLE: &[UserRole] = &[UserRole::User, UserRole::Admin];

/// Pure authorization predicate: is the role on the allow-list
///
/// # Errors
///
/// Returns `PermissionDenied` naming the rejected role.
pub fn authorize(role: UserRole, allowed: &[UserRole]) -> AppResult<()> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AppError::permission_denied(format!(
            "Role '{role}' is not allowed to access this resource"
        )))
    }
}

/// axum layer enforcing an allow-list on an already-authenticated route
///
/// Must be layered after [`require_auth`](crate::middleware::auth::require_auth);
/// a missing identity extension here is a wiring error and is rejected, not
/// silently admitted.
///
/// # Errors
///
/// `PermissionDenied` when the resolved role is not on the allow-list.
pub async fn require_roles(
    allowed: &'static [UserRole],
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(user) = req.extensions().get::<AuthedUser>() else {
        return Err(AppError::not_authenticated(
            "Authorization requires an authenticated request",
        ));
    };

    authorize(user.snapshot.role, allowed)?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_admin_only_rejects_user() {
        let err = authorize(UserRole::User, ADMIN_ONLY).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_admin_only_admits_admin() {
        authorize(UserRole::Admin, ADMIN_ONLY).unwrap();
    }

    #[test]
    fn test_any_role_admits_both() {
        authorize(UserRole::User, ANY_ROLE).unwrap();
        authorize(UserRole::Admin, ANY_ROLE).unwrap();
    }

    #[test]
    fn test_empty_allow_list_rejects_everyone() {
        assert!(authorize(UserRole::Admin, &[]).is_err());
    }
}
