// ABOUTME: Unified error handling with stable error codes and HTTP response mapping
// ABOUTME: Every failure in the auth core surfaces through AppError and one JSON shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

//! # Unified Error Handling System
//!
//! Defines the error taxonomy for the session/entitlement core, the HTTP
//! status each code maps to, and the JSON error body returned to clients.
//! Internal fields (password hashes, secrets, source chains) are never
//! serialized into a response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// No token on the request at all
    #[serde(rename = "AUTH_REQUIRED")]
    NotAuthenticated,
    /// Token present but signature or expiry check failed
    #[serde(rename = "AUTH_INVALID")]
    InvalidToken,
    /// Token verified but no session exists in the cache
    #[serde(rename = "SESSION_NOT_FOUND")]
    SessionNotFound,
    /// Unknown email or wrong password, deliberately indistinguishable
    #[serde(rename = "INVALID_CREDENTIALS")]
    InvalidCredentials,
    /// Role not in the operation's allow-list
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied,

    // Registration & activation
    #[serde(rename = "ACCOUNT_EXISTS")]
    DuplicateAccount,
    #[serde(rename = "INVALID_ACTIVATION_CODE")]
    InvalidCode,

    // Validation
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,

    // Resources
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound,

    // Collaborators
    #[serde(rename = "UPSTREAM_FAILURE")]
    UpstreamFailure,

    // Configuration & internal
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::NotAuthenticated
            | Self::InvalidToken
            | Self::SessionNotFound
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,

            Self::PermissionDenied => StatusCode::FORBIDDEN,

            Self::DuplicateAccount => StatusCode::CONFLICT,

            Self::InvalidCode | Self::InvalidInput => StatusCode::BAD_REQUEST,

            Self::ResourceNotFound => StatusCode::NOT_FOUND,

            Self::UpstreamFailure => StatusCode::BAD_GATEWAY,

            Self::ConfigError | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-facing description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NotAuthenticated => "Authentication is required to access this resource",
            Self::InvalidToken => "The provided authentication token is invalid or expired",
            Self::SessionNotFound => "No active session exists for this token",
            Self::InvalidCredentials => "The provided credentials are invalid",
            Self::PermissionDenied => "You do not have permission to perform this action",
            Self::DuplicateAccount => "An account with this identifier already exists",
            Self::InvalidCode => "The activation code does not match",
            Self::InvalidInput => "The provided input is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::UpstreamFailure => "An external service failed to handle the request",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining, never serialized
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// Missing token on a protected request
    pub fn not_authenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotAuthenticated, message)
    }

    /// Token failed signature, expiry, or format checks
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    /// Valid token but the session snapshot is gone
    pub fn session_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SessionNotFound, message)
    }

    /// One error for both unknown email and wrong password
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCredentials, message)
    }

    /// Role check failed
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Email already registered
    pub fn duplicate_account(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DuplicateAccount, message)
    }

    /// Activation code mismatch
    pub fn invalid_code(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCode, message)
    }

    /// Request validation failure
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource lookup failure
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Mailer or store collaborator failure
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::UpstreamFailure,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorResponseDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message.clone(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, "request failed: {}", self);
        } else {
            tracing::debug!(code = ?self.code, "request rejected: {}", self);
        }
        let body = ErrorResponse::from(&self);
        (status, Json(body)).into_response()
    }
}

/// Conversion from `anyhow::Error` for binary and test seams
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(ErrorCode::InternalError, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::SessionNotFound.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::DuplicateAccount.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::InvalidCode.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::UpstreamFailure.http_status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_response_serialization() {
        let error = AppError::duplicate_account("An account with this email already exists");
        let response = ErrorResponse::from(&error);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("ACCOUNT_EXISTS"));
        assert!(json.contains("already exists"));
    }

    #[test]
    fn test_source_never_serialized() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "secret detail");
        let error = AppError::internal("storage failed").with_source(io);
        let response = ErrorResponse::from(&error);

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("secret detail"));
    }
}
