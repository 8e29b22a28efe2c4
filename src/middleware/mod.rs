// ABOUTME: Request middleware stack for the auth core
// ABOUTME: Authentication resolves identity, the guard enforces role allow-lists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

/// Request authentication: token transport, verification, session lookup
pub mod auth;
/// Role-based authorization gate
pub mod guard;

pub use auth::{AuthedUser, RequestAuthenticator};
pub use guard::{authorize, require_roles, ADMIN_ONLY, ANY_ROLE};
