// ABOUTME: Service layer for account lifecycle and credential flows
// ABOUTME: Routes stay thin; all auth semantics live here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

/// Credential issuance, session lifecycle, and account mutations
pub mod auth;

pub use auth::{AuthService, IssuedSession, RotatedSession};
