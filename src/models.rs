// ABOUTME: Core data models for accounts, roles, and cached session snapshots
// ABOUTME: Defines User, UserRole, PendingRegistration and the versioned SessionSnapshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

//! # Data Models
//!
//! Core data structures for the session and entitlement core. The durable
//! `User` record and its cached projection (`SessionSnapshot`) are kept as
//! two explicit types so a field added to one cannot silently desynchronize
//! the other: the snapshot carries a serialization version that readers
//! check on the way out of the cache.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

/// Current `SessionSnapshot` wire version. Bump on any field change.
pub const SNAPSHOT_VERSION: u16 = 1;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .unwrap_or_else(|e| panic!("invalid email regex: {e}"))
});

/// Check an email address against the account email format rule
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// User role for the flat role-based permission system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular platform user
    #[default]
    User,
    /// Platform administrator
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// Avatar image reference stored with the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    /// Identifier in the external image store
    pub public_id: String,
    /// Public URL of the image
    pub url: String,
}

/// Durable account record
///
/// The password is held only as a bcrypt hash and is skipped during
/// serialization so it can never leak into a response or the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique account identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Email address, unique across accounts
    pub email: String,
    /// Bcrypt hash of the password, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Avatar reference, if one has been uploaded
    pub avatar: Option<Avatar>,
    /// Role for the authorization gate
    pub role: UserRole,
    /// Whether the email address was confirmed via activation
    pub is_verified: bool,
    /// Course identifiers this account owns
    pub courses: Vec<Uuid>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new account record from an activated registration
    #[must_use]
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            avatar: None,
            role: UserRole::User,
            is_verified: false,
            courses: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the account already owns a course
    #[must_use]
    pub fn owns_course(&self, course_id: Uuid) -> bool {
        self.courses.contains(&course_id)
    }
}

/// Pending registration payload carried inside an activation token
///
/// Never persisted: the activation round-trip is entirely stateless and the
/// durable account is created only once the code checks out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub name: String,
    pub email: String,
    /// Plaintext password in transit inside the signed token only; it is
    /// hashed by the store's pre-save hook at activation time
    pub password: String,
}

/// Cached projection of a `User`, keyed by account id
///
/// Source of truth for per-request identity resolution. Must be rewritten
/// on every account mutation that touches a field it exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Wire version, checked by cache readers
    pub version: u16,
    /// Account identifier, also the cache key
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar: Option<Avatar>,
    pub is_verified: bool,
    /// Course entitlements owned at snapshot time
    pub courses: Vec<Uuid>,
    /// When this snapshot was written
    pub cached_at: DateTime<Utc>,
}

impl From<&User> for SessionSnapshot {
    fn from(user: &User) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            avatar: user.avatar.clone(),
            is_verified: user.is_verified,
            courses: user.courses.clone(),
            cached_at: Utc::now(),
        }
    }
}

/// Externally-verified identity claims accepted for social login
///
/// Verification of the upstream identity provider happens before these
/// reach this core; by contract they are trusted here.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialClaims {
    pub email: String,
    pub name: String,
    pub avatar: Option<Avatar>,
}
