// ABOUTME: Session cache abstraction holding per-account identity snapshots
// ABOUTME: Pluggable backend support (in-memory, Redis) behind a common trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

/// Session store facade for backend selection
pub mod factory;
/// In-memory session cache implementation
pub mod memory;
/// Redis session cache implementation
pub mod redis;

use crate::errors::{AppError, AppResult};
use crate::models::{SessionSnapshot, SNAPSHOT_VERSION};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

pub use factory::SessionStore;

/// Decode a cached snapshot, treating a version mismatch as a miss
///
/// Entries written before a snapshot format change must not be trusted;
/// readers drop them and the client re-authenticates.
pub(crate) fn decode_snapshot(data: &[u8]) -> AppResult<Option<SessionSnapshot>> {
    let snapshot: SessionSnapshot = serde_json::from_slice(data)
        .map_err(|e| AppError::internal(format!("session deserialization failed: {e}")))?;

    if snapshot.version != SNAPSHOT_VERSION {
        tracing::warn!(
            found = snapshot.version,
            expected = SNAPSHOT_VERSION,
            "dropping session snapshot with stale version"
        );
        return Ok(None);
    }

    Ok(Some(snapshot))
}

/// Cache key for a session snapshot, one entry per account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey(pub Uuid);

impl SessionKey {
    /// Pattern matching every session entry in the namespace
    #[must_use]
    pub fn all_pattern() -> String {
        "session:*".to_owned()
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Session cache trait for pluggable backend implementations
///
/// A live entry is what makes a login session valid. Deleting the entry is
/// logout: token verification alone never grants access.
#[async_trait::async_trait]
pub trait SessionCache: Send + Sync {
    /// Store a session snapshot with TTL, overwriting any previous entry
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    async fn set(&self, key: SessionKey, snapshot: &SessionSnapshot, ttl: Duration)
        -> AppResult<()>;

    /// Retrieve a session snapshot, `None` on miss, expiry, or a stale
    /// snapshot version
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails
    async fn get(&self, key: SessionKey) -> AppResult<Option<SessionSnapshot>>;

    /// Overwrite an existing session entry, leaving a miss untouched
    ///
    /// Returns `true` when a live entry was present and rewritten. The
    /// check and write are a single atomic step, so a concurrent logout
    /// cannot be undone by the rewrite.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    async fn set_if_exists(
        &self,
        key: SessionKey,
        snapshot: &SessionSnapshot,
        ttl: Duration,
    ) -> AppResult<bool>;

    /// Remove a session entry, ending the login session
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails
    async fn delete(&self, key: SessionKey) -> AppResult<()>;

    /// Check whether a live session entry exists
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check fails
    async fn exists(&self, key: SessionKey) -> AppResult<bool>;

    /// Get remaining TTL for a session entry
    ///
    /// # Errors
    ///
    /// Returns an error if the TTL check fails
    async fn ttl(&self, key: SessionKey) -> AppResult<Option<Duration>>;

    /// Verify the cache backend is reachable
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unhealthy
    async fn health_check(&self) -> AppResult<()>;

    /// Clear every session entry (testing and admin tooling)
    ///
    /// # Errors
    ///
    /// Returns an error if the clear operation fails
    async fn clear_all(&self) -> AppResult<()>;
}
