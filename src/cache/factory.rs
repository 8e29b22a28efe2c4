// ABOUTME: Session store facade choosing a cache backend from configuration
// ABOUTME: In-memory by default, Redis when a connection URL is configured
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

use super::memory::InMemorySessionCache;
use super::redis::RedisSessionCache;
use super::{SessionCache, SessionKey};
use crate::config::SessionCacheSettings;
use crate::errors::AppResult;
use crate::models::SessionSnapshot;
use std::time::Duration;

/// Unified session store dispatching to the configured backend
#[derive(Clone)]
pub enum SessionStore {
    /// Single-instance in-memory backend
    Memory(InMemorySessionCache),
    /// Shared Redis backend for multi-instance deployments
    Redis(RedisSessionCache),
}

impl SessionStore {
    /// Create a session store based on configuration
    ///
    /// # Errors
    ///
    /// Returns an error if backend initialization fails
    pub async fn new(settings: &SessionCacheSettings) -> AppResult<Self> {
        if settings.redis_url.is_some() {
            tracing::info!("Initializing Redis session store");
            Ok(Self::Redis(RedisSessionCache::new(settings).await?))
        } else {
            tracing::info!(
                "Initializing in-memory session store (max entries: {})",
                settings.max_entries
            );
            Ok(Self::Memory(InMemorySessionCache::new(settings)))
        }
    }

    fn backend(&self) -> &dyn SessionCache {
        match self {
            Self::Memory(cache) => cache,
            Self::Redis(cache) => cache,
        }
    }

    /// Store a session snapshot with TTL
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    pub async fn set(
        &self,
        key: SessionKey,
        snapshot: &SessionSnapshot,
        ttl: Duration,
    ) -> AppResult<()> {
        self.backend().set(key, snapshot, ttl).await
    }

    /// Retrieve a session snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails
    pub async fn get(&self, key: SessionKey) -> AppResult<Option<SessionSnapshot>> {
        self.backend().get(key).await
    }

    /// Overwrite an existing session entry, leaving a miss untouched
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    pub async fn set_if_exists(
        &self,
        key: SessionKey,
        snapshot: &SessionSnapshot,
        ttl: Duration,
    ) -> AppResult<bool> {
        self.backend().set_if_exists(key, snapshot, ttl).await
    }

    /// Remove a session entry
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails
    pub async fn delete(&self, key: SessionKey) -> AppResult<()> {
        self.backend().delete(key).await
    }

    /// Check whether a live session exists
    ///
    /// # Errors
    ///
    /// Returns an error if the check fails
    pub async fn exists(&self, key: SessionKey) -> AppResult<bool> {
        self.backend().exists(key).await
    }

    /// Get remaining TTL for a session
    ///
    /// # Errors
    ///
    /// Returns an error if the TTL check fails
    pub async fn ttl(&self, key: SessionKey) -> AppResult<Option<Duration>> {
        self.backend().ttl(key).await
    }

    /// Verify the backend is healthy
    ///
    /// # Errors
    ///
    /// Returns an error if the health check fails
    pub async fn health_check(&self) -> AppResult<()> {
        self.backend().health_check().await
    }

    /// Clear all session entries
    ///
    /// # Errors
    ///
    /// Returns an error if the clear operation fails
    pub async fn clear_all(&self) -> AppResult<()> {
        self.backend().clear_all().await
    }
}
