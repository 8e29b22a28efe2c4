// ABOUTME: In-memory session cache with LRU eviction and TTL support
// ABOUTME: Includes background cleanup task for expired entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

use super::{SessionCache, SessionKey};
use crate::config::SessionCacheSettings;
use crate::errors::{AppError, AppResult};
use crate::models::SessionSnapshot;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// In-memory cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn remaining_ttl(&self) -> Option<Duration> {
        self.expires_at.checked_duration_since(Instant::now())
    }
}

/// In-memory session cache with LRU eviction and background cleanup
///
/// Uses `Arc<RwLock<LruCache>>` for shared state between cache operations
/// and the background cleanup task, which needs shared ownership of the
/// store to remove expired entries concurrently. Eviction of a live entry
/// under memory pressure ends that login session early, matching the
/// crash-equals-logout semantics of the cache as a whole.
#[derive(Clone)]
pub struct InMemorySessionCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
    shutdown_tx: Option<Arc<tokio::sync::mpsc::Sender<()>>>,
}

impl InMemorySessionCache {
    /// Default cache capacity when config specifies zero entries
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create a new in-memory cache with optional background cleanup task
    #[must_use]
    pub fn new(settings: &SessionCacheSettings) -> Self {
        let capacity = NonZeroUsize::new(settings.max_entries).unwrap_or(Self::DEFAULT_CAPACITY);

        let store = Arc::new(RwLock::new(LruCache::new(capacity)));

        let shutdown_tx = if settings.enable_background_cleanup {
            let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
            let store_clone = store.clone();
            let cleanup_interval = settings.cleanup_interval;

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(cleanup_interval);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            Self::cleanup_expired(&store_clone).await;
                        }
                        _ = shutdown_rx.recv() => {
                            tracing::debug!("session cache cleanup task received shutdown signal");
                            break;
                        }
                    }
                }
            });

            Some(Arc::new(shutdown_tx))
        } else {
            None
        };

        Self { store, shutdown_tx }
    }

    /// Remove all expired entries from the cache
    async fn cleanup_expired(store: &Arc<RwLock<LruCache<String, CacheEntry>>>) {
        let mut store_guard = store.write().await;

        // Two passes: LruCache cannot be mutated mid-iteration
        let expired_keys: Vec<String> = store_guard
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            store_guard.pop(key);
        }

        let removed = expired_keys.len();
        drop(store_guard);
        if removed > 0 {
            tracing::debug!("cleaned up {} expired session entries", removed);
        }
    }
}

#[async_trait::async_trait]
impl SessionCache for InMemorySessionCache {
    async fn set(
        &self,
        key: SessionKey,
        snapshot: &SessionSnapshot,
        ttl: Duration,
    ) -> AppResult<()> {
        let serialized = serde_json::to_vec(snapshot)
            .map_err(|e| AppError::internal(format!("session serialization failed: {e}")))?;
        let entry = CacheEntry::new(serialized, ttl);

        // push evicts the least-recently-used entry at capacity
        self.store.write().await.push(key.to_string(), entry);

        Ok(())
    }

    async fn get(&self, key: SessionKey) -> AppResult<Option<SessionSnapshot>> {
        let mut store = self.store.write().await;

        // get needs the write lock: it refreshes the entry's LRU position
        if let Some(entry) = store.get(&key.to_string()) {
            if entry.is_expired() {
                store.pop(&key.to_string());
                drop(store);
                return Ok(None);
            }

            let snapshot = super::decode_snapshot(&entry.data)?;
            drop(store);
            return Ok(snapshot);
        }
        drop(store);

        Ok(None)
    }

    async fn set_if_exists(
        &self,
        key: SessionKey,
        snapshot: &SessionSnapshot,
        ttl: Duration,
    ) -> AppResult<bool> {
        let serialized = serde_json::to_vec(snapshot)
            .map_err(|e| AppError::internal(format!("session serialization failed: {e}")))?;

        // Check and rewrite under one write lock so a concurrent delete
        // cannot interleave between them
        let mut store = self.store.write().await;
        let live = store
            .get(&key.to_string())
            .is_some_and(|entry| !entry.is_expired());

        if live {
            store.push(key.to_string(), CacheEntry::new(serialized, ttl));
        } else {
            // Drop an expired leftover so it cannot linger until cleanup
            store.pop(&key.to_string());
        }
        drop(store);

        Ok(live)
    }

    async fn delete(&self, key: SessionKey) -> AppResult<()> {
        self.store.write().await.pop(&key.to_string());
        Ok(())
    }

    async fn exists(&self, key: SessionKey) -> AppResult<bool> {
        let mut store = self.store.write().await;

        if let Some(entry) = store.get(&key.to_string()) {
            if entry.is_expired() {
                store.pop(&key.to_string());
                drop(store);
                return Ok(false);
            }
            drop(store);
            return Ok(true);
        }
        drop(store);

        Ok(false)
    }

    async fn ttl(&self, key: SessionKey) -> AppResult<Option<Duration>> {
        let store = self.store.write().await;

        // peek leaves the LRU order untouched
        if let Some(entry) = store.peek(&key.to_string()) {
            if entry.is_expired() {
                return Ok(None);
            }
            let ttl = entry.remaining_ttl();
            drop(store);
            return Ok(ttl);
        }

        Ok(None)
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }

    async fn clear_all(&self) -> AppResult<()> {
        self.store.write().await.clear();
        Ok(())
    }
}

impl Drop for InMemorySessionCache {
    fn drop(&mut self) {
        // Signal the background cleanup task to shut down on drop. The task
        // exits once all senders are dropped and recv() returns None.
        if let Some(tx) = &self.shutdown_tx {
            if let Err(e) = tx.try_send(()) {
                tracing::debug!(error = ?e, "session cache shutdown signal send failed (channel likely closed)");
            }
        }
    }
}
