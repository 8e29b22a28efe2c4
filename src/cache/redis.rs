// ABOUTME: Redis session cache with connection pooling and TTL support
// ABOUTME: Shared session state for multi-instance deployments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

use super::{SessionCache, SessionKey};
use crate::config::{RedisConnectionConfig, SessionCacheSettings};
use crate::constants::cache::CACHE_KEY_PREFIX;
use crate::errors::{AppError, AppResult};
use crate::models::SessionSnapshot;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{error, info, warn};

/// Redis session cache with automatic reconnection
///
/// Uses Redis `ConnectionManager` for connection pooling and reconnection.
/// All keys are prefixed with `CACHE_KEY_PREFIX` for namespace isolation,
/// and expiry is delegated to Redis via SETEX.
#[derive(Clone)]
pub struct RedisSessionCache {
    manager: ConnectionManager,
}

impl RedisSessionCache {
    /// Create a new Redis session cache
    ///
    /// # Errors
    ///
    /// Returns an error if the Redis connection cannot be established
    pub async fn new(settings: &SessionCacheSettings) -> AppResult<Self> {
        let redis_url = settings
            .redis_url
            .as_ref()
            .ok_or_else(|| AppError::config("Redis URL is required for the Redis session backend"))?;

        let tuning = &settings.redis_connection;

        info!(
            url = %redis_url,
            connect_timeout_secs = tuning.connection_timeout_secs,
            retries = tuning.initial_connection_retries,
            "connecting to redis session backend"
        );

        let client = redis::Client::open(redis_url.as_str())
            .map_err(|e| AppError::internal(format!("invalid redis URL: {e}")))?;

        let manager = Self::connect_with_retry(&client, tuning).await?;
        info!("redis session backend ready");

        Ok(Self { manager })
    }

    /// Establish the managed connection, retrying with capped exponential
    /// backoff so a slow-starting Redis does not fail the boot
    async fn connect_with_retry(
        client: &redis::Client,
        tuning: &RedisConnectionConfig,
    ) -> AppResult<ConnectionManager> {
        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(Duration::from_secs(tuning.connection_timeout_secs))
            .set_response_timeout(Duration::from_secs(tuning.response_timeout_secs))
            .set_max_delay(tuning.max_retry_delay_ms);

        let mut backoff_ms = tuning.initial_retry_delay_ms;
        let mut attempt = 0;

        loop {
            match ConnectionManager::new_with_config(client.clone(), manager_config.clone()).await {
                Ok(manager) => {
                    if attempt > 0 {
                        info!(attempt, "redis connected after retrying");
                    }
                    return Ok(manager);
                }
                Err(e) if attempt < tuning.initial_connection_retries => {
                    attempt += 1;
                    warn!(
                        attempt,
                        backoff_ms, "redis connection failed, will retry: {e}"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(tuning.max_retry_delay_ms);
                }
                Err(e) => {
                    return Err(AppError::internal(format!(
                        "redis unreachable after {} attempts: {e}",
                        attempt + 1
                    )));
                }
            }
        }
    }

    /// Build the full Redis key with namespace prefix
    fn build_key(key: SessionKey) -> String {
        format!("{CACHE_KEY_PREFIX}{key}")
    }
}

/// Fold a Redis failure into the unified error type, logging the failed op
fn cache_err(op: &str, e: &redis::RedisError) -> AppError {
    error!(op = %op, "redis command failed: {e}");
    AppError::internal(format!("session cache {op} failed: {e}"))
}

#[async_trait::async_trait]
impl SessionCache for RedisSessionCache {
    async fn set(
        &self,
        key: SessionKey,
        snapshot: &SessionSnapshot,
        ttl: Duration,
    ) -> AppResult<()> {
        let serialized = serde_json::to_vec(snapshot)
            .map_err(|e| AppError::internal(format!("session serialization failed: {e}")))?;
        let redis_key = Self::build_key(key);

        let mut conn = self.manager.clone();

        // SETEX sets value and expiration in one atomic operation
        conn.set_ex::<_, _, ()>(&redis_key, serialized, ttl.as_secs())
            .await
            .map_err(|e| cache_err("SETEX", &e))?;

        Ok(())
    }

    async fn get(&self, key: SessionKey) -> AppResult<Option<SessionSnapshot>> {
        let redis_key = Self::build_key(key);
        let mut conn = self.manager.clone();

        let data: Option<Vec<u8>> = conn
            .get(&redis_key)
            .await
            .map_err(|e| cache_err("GET", &e))?;

        match data {
            Some(bytes) => super::decode_snapshot(&bytes),
            None => Ok(None),
        }
    }

    async fn set_if_exists(
        &self,
        key: SessionKey,
        snapshot: &SessionSnapshot,
        ttl: Duration,
    ) -> AppResult<bool> {
        let serialized = serde_json::to_vec(snapshot)
            .map_err(|e| AppError::internal(format!("session serialization failed: {e}")))?;
        let redis_key = Self::build_key(key);

        let mut conn = self.manager.clone();

        // SET XX writes only when the key already exists; the check and
        // write are one server-side operation
        let reply: Option<String> = redis::cmd("SET")
            .arg(&redis_key)
            .arg(serialized)
            .arg("XX")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async(&mut conn)
            .await
            .map_err(|e| cache_err("SET XX", &e))?;

        Ok(reply.is_some())
    }

    async fn delete(&self, key: SessionKey) -> AppResult<()> {
        let redis_key = Self::build_key(key);
        let mut conn = self.manager.clone();

        let _: () = conn
            .del(&redis_key)
            .await
            .map_err(|e| cache_err("DEL", &e))?;

        Ok(())
    }

    async fn exists(&self, key: SessionKey) -> AppResult<bool> {
        let redis_key = Self::build_key(key);
        let mut conn = self.manager.clone();

        let exists: bool = conn
            .exists(&redis_key)
            .await
            .map_err(|e| cache_err("EXISTS", &e))?;

        Ok(exists)
    }

    async fn ttl(&self, key: SessionKey) -> AppResult<Option<Duration>> {
        let redis_key = Self::build_key(key);
        let mut conn = self.manager.clone();

        let ttl_secs: i64 = conn
            .ttl(&redis_key)
            .await
            .map_err(|e| cache_err("TTL", &e))?;

        // -2 means no key, -1 means no expiry set
        match u64::try_from(ttl_secs) {
            Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
            _ => Ok(None),
        }
    }

    async fn health_check(&self) -> AppResult<()> {
        let mut conn = self.manager.clone();

        // PING verifies the Redis connection is healthy
        let response: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| cache_err("PING", &e))?;

        if response == "PONG" {
            Ok(())
        } else {
            Err(AppError::internal(format!(
                "unexpected PING response '{response}' from session cache"
            )))
        }
    }

    async fn clear_all(&self) -> AppResult<()> {
        // Clear only keys under our namespace prefix (safe on shared Redis)
        let pattern = format!("{}{}", CACHE_KEY_PREFIX, SessionKey::all_pattern());

        let mut conn = self.manager.clone();
        let mut cursor = 0u64;

        loop {
            let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| cache_err("SCAN", &e))?;

            if !keys.is_empty() {
                let _: u64 = conn
                    .del(&keys)
                    .await
                    .map_err(|e| cache_err("DEL", &e))?;
            }

            cursor = new_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(())
    }
}
