// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses secrets, token lifetimes, cache settings, and runtime options once at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

//! Environment-based configuration management
//!
//! The whole configuration is materialized into one immutable [`ServerConfig`]
//! at process start and passed by reference afterwards. No component of the
//! auth core reads the process environment on its own.

use crate::constants::{cache, defaults, time_constants};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::warn;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Environment type controlling cookie security and secret requirements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Token signing secrets and lifetimes
///
/// Access and refresh values are independent so access-token exposure risk
/// can be tuned without changing how often a password is required.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret signing activation tokens
    pub activation_secret: String,
    /// Secret signing access tokens
    pub access_secret: String,
    /// Secret signing refresh tokens
    pub refresh_secret: String,
    /// Activation token lifetime in minutes (15 in every deployment;
    /// overridable only so the expiry property is testable without sleeping)
    pub activation_token_expiry_mins: i64,
    /// Access token lifetime in minutes
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days
    pub refresh_token_expiry_days: i64,
}

impl AuthConfig {
    /// Access-token cookie max-age
    #[must_use]
    pub const fn access_token_max_age_secs(&self) -> i64 {
        self.access_token_expiry_mins * time_constants::SECONDS_PER_MINUTE
    }

    /// Refresh-token cookie max-age
    #[must_use]
    pub const fn refresh_token_max_age_secs(&self) -> i64 {
        self.refresh_token_expiry_days * time_constants::SECONDS_PER_DAY
    }

    /// TTL applied to every session snapshot write: a session may not
    /// outlive the refresh credential that could revive it
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        #[allow(clippy::cast_sign_loss)] // lifetimes are validated non-negative at load
        Duration::from_secs(self.refresh_token_max_age_secs() as u64)
    }
}

/// Redis connection and retry tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConnectionConfig {
    /// Timeout for establishing a connection, in seconds
    pub connection_timeout_secs: u64,
    /// Timeout for individual commands, in seconds
    pub response_timeout_secs: u64,
    /// Retries before giving up on the initial connection
    pub initial_connection_retries: usize,
    /// Delay before the first reconnect attempt, in milliseconds
    pub initial_retry_delay_ms: u64,
    /// Cap on the exponential backoff delay, in milliseconds
    pub max_retry_delay_ms: u64,
}

impl Default for RedisConnectionConfig {
    fn default() -> Self {
        Self {
            connection_timeout_secs: 5,
            response_timeout_secs: 2,
            initial_connection_retries: 3,
            initial_retry_delay_ms: 200,
            max_retry_delay_ms: 5_000,
        }
    }
}

/// Session cache backend selection and sizing
#[derive(Debug, Clone)]
pub struct SessionCacheSettings {
    /// Redis connection URL; in-memory backend when absent
    pub redis_url: Option<String>,
    /// Maximum entries for the in-memory backend
    pub max_entries: usize,
    /// Sweep interval for expired in-memory entries
    pub cleanup_interval: Duration,
    /// Enable the background sweep task (disabled in tests)
    pub enable_background_cleanup: bool,
    /// Redis connection and retry configuration
    pub redis_connection: RedisConnectionConfig,
}

impl Default for SessionCacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            max_entries: cache::DEFAULT_CACHE_MAX_ENTRIES,
            cleanup_interval: Duration::from_secs(cache::DEFAULT_CLEANUP_INTERVAL_SECS),
            enable_background_cleanup: true,
            redis_connection: RedisConnectionConfig::default(),
        }
    }
}

/// Top-level immutable server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Token secrets and lifetimes
    pub auth: AuthConfig,
    /// Session cache settings
    pub cache: SessionCacheSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a value fails to parse, or when a signing
    /// secret is missing in a production environment.
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let environment =
            Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let config = Self {
            http_port: env_var_or("HTTP_PORT", &defaults::HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            log_level: LogLevel::from_str_or_default(&env_var_or("RUST_LOG", "info")),
            environment,
            auth: AuthConfig {
                activation_secret: secret_var("ACTIVATION_SECRET", environment)?,
                access_secret: secret_var("ACCESS_TOKEN_SECRET", environment)?,
                refresh_secret: secret_var("REFRESH_TOKEN_SECRET", environment)?,
                activation_token_expiry_mins: defaults::ACTIVATION_TOKEN_EXPIRY_MINS,
                access_token_expiry_mins: env_var_or(
                    "ACCESS_TOKEN_EXPIRY_MINS",
                    &defaults::ACCESS_TOKEN_EXPIRY_MINS.to_string(),
                )
                .parse()
                .context("Invalid ACCESS_TOKEN_EXPIRY_MINS value")?,
                refresh_token_expiry_days: env_var_or(
                    "REFRESH_TOKEN_EXPIRY_DAYS",
                    &defaults::REFRESH_TOKEN_EXPIRY_DAYS.to_string(),
                )
                .parse()
                .context("Invalid REFRESH_TOKEN_EXPIRY_DAYS value")?,
            },
            cache: SessionCacheSettings {
                redis_url: env::var("REDIS_URL").ok(),
                max_entries: env_var_or(
                    "CACHE_MAX_ENTRIES",
                    &cache::DEFAULT_CACHE_MAX_ENTRIES.to_string(),
                )
                .parse()
                .context("Invalid CACHE_MAX_ENTRIES value")?,
                cleanup_interval: Duration::from_secs(
                    env_var_or(
                        "CACHE_CLEANUP_INTERVAL_SECS",
                        &cache::DEFAULT_CLEANUP_INTERVAL_SECS.to_string(),
                    )
                    .parse()
                    .context("Invalid CACHE_CLEANUP_INTERVAL_SECS value")?,
                ),
                enable_background_cleanup: true,
                redis_connection: RedisConnectionConfig::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Fixed configuration for tests and local harnesses; no environment
    /// reads, background cleanup disabled
    #[must_use]
    pub fn for_tests(environment: Environment) -> Self {
        Self {
            http_port: 0,
            log_level: LogLevel::Debug,
            environment,
            auth: AuthConfig {
                activation_secret: "test-activation-secret".to_owned(),
                access_secret: "test-access-secret".to_owned(),
                refresh_secret: "test-refresh-secret".to_owned(),
                activation_token_expiry_mins: defaults::ACTIVATION_TOKEN_EXPIRY_MINS,
                access_token_expiry_mins: defaults::ACCESS_TOKEN_EXPIRY_MINS,
                refresh_token_expiry_days: defaults::REFRESH_TOKEN_EXPIRY_DAYS,
            },
            cache: SessionCacheSettings {
                enable_background_cleanup: false,
                ..SessionCacheSettings::default()
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.auth.access_token_expiry_mins <= 0 {
            bail!("ACCESS_TOKEN_EXPIRY_MINS must be positive");
        }
        if self.auth.refresh_token_expiry_days <= 0 {
            bail!("REFRESH_TOKEN_EXPIRY_DAYS must be positive");
        }
        Ok(())
    }
}

/// Read an environment variable with a default fallback
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a signing secret: required in production, defaulted with a warning
/// everywhere else
fn secret_var(key: &str, environment: Environment) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ if environment.is_production() => {
            bail!("{key} must be set in a production environment")
        }
        _ => {
            warn!("{} not set, using an insecure development default", key);
            Ok(format!("dev-{}", key.to_lowercase().replace('_', "-")))
        }
    }
}
