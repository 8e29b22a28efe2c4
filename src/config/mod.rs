// ABOUTME: Configuration module root re-exporting the environment-backed config types
// ABOUTME: All configuration is read once at startup and injected, never ambient
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

/// Environment-backed server configuration
pub mod environment;

pub use environment::{
    AuthConfig, Environment, LogLevel, RedisConnectionConfig, ServerConfig, SessionCacheSettings,
};
