// ABOUTME: Main library entry point for the LearnHub auth core
// ABOUTME: Session and entitlement authentication for the e-learning platform
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

#![deny(unsafe_code)]

//! # LearnHub Server
//!
//! The session and entitlement authentication core of the LearnHub platform.
//! Accounts prove who they are once (email/password or a social identity
//! provider), receive a short-lived access credential and a longer-lived
//! refresh credential, and every subsequent request is resolved against a
//! cache-backed session snapshot.
//!
//! ## Components
//!
//! - **Token codec**: HS256 activation, access, and refresh tokens, each
//!   with its own secret and lifetime
//! - **Session cache**: pluggable in-memory or Redis snapshot store; a
//!   live entry is what makes a session valid
//! - **Credential issuer**: registration with email activation, login,
//!   social login, logout, and atomic account mutations
//! - **Request authenticator**: cookie-first token transport resolving a
//!   per-request identity without touching durable storage
//! - **Authorization gate**: declarative role allow-lists per route
//! - **Refresh rotator**: new credential pairs for live sessions only
//!
//! ## Example
//!
//! ```rust,no_run
//! use learnhub_server::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("LearnHub server configured for port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Session snapshot cache with pluggable backends
pub mod cache;

/// Environment-based configuration
pub mod config;

/// Shared constants: cookie names, cache namespace, defaults, messages
pub mod constants;

/// Unified error type and HTTP error mapping
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Outbound mail seam
pub mod mailer;

/// Request authentication and role authorization middleware
pub mod middleware;

/// Domain models: accounts, roles, session snapshots
pub mod models;

/// HTTP routes and application state
pub mod routes;

/// Cookie transport helpers
pub mod security;

/// Credential issuance and account lifecycle services
pub mod services;

/// Durable account store abstraction
pub mod store;

/// Signed-token codec
pub mod tokens;
