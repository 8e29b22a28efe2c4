// ABOUTME: Shared constants for cookie names, cache keys, and configuration defaults
// ABOUTME: Centralizes magic values so call sites and tests agree on them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

/// Cookie names used for session token transport
pub mod cookies {
    /// Short-lived access credential cookie
    pub const ACCESS_TOKEN: &str = "accessToken";
    /// Long-lived refresh credential cookie
    pub const REFRESH_TOKEN: &str = "refreshToken";
    /// Max-age applied when clearing a cookie on logout, in seconds
    pub const EXPIRED_MAX_AGE_SECS: i64 = 1;
}

/// Session cache namespace and sizing defaults
pub mod cache {
    /// Namespace prefix for every key this service writes to a shared Redis
    pub const CACHE_KEY_PREFIX: &str = "learnhub:";
    /// Default capacity for the in-memory backend
    pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;
    /// Default sweep interval for expired in-memory entries
    pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
}

/// Configuration defaults applied when an environment variable is absent
pub mod defaults {
    /// HTTP API port
    pub const HTTP_PORT: u16 = 8081;
    /// Activation tokens expire 15 minutes after issuance
    pub const ACTIVATION_TOKEN_EXPIRY_MINS: i64 = 15;
    /// Access tokens are short-lived
    pub const ACCESS_TOKEN_EXPIRY_MINS: i64 = 60;
    /// Refresh tokens are long-lived
    pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 3;
}

/// Time unit conversions
pub mod time_constants {
    pub const SECONDS_PER_MINUTE: i64 = 60;
    pub const SECONDS_PER_HOUR: i64 = 3600;
    pub const SECONDS_PER_DAY: i64 = 86_400;
}

/// Activation code bounds: always six decimal digits
pub mod activation {
    pub const CODE_MIN: u32 = 100_000;
    pub const CODE_MAX: u32 = 999_999;
    pub const CODE_LEN: usize = 6;
}

/// User-facing error message strings
pub mod error_messages {
    /// Identical for unknown email and wrong password to resist enumeration
    pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
    pub const ACCOUNT_EXISTS: &str = "An account with this email already exists";
    pub const INVALID_ACTIVATION_CODE: &str = "Invalid activation code";
    pub const LOGIN_REQUIRED: &str = "Please log in to access this resource";
    pub const SESSION_NOT_FOUND: &str = "Session not found, please log in again";
    pub const INVALID_EMAIL_FORMAT: &str = "Please enter a valid email address";
    pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters long";
    pub const COURSE_ALREADY_OWNED: &str = "You have already purchased this course";
}

/// Service identity for logging
pub mod service_names {
    pub const LEARNHUB_SERVER: &str = "learnhub-server";
}
