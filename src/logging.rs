// ABOUTME: Structured logging setup for the auth core
// ABOUTME: Level and output shape come from the environment, nothing else
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

//! Structured logging with environment-selected output format
//!
//! Secrets, tokens, and passwords are never logged anywhere in the crate;
//! the subscriber configured here only controls level and shape.

use crate::constants::service_names;
use anyhow::Result;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Base log level when `RUST_LOG` carries no directives
    pub level: String,
    /// Output shape, from `LOG_FORMAT`
    pub format: LogFormat,
    /// Emit source file and line on each event
    pub include_location: bool,
    /// Emit span open/close events
    pub include_spans: bool,
    /// Service name reported at startup
    pub service_name: String,
}

/// Output shape of the log stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, for log aggregation
    Json,
    /// Multi-line human-readable output for development
    Pretty,
    /// Single-line output for terse terminals
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_spans: false,
            service_name: service_names::LEARNHUB_SERVER.into(),
        }
    }
}

impl LoggingConfig {
    /// Read logging settings from the environment
    ///
    /// Production defaults to location and span events on, since those are
    /// what make aggregated logs traceable.
    #[must_use]
    pub fn from_env() -> Self {
        let production = env::var("ENVIRONMENT").as_deref() == Ok("production");

        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                Ok("compact") => LogFormat::Compact,
                _ => LogFormat::Pretty,
            },
            include_location: production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_spans: production || env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| service_names::LEARNHUB_SERVER.into()),
        }
    }

    /// Install the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a subscriber was already installed.
    pub fn init(&self) -> Result<()> {
        let base = fmt::layer()
            .with_writer(io::stdout)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_span_events(if self.include_spans {
                FmtSpan::NEW | FmtSpan::CLOSE
            } else {
                FmtSpan::NONE
            });

        let formatted = match self.format {
            LogFormat::Json => base.json().boxed(),
            LogFormat::Pretty => base.boxed(),
            LogFormat::Compact => base.with_target(false).compact().boxed(),
        };

        tracing_subscriber::registry()
            .with(self.build_filter())
            .with(formatted)
            .try_init()?;

        info!(
            service = %self.service_name,
            version = env!("CARGO_PKG_VERSION"),
            level = %self.level,
            "logging initialized"
        );

        Ok(())
    }

    /// Filter from `RUST_LOG` (or the configured level), with dependency
    /// noise held down regardless
    fn build_filter(&self) -> EnvFilter {
        let mut filter =
            env::var("RUST_LOG").map_or_else(|_| EnvFilter::new(&self.level), EnvFilter::new);

        for directive in [
            "hyper=warn".to_owned(),
            "tower_http=info".to_owned(),
            format!("learnhub_server={}", self.level),
        ] {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }

        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shape_is_pretty() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(!config.include_location);
    }
}
