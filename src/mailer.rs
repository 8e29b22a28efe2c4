// ABOUTME: Outbound mail seam for activation and notification emails
// ABOUTME: Trait plus a logging implementation for development and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

use crate::errors::AppResult;
use serde_json::Value;

/// Outbound mail delivery
///
/// Registration treats delivery failure as fatal: if the activation email
/// cannot be sent, no activation token reaches the client either.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Send a templated email
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails
    async fn send(&self, to: &str, subject: &str, template: &str, data: Value) -> AppResult<()>;
}

/// Mailer that logs instead of delivering
///
/// Used in development and tests; the activation code appears in the logs
/// so the flow can be exercised end to end without an SMTP relay.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, template: &str, data: Value) -> AppResult<()> {
        tracing::info!(
            to = %to,
            subject = %subject,
            template = %template,
            data = %data,
            "mail delivery (log only)"
        );
        Ok(())
    }
}
