// ABOUTME: Security helpers shared across middleware and routes
// ABOUTME: Cookie parsing and session cookie construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

/// Session cookie parsing and construction
pub mod cookies;
