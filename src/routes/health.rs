// ABOUTME: Health endpoint reporting service and session backend status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

use super::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub session_backend: &'static str,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let backend_healthy = state.cache.health_check().await.is_ok();

    let response = HealthResponse {
        status: if backend_healthy { "healthy" } else { "degraded" },
        service: crate::constants::service_names::LEARNHUB_SERVER,
        version: env!("CARGO_PKG_VERSION"),
        session_backend: if backend_healthy { "up" } else { "down" },
    };

    let status = if backend_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
