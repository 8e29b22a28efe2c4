// ABOUTME: Server binary wiring config, logging, cache, store, and routes
// ABOUTME: Boots the HTTP API with graceful shutdown on Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

//! # LearnHub Server Binary
//!
//! Starts the session and entitlement auth API. Configuration comes from
//! the environment (and `.env` in development); a few flags override it.

use anyhow::Result;
use clap::Parser;
use learnhub_server::{
    cache::SessionStore,
    config::ServerConfig,
    logging::LoggingConfig,
    mailer::LogMailer,
    middleware::auth::RequestAuthenticator,
    routes::{self, AppState},
    services::AuthService,
    store::InMemoryUserStore,
    tokens::TokenCodec,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "learnhub-server")]
#[command(about = "LearnHub - session and entitlement auth API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    let mut logging = LoggingConfig::from_env();
    if let Some(level) = args.log_level {
        logging.level = level;
    }
    logging.init()?;

    info!(
        environment = %config.environment,
        port = config.http_port,
        "starting LearnHub server"
    );

    let config = Arc::new(config);
    let codec = Arc::new(TokenCodec::new(config.auth.clone()));
    let cache = SessionStore::new(&config.cache).await?;
    let store = Arc::new(InMemoryUserStore::new());
    let mailer = Arc::new(LogMailer);

    let auth = Arc::new(AuthService::new(
        codec.clone(),
        cache.clone(),
        store,
        mailer,
        config.auth.session_ttl(),
    ));
    let authenticator = RequestAuthenticator::new(codec, cache.clone());

    let app = routes::router(AppState {
        config: config.clone(),
        auth,
        authenticator,
        cache,
    });

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
    info!("shutdown signal received");
}
