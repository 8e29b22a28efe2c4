// ABOUTME: Request authenticator resolving per-request identity from token and session
// ABOUTME: Cookie transport first, Authorization Bearer fallback for API clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

use crate::cache::{SessionKey, SessionStore};
use crate::constants::cookies::ACCESS_TOKEN;
use crate::constants::error_messages::{LOGIN_REQUIRED, SESSION_NOT_FOUND};
use crate::errors::{AppError, AppResult};
use crate::models::SessionSnapshot;
use crate::security::cookies::get_cookie_value;
use crate::tokens::TokenCodec;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

/// Resolved identity attached to authenticated requests
///
/// Handlers read this extension instead of touching tokens or the cache.
/// Everything in it comes from the session snapshot; no durable read
/// happens on the request path.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub snapshot: SessionSnapshot,
}

/// Per-request authentication: token extraction, verification, session
/// lookup
///
/// Runs the three-step rejection ladder in order: no token, bad token,
/// no session. Each failure is distinct so clients can tell "log in"
/// apart from "refresh" apart from "session ended".
#[derive(Clone)]
pub struct RequestAuthenticator {
    codec: Arc<TokenCodec>,
    cache: SessionStore,
}

impl RequestAuthenticator {
    #[must_use]
    pub fn new(codec: Arc<TokenCodec>, cache: SessionStore) -> Self {
        Self { codec, cache }
    }

    /// Authenticate a request from its headers
    ///
    /// Cookie transport is preferred (browser clients); the
    /// `Authorization: Bearer` header is the fallback for API clients.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` when no token is present, `InvalidToken` when
    /// verification fails, `SessionNotFound` when the snapshot is gone.
    #[tracing::instrument(
        skip(self, headers),
        fields(
            transport = tracing::field::Empty,
            user_id = tracing::field::Empty,
        )
    )]
    pub async fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthedUser> {
        let token = if let Some(token) = get_cookie_value(headers, ACCESS_TOKEN) {
            tracing::Span::current().record("transport", "cookie");
            token
        } else if let Some(token) = bearer_token(headers) {
            tracing::Span::current().record("transport", "bearer");
            token
        } else {
            return Err(AppError::not_authenticated(LOGIN_REQUIRED));
        };

        let claims = self.codec.verify_access_token(&token).map_err(|e| {
            tracing::debug!("access token rejected: {e}");
            AppError::invalid_token(e.to_string())
        })?;

        tracing::Span::current().record("user_id", claims.sub.to_string());

        let Some(snapshot) = self.cache.get(SessionKey(claims.sub)).await? else {
            tracing::debug!("no live session for verified token");
            return Err(AppError::session_not_found(SESSION_NOT_FOUND));
        };

        Ok(AuthedUser { snapshot })
    }
}

/// Extract a Bearer token from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

/// axum layer attaching [`AuthedUser`] to the request or rejecting it
///
/// # Errors
///
/// Propagates the authenticator's rejection as an error response.
pub async fn require_auth(
    State(authenticator): State<RequestAuthenticator>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticator.authenticate(req.headers()).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, SessionCacheSettings};
    use crate::errors::ErrorCode;
    use crate::models::User;
    use axum::http::HeaderValue;
    use std::time::Duration;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(AuthConfig {
            activation_secret: "a".into(),
            access_secret: "b".into(),
            refresh_secret: "c".into(),
            activation_token_expiry_mins: 15,
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 3,
        }))
    }

    async fn authenticator_with_session() -> (RequestAuthenticator, User, String) {
        let codec = codec();
        let cache = SessionStore::new(&SessionCacheSettings {
            enable_background_cleanup: false,
            ..SessionCacheSettings::default()
        })
        .await
        .unwrap();

        let user = User::new("Alice".into(), "alice@example.com".into(), "hash".into());
        let snapshot = SessionSnapshot::from(&user);
        cache
            .set(SessionKey(user.id), &snapshot, Duration::from_secs(60))
            .await
            .unwrap();

        let token = codec.issue_access_token(user.id).unwrap();
        (RequestAuthenticator::new(codec, cache), user, token)
    }

    fn cookie_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_str(&format!("accessToken={token}")).unwrap(),
        );
        headers
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_no_token_is_not_authenticated() {
        let (auth, _, _) = authenticator_with_session().await;
        let err = auth.authenticate(&HeaderMap::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_bad_token_is_invalid() {
        let (auth, _, _) = authenticator_with_session().await;
        let err = auth
            .authenticate(&cookie_headers("garbage"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidToken);
    }

    #[tokio::test]
    async fn test_cookie_transport_succeeds() {
        let (auth, user, token) = authenticator_with_session().await;
        let authed = auth.authenticate(&cookie_headers(&token)).await.unwrap();
        assert_eq!(authed.snapshot.user_id, user.id);
    }

    #[tokio::test]
    async fn test_bearer_transport_succeeds() {
        let (auth, user, token) = authenticator_with_session().await;
        let authed = auth.authenticate(&bearer_headers(&token)).await.unwrap();
        assert_eq!(authed.snapshot.user_id, user.id);
    }

    #[tokio::test]
    async fn test_cookie_wins_over_bearer() {
        let (auth, _, token) = authenticator_with_session().await;
        let mut headers = cookie_headers("garbage-cookie-token");
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );

        // Cookie transport is tried first, so the bad cookie rejects the
        // request even with a valid Bearer token present
        let err = auth.authenticate(&headers).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidToken);
    }

    #[tokio::test]
    async fn test_stale_snapshot_version_is_session_not_found() {
        let (auth, user, token) = authenticator_with_session().await;

        // An entry written under an older snapshot format reads as a miss
        let mut snapshot = SessionSnapshot::from(&user);
        snapshot.version = 999;
        auth.cache
            .set(SessionKey(user.id), &snapshot, Duration::from_secs(60))
            .await
            .unwrap();

        let err = auth
            .authenticate(&cookie_headers(&token))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionNotFound);
    }

    #[tokio::test]
    async fn test_deleted_session_is_session_not_found() {
        let (auth, user, token) = authenticator_with_session().await;
        auth.cache.delete(SessionKey(user.id)).await.unwrap();

        let err = auth
            .authenticate(&cookie_headers(&token))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionNotFound);
    }
}
