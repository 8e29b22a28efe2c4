// ABOUTME: Session cookie transport for access and refresh credentials
// ABOUTME: httpOnly SameSite=Lax cookies, Secure only in production
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

use crate::config::ServerConfig;
use crate::constants::cookies::{ACCESS_TOKEN, EXPIRED_MAX_AGE_SECS, REFRESH_TOKEN};
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Extract a named cookie value from request headers
///
/// Tokens never appear in URLs or bodies, so this is the only read path
/// for browser credentials.
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get("cookie")?.to_str().ok()?;

    cookie_header.split(';').find_map(|pair| {
        let mut parts = pair.trim().splitn(2, '=');
        let key = parts.next()?;
        let value = parts.next()?;
        (key == name).then(|| value.to_owned())
    })
}

/// Build the access+refresh cookie pair for a fresh session
///
/// httpOnly keeps tokens away from scripts, SameSite=Lax blocks cross-site
/// POSTs, and Secure is applied only under `ENVIRONMENT=production` so
/// local HTTP development still works.
#[must_use]
pub fn session_cookies(
    config: &ServerConfig,
    access_token: String,
    refresh_token: String,
) -> (Cookie<'static>, Cookie<'static>) {
    let secure = config.environment.is_production();

    let access = base_cookie(
        ACCESS_TOKEN,
        access_token,
        secure,
        config.auth.access_token_max_age_secs(),
    );
    let refresh = base_cookie(
        REFRESH_TOKEN,
        refresh_token,
        secure,
        config.auth.refresh_token_max_age_secs(),
    );

    (access, refresh)
}

/// Build the cookie pair that clears both credentials at logout
#[must_use]
pub fn expired_session_cookies(config: &ServerConfig) -> (Cookie<'static>, Cookie<'static>) {
    let secure = config.environment.is_production();

    let access = base_cookie(ACCESS_TOKEN, String::new(), secure, EXPIRED_MAX_AGE_SECS);
    let refresh = base_cookie(REFRESH_TOKEN, String::new(), secure, EXPIRED_MAX_AGE_SECS);

    (access, refresh)
}

fn base_cookie(
    name: &'static str,
    value: String,
    secure: bool,
    max_age_secs: i64,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, ServerConfig};
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_cookie_extraction() {
        let headers = headers_with_cookie("accessToken=abc123; refreshToken=def456");
        assert_eq!(
            get_cookie_value(&headers, ACCESS_TOKEN),
            Some("abc123".to_owned())
        );
        assert_eq!(
            get_cookie_value(&headers, REFRESH_TOKEN),
            Some("def456".to_owned())
        );
        assert_eq!(get_cookie_value(&headers, "other"), None);
    }

    #[test]
    fn test_cookie_extraction_handles_whitespace() {
        let headers = headers_with_cookie(" accessToken=abc123 ;refreshToken=def456");
        assert_eq!(
            get_cookie_value(&headers, ACCESS_TOKEN),
            Some("abc123".to_owned())
        );
    }

    #[test]
    fn test_session_cookie_attributes() {
        let config = ServerConfig::for_tests(Environment::Development);
        let (access, refresh) = session_cookies(&config, "tok-a".into(), "tok-r".into());

        assert_eq!(access.name(), ACCESS_TOKEN);
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.secure(), Some(false));
        assert_eq!(
            access.max_age(),
            Some(Duration::seconds(config.auth.access_token_max_age_secs()))
        );
        assert_eq!(refresh.name(), REFRESH_TOKEN);
        assert_eq!(
            refresh.max_age(),
            Some(Duration::seconds(config.auth.refresh_token_max_age_secs()))
        );
    }

    #[test]
    fn test_secure_flag_in_production() {
        let config = ServerConfig::for_tests(Environment::Production);
        let (access, _) = session_cookies(&config, "tok-a".into(), "tok-r".into());
        assert_eq!(access.secure(), Some(true));
    }

    #[test]
    fn test_logout_cookies_expire_immediately() {
        let config = ServerConfig::for_tests(Environment::Development);
        let (access, refresh) = expired_session_cookies(&config);

        assert_eq!(access.value(), "");
        assert_eq!(access.max_age(), Some(Duration::seconds(1)));
        assert_eq!(refresh.value(), "");
    }
}
