// ABOUTME: Signed-token codec for activation, access, and refresh credentials
// ABOUTME: HS256 issuance and verification with per-purpose secrets and lifetimes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

//! # Token Codec
//!
//! Creates and verifies the three signed token classes of the auth core:
//!
//! - **Activation tokens** carry a pending registration plus a 6-digit
//!   numeric code; the token is the cryptographic artifact, the code is a
//!   second factor against token leakage during the email round-trip.
//! - **Access tokens** and **refresh tokens** carry the account id only,
//!   never role or password, each signed with its own secret and lifetime.
//!
//! The codec is a pure function of injected configuration, payload, and
//! clock. Verification uses zero clock leeway, matching the behavior the
//! rest of the platform was built against.

use crate::config::AuthConfig;
use crate::constants::{activation, time_constants::SECONDS_PER_HOUR};
use crate::errors::{AppError, AppResult};
use crate::models::PendingRegistration;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Wire version stamped into every token's claims
///
/// Versioned independently of the cached session snapshot: a token format
/// change and a snapshot format change roll out on their own schedules.
pub const CLAIMS_VERSION: u16 = 1;

/// Convert a duration to a human-readable format for expiry logging
fn humanize_duration(duration: Duration) -> String {
    let total_secs = duration.num_seconds().abs();
    let hours = total_secs / SECONDS_PER_HOUR;
    let minutes = (total_secs % SECONDS_PER_HOUR) / 60;

    if hours > 0 {
        format!("{hours} hours")
    } else if minutes > 0 {
        format!("{minutes} minutes")
    } else {
        format!("{total_secs} seconds")
    }
}

/// Token verification error with detailed information
#[derive(Debug, Clone)]
pub enum TokenError {
    /// Token has expired
    Expired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    Invalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is garbled (not proper JWT format)
    Malformed {
        /// Details about malformation
        details: String,
    },
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expired {
                expired_at,
                current_time,
            } => {
                let since = current_time.signed_duration_since(*expired_at);
                write!(
                    f,
                    "token expired {} ago at {}",
                    humanize_duration(since),
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::Invalid { reason } => write!(f, "token signature is invalid: {reason}"),
            Self::Malformed { details } => write!(f, "token is malformed: {details}"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Claims carried by an activation token
///
/// The pending registration exists only inside this token; the server keeps
/// no record of it until activation succeeds.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActivationClaims {
    /// Claims wire version
    pub ver: u16,
    /// Pending registration payload
    pub user: PendingRegistration,
    /// 6-digit numeric activation code, delivered separately by email
    pub code: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Claims carried by an access token: the minimal identity claim
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Claims wire version
    pub ver: u16,
    /// Account identifier
    pub sub: Uuid,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Claims carried by a refresh token
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Claims wire version
    pub ver: u16,
    /// Account identifier
    pub sub: Uuid,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// An issued activation token and the code it carries
///
/// The token travels back to the client in the API response; the code
/// travels only through the activation email.
#[derive(Debug)]
pub struct IssuedActivation {
    pub token: String,
    pub code: String,
}

/// Signed-token codec holding the injected auth configuration
pub struct TokenCodec {
    auth: AuthConfig,
    /// Monotonic counter to ensure unique issued-at values for tokens
    /// minted in the same instant
    token_counter: AtomicU64,
}

impl Clone for TokenCodec {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            // Fresh counter per instance; each maintains uniqueness independently
            token_counter: AtomicU64::new(0),
        }
    }
}

impl TokenCodec {
    /// Create a codec from immutable auth configuration
    #[must_use]
    pub const fn new(auth: AuthConfig) -> Self {
        Self {
            auth,
            token_counter: AtomicU64::new(0),
        }
    }

    /// Millisecond-scale issued-at with a counter component so two tokens
    /// minted in the same second still differ
    fn unique_iat(&self, now: DateTime<Utc>) -> i64 {
        let counter = self.token_counter.fetch_add(1, Ordering::Relaxed);
        now.timestamp() * 1000 + i64::from(u32::try_from(counter % 1000).unwrap_or(0))
    }

    /// Issue an activation token embedding the pending registration and a
    /// freshly generated 6-digit code
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn issue_activation_token(
        &self,
        pending: &PendingRegistration,
    ) -> AppResult<IssuedActivation> {
        let code = generate_activation_code();
        let now = Utc::now();
        let expiry = now + Duration::minutes(self.auth.activation_token_expiry_mins);

        let claims = ActivationClaims {
            ver: CLAIMS_VERSION,
            user: pending.clone(),
            code: code.clone(),
            iat: self.unique_iat(now),
            exp: expiry.timestamp(),
        };

        let token = Self::encode_claims(&claims, &self.auth.activation_secret)?;
        Ok(IssuedActivation { token, code })
    }

    /// Verify an activation token and return its claims
    pub fn verify_activation_token(&self, token: &str) -> Result<ActivationClaims, TokenError> {
        let claims: ActivationClaims = Self::decode_claims(token, &self.auth.activation_secret)?;
        Self::check_expiry(claims.exp)?;
        Ok(claims)
    }

    /// Issue an access token for an account
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn issue_access_token(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            ver: CLAIMS_VERSION,
            sub: user_id,
            iat: self.unique_iat(now),
            exp: (now + Duration::minutes(self.auth.access_token_expiry_mins)).timestamp(),
        };
        Self::encode_claims(&claims, &self.auth.access_secret)
    }

    /// Issue a refresh token for an account
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn issue_refresh_token(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let claims = RefreshClaims {
            ver: CLAIMS_VERSION,
            sub: user_id,
            iat: self.unique_iat(now),
            exp: (now + Duration::days(self.auth.refresh_token_expiry_days)).timestamp(),
        };
        Self::encode_claims(&claims, &self.auth.refresh_secret)
    }

    /// Verify an access token and return its claims
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let claims: AccessClaims = Self::decode_claims(token, &self.auth.access_secret)?;
        Self::check_expiry(claims.exp)?;
        Ok(claims)
    }

    /// Verify a refresh token and return its claims
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims: RefreshClaims = Self::decode_claims(token, &self.auth.refresh_secret)?;
        Self::check_expiry(claims.exp)?;
        Ok(claims)
    }

    fn encode_claims<C: Serialize>(claims: &C, secret: &str) -> AppResult<String> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::internal(format!("token encoding failed: {e}")))
    }

    /// Decode claims without expiration validation; expiry is checked
    /// separately so an expired token yields a distinct error
    fn decode_claims<C: DeserializeOwned>(token: &str, secret: &str) -> Result<C, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        decode::<C>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| Self::convert_jwt_error(&e))
    }

    /// Check token expiry with zero leeway
    fn check_expiry(exp: i64) -> Result<(), TokenError> {
        let current_time = Utc::now();
        if current_time.timestamp() > exp {
            let expired_at = DateTime::from_timestamp(exp, 0).unwrap_or_else(Utc::now);
            tracing::warn!(
                "token expired {} ago at {}",
                humanize_duration(current_time.signed_duration_since(expired_at)),
                expired_at.to_rfc3339()
            );
            return Err(TokenError::Expired {
                expired_at,
                current_time,
            });
        }
        Ok(())
    }

    /// Convert JWT library errors to detailed verification errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> TokenError {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::InvalidSignature => {
                tracing::warn!("token signature verification failed");
                TokenError::Invalid {
                    reason: "signature verification failed".into(),
                }
            }
            ErrorKind::InvalidToken => TokenError::Malformed {
                details: "token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => TokenError::Malformed {
                details: format!("token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => TokenError::Malformed {
                details: format!("token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => TokenError::Malformed {
                details: format!("token contains invalid UTF-8: {utf8_err}"),
            },
            _ => TokenError::Invalid {
                reason: format!("token verification failed: {e}"),
            },
        }
    }
}

/// Generate a uniformly random 6-digit activation code
#[must_use]
pub fn generate_activation_code() -> String {
    let code = rand::thread_rng().gen_range(activation::CODE_MIN..=activation::CODE_MAX);
    code.to_string()
}

/// Compare a submitted activation code against the expected one in
/// constant time
#[must_use]
pub fn activation_code_matches(expected: &str, submitted: &str) -> bool {
    if expected.len() != submitted.len() {
        return false;
    }
    expected.as_bytes().ct_eq(submitted.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_auth_config() -> AuthConfig {
        AuthConfig {
            activation_secret: "activation-secret".into(),
            access_secret: "access-secret".into(),
            refresh_secret: "refresh-secret".into(),
            activation_token_expiry_mins: 15,
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 3,
        }
    }

    #[test]
    fn test_activation_code_shape() {
        for _ in 0..50 {
            let code = generate_activation_code();
            assert_eq!(code.len(), activation::CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn test_activation_code_comparison() {
        assert!(activation_code_matches("123456", "123456"));
        assert!(!activation_code_matches("123456", "123457"));
        assert!(!activation_code_matches("123456", "12345"));
        assert!(!activation_code_matches("123456", ""));
    }

    #[test]
    fn test_access_and_refresh_secrets_are_independent() {
        let codec = TokenCodec::new(test_auth_config());
        let user_id = Uuid::new_v4();

        let access = codec.issue_access_token(user_id).unwrap();
        let refresh = codec.issue_refresh_token(user_id).unwrap();

        // A refresh token must not verify as an access token, and vice versa
        assert!(matches!(
            codec.verify_access_token(&refresh),
            Err(TokenError::Invalid { .. })
        ));
        assert!(matches!(
            codec.verify_refresh_token(&access),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[test]
    fn test_tokens_minted_back_to_back_differ() {
        let codec = TokenCodec::new(test_auth_config());
        let user_id = Uuid::new_v4();

        let first = codec.issue_access_token(user_id).unwrap();
        let second = codec.issue_access_token(user_id).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_expired_token_is_detected() {
        let mut config = test_auth_config();
        config.access_token_expiry_mins = -5;
        let codec = TokenCodec::new(config);

        let token = codec.issue_access_token(Uuid::new_v4()).unwrap();
        assert!(matches!(
            codec.verify_access_token(&token),
            Err(TokenError::Expired { .. })
        ));
    }

    #[test]
    fn test_issued_claims_carry_the_claims_version() {
        let codec = TokenCodec::new(test_auth_config());
        let user_id = Uuid::new_v4();

        let access = codec.issue_access_token(user_id).unwrap();
        let refresh = codec.issue_refresh_token(user_id).unwrap();

        assert_eq!(codec.verify_access_token(&access).unwrap().ver, CLAIMS_VERSION);
        assert_eq!(
            codec.verify_refresh_token(&refresh).unwrap().ver,
            CLAIMS_VERSION
        );
    }

    #[test]
    fn test_garbled_token_is_malformed() {
        let codec = TokenCodec::new(test_auth_config());
        assert!(matches!(
            codec.verify_access_token("not-a-jwt"),
            Err(TokenError::Malformed { .. })
        ));
    }
}
