// ABOUTME: Credential issuer and refresh rotator for the auth core
// ABOUTME: Registration, activation, login, logout, rotation, and atomic account mutations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

use crate::cache::{SessionKey, SessionStore};
use crate::constants::error_messages::{
    ACCOUNT_EXISTS, COURSE_ALREADY_OWNED, INVALID_ACTIVATION_CODE, INVALID_CREDENTIALS,
    INVALID_EMAIL_FORMAT, PASSWORD_TOO_SHORT, SESSION_NOT_FOUND,
};
use crate::errors::{AppError, AppResult};
use crate::mailer::Mailer;
use crate::models::{
    is_valid_email, Avatar, PendingRegistration, SessionSnapshot, SocialClaims, User, UserRole,
};
use crate::store::{verify_password, NewUser, UserStore};
use crate::tokens::{activation_code_matches, TokenCodec, TokenError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Minimum password length accepted at registration and password change
const MIN_PASSWORD_LEN: usize = 6;

/// A freshly issued login session: the account plus both credentials
///
/// The tokens go out as cookies; the account body is serialized without
/// its password hash.
#[derive(Debug)]
pub struct IssuedSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// A rotated session: the cached identity plus a fresh credential pair
///
/// Rotation works from the snapshot alone, so the body here is the
/// snapshot, not a durable account record.
#[derive(Debug)]
pub struct RotatedSession {
    pub snapshot: SessionSnapshot,
    pub access_token: String,
    pub refresh_token: String,
}

/// Credential issuer and session lifecycle service
///
/// Owns every transition between "no account", "pending activation",
/// "durable account", and "live session". Account mutations go through
/// `persist_and_cache` so the durable record and its snapshot never
/// diverge past a single call boundary.
pub struct AuthService {
    codec: Arc<TokenCodec>,
    cache: SessionStore,
    store: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    session_ttl: Duration,
}

impl AuthService {
    #[must_use]
    pub fn new(
        codec: Arc<TokenCodec>,
        cache: SessionStore,
        store: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            codec,
            cache,
            store,
            mailer,
            session_ttl,
        }
    }

    /// Begin registration: validate, issue an activation token, and email
    /// the code
    ///
    /// Nothing durable is created here; the pending registration lives
    /// only inside the returned token. A mail delivery failure aborts the
    /// flow so the client never holds a token whose code was never sent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for malformed email or short password,
    /// `DuplicateAccount` if the email is taken, `UpstreamFailure` if the
    /// activation email cannot be delivered.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<String> {
        if !is_valid_email(email) {
            return Err(AppError::invalid_input(INVALID_EMAIL_FORMAT));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::invalid_input(PASSWORD_TOO_SHORT));
        }
        if self.store.find_by_email(email).await?.is_some() {
            return Err(AppError::duplicate_account(ACCOUNT_EXISTS));
        }

        let pending = PendingRegistration {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        };
        let issued = self.codec.issue_activation_token(&pending)?;

        self.mailer
            .send(
                email,
                "Activate your account",
                "activation-mail",
                json!({ "user": { "name": name }, "activationCode": issued.code }),
            )
            .await?;

        info!(email = %email, "activation email sent");
        Ok(issued.token)
    }

    /// Complete registration: verify the token, check the code, create
    /// the account
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` for a bad or expired activation token,
    /// `InvalidCode` for a code mismatch, `DuplicateAccount` if the email
    /// was registered while the activation was pending.
    pub async fn activate(&self, token: &str, code: &str) -> AppResult<User> {
        let claims = self
            .codec
            .verify_activation_token(token)
            .map_err(activation_token_error)?;

        if !activation_code_matches(&claims.code, code) {
            return Err(AppError::invalid_code(INVALID_ACTIVATION_CODE));
        }

        // The uniqueness re-check lives inside create: registration may
        // have raced during the activation window
        let user = self
            .store
            .create(NewUser {
                name: claims.user.name,
                email: claims.user.email,
                password: claims.user.password,
                is_verified: true,
            })
            .await?;

        info!(user_id = %user.id, "account activated");
        Ok(user)
    }

    /// Authenticate with email and password, starting a login session
    ///
    /// # Errors
    ///
    /// Returns a single `InvalidCredentials` for both unknown email and
    /// wrong password, so responses don't reveal which accounts exist.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<IssuedSession> {
        let Some(user) = self.store.find_by_email(email).await? else {
            debug!("login attempt for unknown email");
            return Err(AppError::invalid_credentials(INVALID_CREDENTIALS));
        };

        if !verify_password(password.to_owned(), user.password_hash.clone()).await? {
            debug!(user_id = %user.id, "login attempt with wrong password");
            return Err(AppError::invalid_credentials(INVALID_CREDENTIALS));
        }

        self.issue_session(user).await
    }

    /// Start a session from externally-verified social identity claims,
    /// creating the account on first sight
    ///
    /// # Errors
    ///
    /// Returns an error if account creation or session issuance fails.
    pub async fn social_login(&self, claims: SocialClaims) -> AppResult<IssuedSession> {
        let user = match self.store.find_by_email(&claims.email).await? {
            Some(user) => user,
            None => {
                // Unguessable placeholder password; these accounts only
                // ever authenticate through the social path
                let mut user = self
                    .store
                    .create(NewUser {
                        name: claims.name,
                        email: claims.email,
                        password: Uuid::new_v4().to_string(),
                        is_verified: true,
                    })
                    .await?;
                if let Some(avatar) = claims.avatar {
                    user.avatar = Some(avatar);
                    self.store.save(&user).await?;
                }
                info!(user_id = %user.id, "account created via social login");
                user
            }
        };

        self.issue_session(user).await
    }

    /// End a login session by deleting its snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the cache delete fails.
    pub async fn logout(&self, user_id: Uuid) -> AppResult<()> {
        self.cache.delete(SessionKey(user_id)).await?;
        info!(user_id = %user_id, "session ended");
        Ok(())
    }

    /// Rotate credentials: a valid refresh token plus a live session
    /// yields a fresh access+refresh pair
    ///
    /// Identity comes from the snapshot alone; rotation never reads the
    /// durable store and can never resurrect a logged-out session.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for a missing, unverifiable, or expired
    /// refresh token and `SessionNotFound` when the snapshot is gone.
    pub async fn refresh_session(&self, refresh_token: &str) -> AppResult<RotatedSession> {
        let claims = self.codec.verify_refresh_token(refresh_token).map_err(|e| {
            warn!("refresh token rejected: {e}");
            AppError::permission_denied("Could not refresh token")
        })?;

        let key = SessionKey(claims.sub);
        let Some(snapshot) = self.cache.get(key).await? else {
            return Err(AppError::session_not_found(SESSION_NOT_FOUND));
        };

        let access_token = self.codec.issue_access_token(snapshot.user_id)?;
        let refresh_token = self.codec.issue_refresh_token(snapshot.user_id)?;

        // Rewrite under the full TTL: rotation extends the session
        self.cache.set(key, &snapshot, self.session_ttl).await?;

        debug!(user_id = %claims.sub, "session rotated");
        Ok(RotatedSession {
            snapshot,
            access_token,
            refresh_token,
        })
    }

    /// Read the current profile from the durable store
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the account no longer exists.
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<User> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("account {user_id}")))
    }

    /// Update name and email
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a malformed email, `DuplicateAccount`
    /// if the new email belongs to another account.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<User> {
        let mut user = self.get_profile(user_id).await?;

        if let Some(email) = email {
            if !is_valid_email(&email) {
                return Err(AppError::invalid_input(INVALID_EMAIL_FORMAT));
            }
            if email != user.email {
                if let Some(other) = self.store.find_by_email(&email).await? {
                    if other.id != user.id {
                        return Err(AppError::duplicate_account(ACCOUNT_EXISTS));
                    }
                }
                user.email = email;
            }
        }
        if let Some(name) = name {
            user.name = name;
        }

        self.persist_and_cache(user).await
    }

    /// Change the password after verifying the old one
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` if the old password does not match,
    /// `InvalidInput` if the new one is too short.
    pub async fn update_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<User> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::invalid_input(PASSWORD_TOO_SHORT));
        }

        let mut user = self.get_profile(user_id).await?;
        if !verify_password(old_password.to_owned(), user.password_hash.clone()).await? {
            return Err(AppError::invalid_credentials(INVALID_CREDENTIALS));
        }

        user.password_hash = crate::store::hash_password(new_password.to_owned()).await?;
        self.persist_and_cache(user).await
    }

    /// Replace the avatar
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the account no longer exists.
    pub async fn update_avatar(&self, user_id: Uuid, avatar: Avatar) -> AppResult<User> {
        let mut user = self.get_profile(user_id).await?;
        user.avatar = Some(avatar);
        self.persist_and_cache(user).await
    }

    /// Change an account role (admin operation)
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the account no longer exists.
    pub async fn update_role(&self, user_id: Uuid, role: UserRole) -> AppResult<User> {
        let mut user = self.get_profile(user_id).await?;
        user.role = role;
        info!(user_id = %user_id, role = %role, "role changed");
        self.persist_and_cache(user).await
    }

    /// Grant a course entitlement
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccount` if the course is already owned.
    pub async fn grant_course(&self, user_id: Uuid, course_id: Uuid) -> AppResult<User> {
        let mut user = self.get_profile(user_id).await?;
        if user.owns_course(course_id) {
            return Err(AppError::duplicate_account(COURSE_ALREADY_OWNED));
        }

        user.courses.push(course_id);
        info!(user_id = %user_id, course_id = %course_id, "course entitlement granted");
        self.persist_and_cache(user).await
    }

    /// List every account, newest first (admin operation)
    ///
    /// # Errors
    ///
    /// Returns an error if the store listing fails.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.store.list().await
    }

    /// Persist an account mutation and rewrite its snapshot in one call
    ///
    /// Every mutation funnels through here so a durable write can never
    /// land without its cache refresh. The snapshot keeps the full
    /// session TTL; a rewrite also extends the session, which matches
    /// the behavior on credential rotation.
    async fn persist_and_cache(&self, user: User) -> AppResult<User> {
        self.store.save(&user).await?;

        // A conditional write: refresh the snapshot only while the session
        // is still live, without recreating one a logout just deleted
        let snapshot = SessionSnapshot::from(&user);
        self.cache
            .set_if_exists(SessionKey(user.id), &snapshot, self.session_ttl)
            .await?;

        Ok(user)
    }

    /// Issue access+refresh tokens and write the session snapshot
    ///
    /// The snapshot write completes before the tokens leave this method,
    /// so a client can use its access token the moment it receives it.
    async fn issue_session(&self, user: User) -> AppResult<IssuedSession> {
        let access_token = self.codec.issue_access_token(user.id)?;
        let refresh_token = self.codec.issue_refresh_token(user.id)?;

        let snapshot = SessionSnapshot::from(&user);
        self.cache
            .set(SessionKey(user.id), &snapshot, self.session_ttl)
            .await?;

        info!(user_id = %user.id, "session issued");
        Ok(IssuedSession {
            user,
            access_token,
            refresh_token,
        })
    }
}

/// Map activation token failures onto the activation flow's error surface
fn activation_token_error(e: TokenError) -> AppError {
    match e {
        TokenError::Expired { .. } => AppError::invalid_token("Activation token has expired"),
        TokenError::Invalid { .. } | TokenError::Malformed { .. } => {
            AppError::invalid_token("Invalid activation token")
        }
    }
}
