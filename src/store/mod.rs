// ABOUTME: Durable account store abstraction for the auth core
// ABOUTME: Object-safe trait so services can share an Arc<dyn UserStore>
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

/// In-memory account store implementation
pub mod memory;

use crate::errors::{AppError, AppResult};
use crate::models::User;
use uuid::Uuid;

pub use memory::InMemoryUserStore;

/// Fields required to create a durable account
///
/// The password arrives in plaintext and is hashed inside `create`; the
/// store never persists a plaintext password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_verified: bool,
}

/// Durable account store
///
/// The source of truth for accounts; the session cache holds projections
/// of it. Email lookups are the uniqueness check for registration, so
/// `create` callers re-check existence right before inserting.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Find an account by email, `None` if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find an account by id, `None` if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Create an account, hashing the password before insert
    ///
    /// # Errors
    ///
    /// Returns an error if an account with the same email already exists
    /// or if hashing fails
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Persist a modified account, replacing the stored record
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist
    async fn save(&self, user: &User) -> AppResult<()>;

    /// List all accounts, newest first (admin view)
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails
    async fn list(&self) -> AppResult<Vec<User>>;
}

/// Hash a password on the blocking pool; bcrypt is CPU-bound and must not
/// stall the async runtime
///
/// # Errors
///
/// Returns an error if hashing fails or the blocking task is cancelled
pub async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored hash on the blocking pool
///
/// # Errors
///
/// Returns an error if verification itself fails; a wrong password is
/// `Ok(false)`, not an error
pub async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash))
        .await
        .map_err(|e| AppError::internal(format!("password verification task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("password verification failed: {e}")))
}
