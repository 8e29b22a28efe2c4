// ABOUTME: In-memory account store backed by a RwLock-protected map
// ABOUTME: Reference backend for single-instance deployments and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LearnHub

use super::{hash_password, NewUser, UserStore};
use crate::constants::error_messages::ACCOUNT_EXISTS;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory account store keyed by account id
///
/// Email uniqueness is enforced at insert under the write lock, so two
/// concurrent `create` calls for the same email cannot both succeed.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        // Hash outside the lock; bcrypt takes tens of milliseconds
        let password_hash = hash_password(new_user.password).await?;

        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::duplicate_account(ACCOUNT_EXISTS));
        }

        let mut user = User::new(new_user.name, new_user.email, password_hash);
        user.is_verified = new_user.is_verified;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::not_found(format!("account {}", user.id)));
        }

        let mut updated = user.clone();
        updated.updated_at = chrono::Utc::now();
        users.insert(updated.id, updated);
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}
