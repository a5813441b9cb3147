//! Process-local identity directory.
//!
//! Stands in for the external identity collaborator: a fixed set of known
//! users with their UTC offsets and at most one signed-in user.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::FixedOffset;

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{KnownUser, UserId};

#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    users: RwLock<HashMap<UserId, FixedOffset>>,
    current: RwLock<Option<UserId>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory seeded with `users`.
    pub fn with_users(users: impl IntoIterator<Item = KnownUser>) -> Self {
        let directory = Self::new();
        for user in users {
            directory.register(user);
        }
        directory
    }

    /// Add or replace a known user.
    pub fn register(&self, user: KnownUser) {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.id, user.utc_offset);
    }

    /// Mark `user_id` as signed in. Unknown ids are accepted as given.
    pub fn sign_in(&self, user_id: UserId) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(user_id);
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn current_user(&self) -> Result<Option<UserId>, IdentityProviderError> {
        Ok(self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn sign_out(&self) -> Result<(), IdentityProviderError> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }

    async fn find_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<KnownUser>, IdentityProviderError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.get(user_id).map(|offset| KnownUser {
            id: user_id.clone(),
            utc_offset: *offset,
        }))
    }
}
