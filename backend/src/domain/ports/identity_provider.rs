//! Port for the external identity collaborator.
//!
//! The engine never authenticates anyone. It asks the collaborator who is
//! signed in and whether a given identifier belongs to a real user.

use async_trait::async_trait;

use crate::domain::{KnownUser, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity adapters.
    pub enum IdentityProviderError {
        Connection { message: String } => "identity provider unreachable: {message}",
        Rejected { message: String } => "identity provider rejected the call: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Identifier of the signed-in user, if any.
    async fn current_user(&self) -> Result<Option<UserId>, IdentityProviderError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), IdentityProviderError>;

    /// Confirm `user_id` and return its timezone.
    async fn find_user(&self, user_id: &UserId)
    -> Result<Option<KnownUser>, IdentityProviderError>;
}

/// Fixture provider that confirms every user in UTC and has nobody signed in.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn current_user(&self) -> Result<Option<UserId>, IdentityProviderError> {
        Ok(None)
    }

    async fn sign_out(&self) -> Result<(), IdentityProviderError> {
        Ok(())
    }

    async fn find_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<KnownUser>, IdentityProviderError> {
        Ok(Some(KnownUser::utc(user_id.clone())))
    }
}
