//! Port for materialised user progress.

use async_trait::async_trait;

use crate::domain::{UserId, UserProgress};

use super::define_port_error;

define_port_error! {
    /// Errors raised by progress adapters.
    pub enum ProgressRepositoryError {
        Connection { message: String } => "progress store connection failed: {message}",
        Query { message: String } => "progress store query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Stored progress for `user_id`, if any activity has been recorded.
    async fn find(&self, user_id: &UserId)
    -> Result<Option<UserProgress>, ProgressRepositoryError>;

    /// Insert or replace the progress record.
    async fn save(&self, progress: &UserProgress) -> Result<(), ProgressRepositoryError>;
}

/// Fixture repository with no stored progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProgressRepository;

#[async_trait]
impl ProgressRepository for FixtureProgressRepository {
    async fn find(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<UserProgress>, ProgressRepositoryError> {
        Ok(None)
    }

    async fn save(&self, _progress: &UserProgress) -> Result<(), ProgressRepositoryError> {
        Ok(())
    }
}
