//! Port for badges awarded to users.

use async_trait::async_trait;

use crate::domain::{UserBadge, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by badge award adapters.
    pub enum BadgeAwardRepositoryError {
        Connection { message: String } => "badge award store connection failed: {message}",
        Query { message: String } => "badge award store query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeAwardRepository: Send + Sync {
    /// Badges earned by `user_id`, oldest first.
    async fn list_for(&self, user_id: &UserId)
    -> Result<Vec<UserBadge>, BadgeAwardRepositoryError>;

    /// Record an award. Returns `false` when the pair already existed, in
    /// which case nothing changes.
    async fn award(&self, badge: &UserBadge) -> Result<bool, BadgeAwardRepositoryError>;
}

/// Fixture repository with no awards.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBadgeAwardRepository;

#[async_trait]
impl BadgeAwardRepository for FixtureBadgeAwardRepository {
    async fn list_for(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<UserBadge>, BadgeAwardRepositoryError> {
        Ok(Vec::new())
    }

    async fn award(&self, _badge: &UserBadge) -> Result<bool, BadgeAwardRepositoryError> {
        Ok(true)
    }
}
