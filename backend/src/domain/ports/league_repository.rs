//! Port for closed weekly leagues.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{League, LeagueTier};

use super::define_port_error;

define_port_error! {
    /// Errors raised by league adapters.
    pub enum LeagueRepositoryError {
        /// A record for this tier and week already exists.
        AlreadyClosed { tier: LeagueTier, week_start: DateTime<Utc> } =>
            "{tier} league for week starting {week_start} is already closed",
        Connection { message: String } => "league store connection failed: {message}",
        Query { message: String } => "league store query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeagueRepository: Send + Sync {
    /// Insert all leagues of one week at once.
    ///
    /// Fails with [`LeagueRepositoryError::AlreadyClosed`] if any
    /// `(tier, week_start)` already exists; nothing is written in that case.
    async fn insert_week(&self, leagues: &[League]) -> Result<(), LeagueRepositoryError>;

    /// Stored league for `tier` and `week_start`.
    async fn find(
        &self,
        tier: LeagueTier,
        week_start: DateTime<Utc>,
    ) -> Result<Option<League>, LeagueRepositoryError>;
}

/// Fixture repository that accepts writes and finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLeagueRepository;

#[async_trait]
impl LeagueRepository for FixtureLeagueRepository {
    async fn insert_week(&self, _leagues: &[League]) -> Result<(), LeagueRepositoryError> {
        Ok(())
    }

    async fn find(
        &self,
        _tier: LeagueTier,
        _week_start: DateTime<Utc>,
    ) -> Result<Option<League>, LeagueRepositoryError> {
        Ok(None)
    }
}
