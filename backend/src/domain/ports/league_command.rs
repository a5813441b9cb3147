//! Driving ports for weekly leagues.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DomainError, League, LeagueTier};

/// Closes finished weeks into league snapshots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeagueCommand: Send + Sync {
    /// Rank the week starting at `week_start` and persist one league per tier.
    async fn close_week(&self, week_start: DateTime<Utc>) -> Result<Vec<League>, DomainError>;
}

/// Reads stored league snapshots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeagueQuery: Send + Sync {
    async fn get_league(
        &self,
        tier: LeagueTier,
        week_start: DateTime<Utc>,
    ) -> Result<League, DomainError>;
}
