//! Port for the append-only XP ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{UserId, XpActivity};

use super::define_port_error;

define_port_error! {
    /// Errors raised by XP ledger adapters.
    pub enum XpLedgerRepositoryError {
        /// The ledger store could not be reached.
        Connection { message: String } => "xp ledger connection failed: {message}",
        /// A read or write failed while executing.
        Query { message: String } => "xp ledger query failed: {message}",
    }
}

/// Append-only storage of [`XpActivity`] entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait XpLedgerRepository: Send + Sync {
    /// Persist one entry. Entries are never updated or removed.
    async fn append(&self, activity: &XpActivity) -> Result<(), XpLedgerRepositoryError>;

    /// Sum of all amounts for `user_id`; 0 without entries.
    async fn total_for(&self, user_id: &UserId) -> Result<u64, XpLedgerRepositoryError>;

    /// Entries for `user_id` created at or after `since`, oldest first.
    async fn entries_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<XpActivity>, XpLedgerRepositoryError>;

    /// Entries of every user created in `[start, end)`, oldest first.
    async fn entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<XpActivity>, XpLedgerRepositoryError>;
}

/// Fixture ledger that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureXpLedgerRepository;

#[async_trait]
impl XpLedgerRepository for FixtureXpLedgerRepository {
    async fn append(&self, _activity: &XpActivity) -> Result<(), XpLedgerRepositoryError> {
        Ok(())
    }

    async fn total_for(&self, _user_id: &UserId) -> Result<u64, XpLedgerRepositoryError> {
        Ok(0)
    }

    async fn entries_since(
        &self,
        _user_id: &UserId,
        _since: DateTime<Utc>,
    ) -> Result<Vec<XpActivity>, XpLedgerRepositoryError> {
        Ok(Vec::new())
    }

    async fn entries_between(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<XpActivity>, XpLedgerRepositoryError> {
        Ok(Vec::new())
    }
}
