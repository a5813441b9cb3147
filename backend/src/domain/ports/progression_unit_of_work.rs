//! Port that applies a staged progression update atomically.

use async_trait::async_trait;

use crate::domain::{EventId, PayloadHash, UserBadge, UserId, UserProgress, XpActivity};

use super::{ProgressionResult, define_port_error};

define_port_error! {
    /// Errors raised when committing progression updates.
    pub enum ProgressionUnitOfWorkError {
        Connection { message: String } => "progression store connection failed: {message}",
        /// The commit collided with state written concurrently.
        Conflict { message: String } => "progression commit conflicted: {message}",
        Query { message: String } => "progression commit failed: {message}",
    }
}

/// Stored outcome of an activity submitted with an [`EventId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityReplay {
    pub event_id: EventId,
    pub payload_hash: PayloadHash,
    pub result: ProgressionResult,
}

/// Everything one progression step writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionCommit {
    pub user_id: UserId,
    /// New ledger entries: the activity followed by badge rewards.
    pub activities: Vec<XpActivity>,
    pub progress: UserProgress,
    pub badges: Vec<UserBadge>,
    pub replay: Option<ActivityReplay>,
}

impl ProgressionCommit {
    /// Commit that only replaces the progress record.
    pub fn progress_only(progress: UserProgress) -> Self {
        Self {
            user_id: progress.user_id.clone(),
            activities: Vec::new(),
            progress,
            badges: Vec::new(),
            replay: None,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressionUnitOfWork: Send + Sync {
    /// Apply the whole commit or nothing.
    ///
    /// Adapters reject badges the user already holds and event ids already
    /// recorded with [`ProgressionUnitOfWorkError::Conflict`].
    async fn commit(&self, commit: ProgressionCommit) -> Result<(), ProgressionUnitOfWorkError>;

    /// Previously stored outcome for `event_id` submitted by `user_id`.
    async fn find_replay(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<ActivityReplay>, ProgressionUnitOfWorkError>;
}

/// Fixture unit of work that accepts every commit.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProgressionUnitOfWork;

#[async_trait]
impl ProgressionUnitOfWork for FixtureProgressionUnitOfWork {
    async fn commit(&self, _commit: ProgressionCommit) -> Result<(), ProgressionUnitOfWorkError> {
        Ok(())
    }

    async fn find_replay(
        &self,
        _user_id: &UserId,
        _event_id: &EventId,
    ) -> Result<Option<ActivityReplay>, ProgressionUnitOfWorkError> {
        Ok(None)
    }
}
