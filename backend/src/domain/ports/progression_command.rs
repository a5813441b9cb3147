//! Driving ports for recording activities and reading progression state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    Badge, DomainError, EventId, LockedBadge, ResolvedLevel, StreakOutcome, UserId, UserProgress,
    WeeklyProgress, XpSource,
};

/// One qualifying activity submitted by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyActivityRequest {
    pub user_id: UserId,
    pub source: XpSource,
    /// Raw amount; validated by the ledger.
    pub amount: i64,
    pub description: String,
    /// When the activity happened. Defaults to the service clock.
    pub occurred_at: Option<DateTime<Utc>>,
    pub event_id: Option<EventId>,
}

/// Consolidated outcome of [`ProgressionCommand::apply_activity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionResult {
    /// Activity XP plus any badge rewards.
    pub xp_gained: u64,
    pub total_xp: u64,
    pub level_before: ResolvedLevel,
    pub level_after: ResolvedLevel,
    pub leveled_up: bool,
    pub streak_before: u32,
    pub streak_after: u32,
    pub streak_outcome: StreakOutcome,
    pub freezes_remaining: u32,
    pub new_badges: Vec<Badge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantStreakFreezesRequest {
    pub user_id: UserId,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantStreakFreezesResponse {
    /// Freezes actually added after applying the bank cap.
    pub granted: u32,
    pub streak_freeze_count: u32,
}

/// Progress record with its resolved level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub progress: UserProgress,
    pub level: ResolvedLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadge {
    pub badge: Badge,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeOverview {
    pub earned: Vec<EarnedBadge>,
    pub locked: Vec<LockedBadge>,
}

/// Mutating progression use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressionCommand: Send + Sync {
    /// Record an activity and everything it unlocks.
    async fn apply_activity(
        &self,
        request: ApplyActivityRequest,
    ) -> Result<ProgressionResult, DomainError>;

    /// Bank streak freezes, bounded by the configured cap.
    async fn grant_streak_freezes(
        &self,
        request: GrantStreakFreezesRequest,
    ) -> Result<GrantStreakFreezesResponse, DomainError>;

    /// Sign the current user out through the identity collaborator.
    async fn sign_out(&self) -> Result<(), DomainError>;
}

/// Read-only progression use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressionQuery: Send + Sync {
    async fn get_progress(&self, user_id: &UserId) -> Result<ProgressView, DomainError>;

    async fn get_badges(&self, user_id: &UserId) -> Result<BadgeOverview, DomainError>;

    /// Weekly goal progress for the week containing `at` (default: now).
    async fn get_weekly_progress(
        &self,
        user_id: &UserId,
        at: Option<DateTime<Utc>>,
    ) -> Result<WeeklyProgress, DomainError>;

    /// Progress of the user signed in with the identity collaborator.
    async fn current_progress(&self) -> Result<ProgressView, DomainError>;
}
