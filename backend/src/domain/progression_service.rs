//! Progression service.
//!
//! Implements the progression driving ports. One activity flows through the
//! ledger, the streak tracker, the level resolver and the badge engine, and
//! the resulting state is written with a single unit-of-work commit while the
//! user's lock is held.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::calendar::{local_date, utc_week_start, week_window};
use crate::domain::ports::{
    ActivityReplay, ApplyActivityRequest, BadgeAwardRepository, BadgeAwardRepositoryError,
    BadgeOverview, EarnedBadge, GrantStreakFreezesRequest, GrantStreakFreezesResponse,
    IdentityProvider, IdentityProviderError, ProgressRepository, ProgressRepositoryError,
    ProgressView, ProgressionCommand, ProgressionCommit, ProgressionQuery, ProgressionResult,
    ProgressionUnitOfWork, ProgressionUnitOfWorkError, XpLedgerRepository,
};
use crate::domain::{
    Badge, BadgeCatalog, BadgeEngine, BadgeId, BadgeSnapshot, DEFAULT_WEEKLY_GOAL_XP, DomainError,
    EventId, KnownUser, LevelResolver, PayloadHash, StreakTracker, UserBadge, UserId, UserLocks,
    UserProgress, WeeklyProgress, XpActivity, XpLedger, XpSource, total_xp,
};

/// How far ahead of the server clock a client timestamp may run.
pub const MAX_CLOCK_SKEW_SECS: i64 = 60;

fn map_progress_error(error: ProgressRepositoryError) -> DomainError {
    match error {
        ProgressRepositoryError::Connection { message } => {
            DomainError::storage_unavailable(format!("progress store unavailable: {message}"))
        }
        ProgressRepositoryError::Query { message } => {
            DomainError::internal(format!("progress store error: {message}"))
        }
    }
}

fn map_badge_error(error: BadgeAwardRepositoryError) -> DomainError {
    match error {
        BadgeAwardRepositoryError::Connection { message } => {
            DomainError::storage_unavailable(format!("badge award store unavailable: {message}"))
        }
        BadgeAwardRepositoryError::Query { message } => {
            DomainError::internal(format!("badge award store error: {message}"))
        }
    }
}

fn map_unit_of_work_error(error: ProgressionUnitOfWorkError) -> DomainError {
    match error {
        ProgressionUnitOfWorkError::Connection { message } => {
            DomainError::storage_unavailable(format!("progression store unavailable: {message}"))
        }
        ProgressionUnitOfWorkError::Conflict { message } => {
            DomainError::conflict(format!("progression update conflicted: {message}"))
        }
        ProgressionUnitOfWorkError::Query { message } => {
            DomainError::internal(format!("progression store error: {message}"))
        }
    }
}

fn map_identity_error(error: IdentityProviderError) -> DomainError {
    error!(error = %error, "identity provider call failed");
    match error {
        IdentityProviderError::Connection { message } => {
            DomainError::storage_unavailable(format!("identity provider unavailable: {message}"))
        }
        IdentityProviderError::Rejected { message } => {
            DomainError::internal(format!("identity provider error: {message}"))
        }
    }
}

/// Driven ports used by [`ProgressionService`].
#[derive(Clone)]
pub struct ProgressionPorts {
    pub ledger: Arc<dyn XpLedgerRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub badges: Arc<dyn BadgeAwardRepository>,
    pub unit_of_work: Arc<dyn ProgressionUnitOfWork>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Tunables that are not owned by a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionPolicy {
    pub weekly_goal_xp: u64,
}

impl Default for ProgressionPolicy {
    fn default() -> Self {
        Self {
            weekly_goal_xp: DEFAULT_WEEKLY_GOAL_XP,
        }
    }
}

/// Everything one activity will write, computed before the commit.
struct StagedProgression {
    entries: Vec<XpActivity>,
    progress: UserProgress,
    badges: Vec<UserBadge>,
    result: ProgressionResult,
}

/// Progression service implementing [`ProgressionCommand`] and
/// [`ProgressionQuery`].
#[derive(Clone)]
pub struct ProgressionService {
    ledger: XpLedger,
    progress_repo: Arc<dyn ProgressRepository>,
    badge_repo: Arc<dyn BadgeAwardRepository>,
    unit_of_work: Arc<dyn ProgressionUnitOfWork>,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    resolver: Arc<LevelResolver>,
    streaks: StreakTracker,
    engine: BadgeEngine,
    policy: ProgressionPolicy,
    locks: Arc<UserLocks>,
}

impl ProgressionService {
    /// Create a service with the default curve, tiers, freeze cap and goal.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use progression::domain::{BadgeCatalog, ProgressionService};
    /// # use progression::domain::progression_service::ProgressionPorts;
    /// # use progression::outbound::memory::{InMemoryIdentityProvider, InMemoryProgressionStore};
    /// let store = Arc::new(InMemoryProgressionStore::new());
    /// let service = ProgressionService::new(
    ///     ProgressionPorts {
    ///         ledger: store.clone(),
    ///         progress: store.clone(),
    ///         badges: store.clone(),
    ///         unit_of_work: store,
    ///         identity: Arc::new(InMemoryIdentityProvider::default()),
    ///     },
    ///     Arc::new(DefaultClock),
    ///     Arc::new(BadgeCatalog::default()),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(ports: ProgressionPorts, clock: Arc<dyn Clock>, catalog: Arc<BadgeCatalog>) -> Self {
        Self {
            ledger: XpLedger::new(ports.ledger, Arc::clone(&clock)),
            progress_repo: ports.progress,
            badge_repo: ports.badges,
            unit_of_work: ports.unit_of_work,
            identity: ports.identity,
            clock,
            resolver: Arc::new(LevelResolver::default()),
            streaks: StreakTracker::default(),
            engine: BadgeEngine::new(catalog),
            policy: ProgressionPolicy::default(),
            locks: Arc::new(UserLocks::new()),
        }
    }

    pub fn with_resolver(mut self, resolver: LevelResolver) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    pub fn with_streak_tracker(mut self, streaks: StreakTracker) -> Self {
        self.streaks = streaks;
        self
    }

    pub fn with_policy(mut self, policy: ProgressionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn ledger(&self) -> &XpLedger {
        &self.ledger
    }

    /// Accept client timestamps from the current UTC league week up to a
    /// small clock skew past now. Finished weeks may already be closed into
    /// leagues, and a future day would stall the streak.
    fn check_occurred_at(&self, at: DateTime<Utc>) -> Result<(), DomainError> {
        let now = self.clock.utc();
        if at > now + Duration::seconds(MAX_CLOCK_SKEW_SECS) {
            return Err(DomainError::invalid_request(format!(
                "occurredAt {at} is later than the server clock {now}"
            ))
            .with_details(json!({ "field": "occurredAt", "code": "in_future" })));
        }
        let week_start = utc_week_start(now);
        if at < week_start {
            return Err(DomainError::invalid_request(format!(
                "occurredAt {at} falls before the current league week starting {week_start}"
            ))
            .with_details(json!({ "field": "occurredAt", "code": "week_finished" })));
        }
        Ok(())
    }

    async fn confirm_user(&self, user_id: &UserId) -> Result<KnownUser, DomainError> {
        self.identity
            .find_user(user_id)
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| DomainError::unknown_user(format!("user {user_id} is not known")))
    }

    async fn load_progress(&self, user_id: &UserId) -> Result<UserProgress, DomainError> {
        Ok(self
            .progress_repo
            .find(user_id)
            .await
            .map_err(map_progress_error)?
            .unwrap_or_else(|| UserProgress::new(user_id.clone())))
    }

    async fn earned_badges(&self, user_id: &UserId) -> Result<Vec<UserBadge>, DomainError> {
        self.badge_repo
            .list_for(user_id)
            .await
            .map_err(map_badge_error)
    }

    async fn commit(&self, commit: ProgressionCommit) -> Result<(), DomainError> {
        let user_id = commit.user_id.clone();
        self.unit_of_work.commit(commit).await.map_err(|err| {
            error!(user_id = %user_id, error = %err, "progression commit failed");
            map_unit_of_work_error(err)
        })
    }

    async fn view_for(&self, user_id: &UserId) -> Result<ProgressView, DomainError> {
        let stored = self.load_progress(user_id).await?;
        let total = self.ledger.total_for(user_id).await?;
        let level = self.resolver.resolve(total);
        Ok(ProgressView {
            progress: UserProgress {
                total_xp: total,
                current_level: level.level,
                ..stored
            },
            level,
        })
    }

    /// Compute the whole update for `activity` without touching storage.
    fn stage(
        &self,
        user: &KnownUser,
        progress: UserProgress,
        mut history: Vec<XpActivity>,
        mut earned: HashSet<BadgeId>,
        activity: XpActivity,
    ) -> Result<StagedProgression, DomainError> {
        let total_before = total_xp(&history);
        let level_before = self.resolver.resolve(total_before);
        let streak_before = progress.streak();
        let activity_day = local_date(activity.created_at, user.utc_offset);
        let (streak_after, streak_outcome) =
            self.streaks.record_activity(streak_before, activity_day);
        if streak_before
            .last_activity_date
            .is_some_and(|last| activity_day < last)
        {
            warn!(
                user_id = %user.id,
                activity_day = %activity_day,
                "activity predates last recorded day; streak left unchanged"
            );
        }

        let earned_at = self.clock.utc();
        let occurred_at = activity.created_at;
        let mut total = total_before.saturating_add(activity.amount.get());
        history.push(activity.clone());
        let mut entries = vec![activity];
        let mut badges = Vec::new();
        let mut new_badges: Vec<Badge> = Vec::new();

        // First pass sees the activity; the second only the rewards it paid.
        for pass in 0..2 {
            let snapshot = BadgeSnapshot {
                total_xp: total,
                current_streak: streak_after.current_streak,
                activities: &history,
                utc_offset: user.utc_offset,
                reference_date: activity_day,
            };
            let unlocked = self.engine.evaluate(&snapshot, &earned);
            let mut reward_paid = false;
            for badge in unlocked {
                earned.insert(badge.id.clone());
                badges.push(UserBadge {
                    user_id: user.id.clone(),
                    badge_id: badge.id.clone(),
                    earned_at,
                });
                if badge.xp_reward > 0 {
                    let reward = self.reward_entry(&user.id, &badge, occurred_at)?;
                    total = total.saturating_add(reward.amount.get());
                    history.push(reward.clone());
                    entries.push(reward);
                    reward_paid = true;
                }
                new_badges.push(badge);
            }
            if pass == 0 && !reward_paid {
                break;
            }
        }

        let level_after = self.resolver.resolve(total);
        let updated = UserProgress {
            total_xp: total,
            current_level: level_after.level,
            ..progress
        }
        .with_streak(streak_after);

        let result = ProgressionResult {
            xp_gained: total - total_before,
            total_xp: total,
            leveled_up: level_after.level > level_before.level,
            level_before,
            level_after,
            streak_before: streak_before.current_streak,
            streak_after: streak_after.current_streak,
            streak_outcome,
            freezes_remaining: streak_after.streak_freeze_count,
            new_badges,
        };
        Ok(StagedProgression {
            entries,
            progress: updated,
            badges,
            result,
        })
    }

    fn reward_entry(
        &self,
        user_id: &UserId,
        badge: &Badge,
        at: DateTime<Utc>,
    ) -> Result<XpActivity, DomainError> {
        let amount = i64::try_from(badge.xp_reward).unwrap_or(i64::MAX);
        self.ledger
            .draft(
                user_id,
                amount,
                XpSource::BadgeEarned,
                &format!("Badge earned: {}", badge.name),
                Some(at),
            )
            .map_err(|err| {
                DomainError::internal(format!("badge {} reward rejected: {err}", badge.id))
            })
    }

    fn log_outcome(&self, user_id: &UserId, result: &ProgressionResult) {
        info!(
            user_id = %user_id,
            xp = result.xp_gained,
            total_xp = result.total_xp,
            streak = result.streak_after,
            "activity applied"
        );
        if result.leveled_up {
            info!(
                user_id = %user_id,
                from = result.level_before.level,
                to = result.level_after.level,
                title = %result.level_after.tier_title,
                "level up"
            );
        }
        if result.streak_outcome.is_reset() {
            info!(user_id = %user_id, lost = result.streak_before, "streak reset");
        }
        for badge in &result.new_badges {
            info!(user_id = %user_id, badge_id = %badge.id, reward = badge.xp_reward, "badge unlocked");
        }
    }
}

/// Fingerprint of the caller-controlled fields of an activity.
fn fingerprint(request: &ApplyActivityRequest) -> PayloadHash {
    PayloadHash::of_json(&json!({
        "source": request.source,
        "amount": request.amount,
        "description": request.description,
        "occurredAt": request.occurred_at,
    }))
}

fn replay_or_conflict(
    replay: ActivityReplay,
    event_id: EventId,
    hash: PayloadHash,
    user_id: &UserId,
) -> Result<ProgressionResult, DomainError> {
    if replay.payload_hash == hash {
        warn!(user_id = %user_id, event_id = %event_id, "replaying recorded activity");
        return Ok(replay.result);
    }
    Err(DomainError::conflict(format!(
        "event id {event_id} was already used with a different payload"
    ))
    .with_details(json!({ "eventId": event_id.to_string() })))
}

#[async_trait]
impl ProgressionCommand for ProgressionService {
    async fn apply_activity(
        &self,
        request: ApplyActivityRequest,
    ) -> Result<ProgressionResult, DomainError> {
        if !request.source.is_external() {
            return Err(DomainError::invalid_request(format!(
                "{} entries are granted by the badge engine only",
                request.source
            ))
            .with_details(json!({ "field": "source", "code": "reserved_source" })));
        }
        if let Some(at) = request.occurred_at {
            self.check_occurred_at(at)?;
        }
        let activity = self.ledger.draft(
            &request.user_id,
            request.amount,
            request.source,
            &request.description,
            request.occurred_at,
        )?;
        let user = self.confirm_user(&request.user_id).await?;
        let replay_key = request
            .event_id
            .map(|event_id| (event_id, fingerprint(&request)));

        let _guard = self.locks.lock(&user.id).await;
        if let Some((event_id, hash)) = replay_key {
            let stored = self
                .unit_of_work
                .find_replay(&user.id, &event_id)
                .await
                .map_err(map_unit_of_work_error)?;
            if let Some(replay) = stored {
                return replay_or_conflict(replay, event_id, hash, &user.id);
            }
        }

        let history = self.ledger.history(&user.id).await?;
        let progress = self.load_progress(&user.id).await?;
        let earned = self
            .earned_badges(&user.id)
            .await?
            .into_iter()
            .map(|award| award.badge_id)
            .collect();
        let staged = self.stage(&user, progress, history, earned, activity)?;

        let replay = replay_key.map(|(event_id, payload_hash)| ActivityReplay {
            event_id,
            payload_hash,
            result: staged.result.clone(),
        });
        self.commit(ProgressionCommit {
            user_id: user.id.clone(),
            activities: staged.entries,
            progress: staged.progress,
            badges: staged.badges,
            replay,
        })
        .await?;

        self.log_outcome(&user.id, &staged.result);
        Ok(staged.result)
    }

    async fn grant_streak_freezes(
        &self,
        request: GrantStreakFreezesRequest,
    ) -> Result<GrantStreakFreezesResponse, DomainError> {
        if request.count == 0 {
            return Err(DomainError::invalid_request("count must be at least 1")
                .with_details(json!({ "field": "count", "code": "out_of_range" })));
        }
        let user = self.confirm_user(&request.user_id).await?;
        let _guard = self.locks.lock(&user.id).await;

        let progress = self.load_progress(&user.id).await?;
        let (streak, granted) = self.streaks.grant_freezes(progress.streak(), request.count);
        let updated = progress.with_streak(streak);
        self.commit(ProgressionCommit::progress_only(updated)).await?;

        info!(
            user_id = %user.id,
            granted,
            banked = streak.streak_freeze_count,
            "streak freezes granted"
        );
        Ok(GrantStreakFreezesResponse {
            granted,
            streak_freeze_count: streak.streak_freeze_count,
        })
    }

    async fn sign_out(&self) -> Result<(), DomainError> {
        self.identity.sign_out().await.map_err(map_identity_error)
    }
}

#[async_trait]
impl ProgressionQuery for ProgressionService {
    async fn get_progress(&self, user_id: &UserId) -> Result<ProgressView, DomainError> {
        let user = self.confirm_user(user_id).await?;
        self.view_for(&user.id).await
    }

    async fn get_badges(&self, user_id: &UserId) -> Result<BadgeOverview, DomainError> {
        let user = self.confirm_user(user_id).await?;
        let awards = self.earned_badges(&user.id).await?;
        let history = self.ledger.history(&user.id).await?;
        let progress = self.load_progress(&user.id).await?;

        let earned_ids: HashSet<BadgeId> =
            awards.iter().map(|award| award.badge_id.clone()).collect();
        let snapshot = BadgeSnapshot {
            total_xp: total_xp(&history),
            current_streak: progress.current_streak,
            activities: &history,
            utc_offset: user.utc_offset,
            reference_date: local_date(self.clock.utc(), user.utc_offset),
        };
        let locked = self.engine.locked_progress(&snapshot, &earned_ids);
        let earned = awards
            .into_iter()
            .filter_map(|award| match self.engine.catalog().get(&award.badge_id) {
                Some(badge) => Some(EarnedBadge {
                    badge: badge.clone(),
                    earned_at: award.earned_at,
                }),
                None => {
                    warn!(user_id = %user.id, badge_id = %award.badge_id, "award for badge missing from catalog");
                    None
                }
            })
            .collect();
        Ok(BadgeOverview { earned, locked })
    }

    async fn get_weekly_progress(
        &self,
        user_id: &UserId,
        at: Option<DateTime<Utc>>,
    ) -> Result<WeeklyProgress, DomainError> {
        let user = self.confirm_user(user_id).await?;
        let window = week_window(at.unwrap_or_else(|| self.clock.utc()), user.utc_offset);
        let (start, end) = window;
        let entries = self.ledger.entries_since(&user.id, start).await?;
        let earned = total_xp(entries.iter().filter(|entry| entry.created_at < end));
        Ok(WeeklyProgress::new(
            window,
            earned,
            self.policy.weekly_goal_xp,
        ))
    }

    async fn current_progress(&self) -> Result<ProgressView, DomainError> {
        let user_id = self
            .identity
            .current_user()
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| DomainError::unauthorized("no user is signed in"))?;
        self.get_progress(&user_id).await
    }
}

#[cfg(test)]
#[path = "progression_service_tests.rs"]
mod tests;
