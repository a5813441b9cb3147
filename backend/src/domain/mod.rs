//! Domain primitives, progression components and services.
//!
//! Purpose: hold the gamification rules (XP ledger, levels, streaks, badges
//! and leagues) independent of any transport or storage technology. Adapters
//! reach the domain only through [`ports`].
//!
//! Public surface:
//! - DomainError / ErrorCode: transport-agnostic failure payload.
//! - XpLedger, LevelResolver, StreakTracker, BadgeEngine: the progression
//!   components.
//! - ProgressionService, LeaderboardService: driving port implementations.
//! - WeeklyLeagueCloseJob: background closer for finished league weeks.

pub mod badges;
pub mod calendar;
pub mod error;
pub mod event_id;
pub mod leaderboard_service;
pub mod league;
pub mod league_close_job;
pub mod level;
pub mod ports;
pub mod progress;
pub mod progression_service;
pub mod streak;
pub mod trace_id;
pub mod user;
pub mod user_locks;
pub mod xp;
pub mod xp_ledger;

pub use self::badges::{
    Badge, BadgeCatalog, BadgeCondition, BadgeCriteria, BadgeDefinition, BadgeEngine, BadgeId,
    BadgeIdValidationError, BadgeRarity, BadgeSnapshot, CatalogError, CriteriaKind, LockedBadge,
    UserBadge,
};
pub use self::error::{DomainError, ErrorCode};
pub use self::event_id::{EventId, EventIdValidationError, PayloadHash};
pub use self::leaderboard_service::LeaderboardService;
pub use self::league::{
    BandingError, League, LeagueBanding, LeagueTier, LeagueUser, ParseLeagueTierError,
    WeeklyStanding, build_week, rank_entries, week_end,
};
pub use self::league_close_job::{CloseOutcome, WeeklyLeagueCloseJob, last_finished_week};
pub use self::level::{
    DEFAULT_LEVEL_STEP, LevelConfigError, LevelCurve, LevelResolver, LevelTier, ResolvedLevel,
    TierTable,
};
pub use self::progress::{DEFAULT_WEEKLY_GOAL_XP, UserProgress, WeeklyProgress};
pub use self::progression_service::{ProgressionPolicy, ProgressionPorts, ProgressionService};
pub use self::streak::{DEFAULT_FREEZE_CAP, StreakOutcome, StreakState, StreakTracker};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{KnownUser, USER_ID_MAX_LEN, UserId, UserValidationError};
pub use self::user_locks::UserLocks;
pub use self::xp::{
    ParseXpSourceError, XP_AMOUNT_MAX, XpActivity, XpActivityDraft, XpAmount, XpSource,
    XpValidationError, total_xp,
};
pub use self::xp_ledger::XpLedger;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use progression::domain::{ApiResult, DomainError};
///
/// fn handler() -> ApiResult<()> {
///     Err(DomainError::not_found("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, DomainError>;
