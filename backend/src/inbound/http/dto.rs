//! Response bodies shared by the progression and league handlers.
//!
//! Timestamps are RFC 3339 strings and dates are `YYYY-MM-DD`.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{
    BadgeOverview, EarnedBadge, GrantStreakFreezesResponse, ProgressView, ProgressionResult,
};
use crate::domain::{
    Badge, BadgeCondition, BadgeCriteria, League, LeagueUser, LockedBadge, ResolvedLevel,
    StreakOutcome, UserProgress, WeeklyProgress,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LevelBody {
    pub level: u32,
    #[schema(example = "Curious Explorer")]
    pub tier_title: String,
    pub level_floor_xp: u64,
    pub next_level_floor_xp: u64,
}

impl From<ResolvedLevel> for LevelBody {
    fn from(value: ResolvedLevel) -> Self {
        Self {
            level: value.level,
            tier_title: value.tier_title,
            level_floor_xp: value.level_floor_xp,
            next_level_floor_xp: value.next_level_floor_xp,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeConditionBody {
    #[serde(rename = "type")]
    #[schema(example = "local_hour_before")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCriteriaBody {
    #[serde(rename = "type")]
    #[schema(example = "streak")]
    pub kind: String,
    pub threshold: u64,
    pub additional_conditions: Vec<BadgeConditionBody>,
}

impl From<BadgeCriteria> for BadgeCriteriaBody {
    fn from(value: BadgeCriteria) -> Self {
        Self {
            kind: value.kind.as_str().to_owned(),
            threshold: value.threshold,
            additional_conditions: value
                .additional_conditions
                .into_iter()
                .map(|condition: BadgeCondition| BadgeConditionBody {
                    kind: condition.as_str().to_owned(),
                    hour: condition.hour(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeBody {
    #[schema(example = "week-warrior")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon_url: Option<String>,
    #[schema(example = "rare")]
    pub rarity: String,
    pub criteria: BadgeCriteriaBody,
    pub xp_reward: u64,
}

impl From<Badge> for BadgeBody {
    fn from(value: Badge) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            description: value.description,
            icon_url: value.icon_url,
            rarity: value.rarity.as_str().to_owned(),
            criteria: value.criteria.into(),
            xp_reward: value.xp_reward,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreakOutcomeBody {
    /// `started`, `unchanged`, `extended`, `preserved` or `reset`.
    pub kind: String,
    pub freezes_used: u32,
}

impl From<StreakOutcome> for StreakOutcomeBody {
    fn from(value: StreakOutcome) -> Self {
        let (kind, freezes_used) = match value {
            StreakOutcome::Started => ("started", 0),
            StreakOutcome::Unchanged => ("unchanged", 0),
            StreakOutcome::Extended => ("extended", 0),
            StreakOutcome::Preserved { freezes_used } => ("preserved", freezes_used),
            StreakOutcome::Reset => ("reset", 0),
        };
        Self {
            kind: kind.to_owned(),
            freezes_used,
        }
    }
}

/// Outcome of one recorded activity.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionResultBody {
    /// Activity XP plus badge rewards.
    pub xp_gained: u64,
    pub total_xp: u64,
    pub level_before: LevelBody,
    pub level_after: LevelBody,
    pub leveled_up: bool,
    pub streak_before: u32,
    pub streak_after: u32,
    pub streak_outcome: StreakOutcomeBody,
    pub freezes_remaining: u32,
    pub new_badges: Vec<BadgeBody>,
}

impl From<ProgressionResult> for ProgressionResultBody {
    fn from(value: ProgressionResult) -> Self {
        Self {
            xp_gained: value.xp_gained,
            total_xp: value.total_xp,
            level_before: value.level_before.into(),
            level_after: value.level_after.into(),
            leveled_up: value.leveled_up,
            streak_before: value.streak_before,
            streak_after: value.streak_after,
            streak_outcome: value.streak_outcome.into(),
            freezes_remaining: value.freezes_remaining,
            new_badges: value.new_badges.into_iter().map(BadgeBody::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProgressBody {
    pub user_id: String,
    pub total_xp: u64,
    pub current_level: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    #[schema(format = "date")]
    pub last_activity_date: Option<String>,
    pub streak_freeze_count: u32,
}

impl From<UserProgress> for UserProgressBody {
    fn from(value: UserProgress) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            total_xp: value.total_xp,
            current_level: value.current_level,
            current_streak: value.current_streak,
            longest_streak: value.longest_streak,
            last_activity_date: value.last_activity_date.map(|date| date.to_string()),
            streak_freeze_count: value.streak_freeze_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBody {
    pub progress: UserProgressBody,
    pub level: LevelBody,
}

impl From<ProgressView> for ProgressBody {
    fn from(value: ProgressView) -> Self {
        Self {
            progress: value.progress.into(),
            level: value.level.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadgeBody {
    pub badge: BadgeBody,
    #[schema(format = "date-time")]
    pub earned_at: String,
}

impl From<EarnedBadge> for EarnedBadgeBody {
    fn from(value: EarnedBadge) -> Self {
        Self {
            badge: value.badge.into(),
            earned_at: value.earned_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockedBadgeBody {
    pub badge: BadgeBody,
    pub progress: u64,
    pub target: u64,
}

impl From<LockedBadge> for LockedBadgeBody {
    fn from(value: LockedBadge) -> Self {
        Self {
            badge: value.badge.into(),
            progress: value.progress,
            target: value.target,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeOverviewBody {
    pub earned: Vec<EarnedBadgeBody>,
    pub locked: Vec<LockedBadgeBody>,
}

impl From<BadgeOverview> for BadgeOverviewBody {
    fn from(value: BadgeOverview) -> Self {
        Self {
            earned: value.earned.into_iter().map(Into::into).collect(),
            locked: value.locked.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgressBody {
    #[schema(format = "date-time")]
    pub week_start: String,
    #[schema(format = "date-time")]
    pub week_end: String,
    pub earned_xp: u64,
    pub goal_xp: u64,
    pub remaining_xp: u64,
}

impl From<WeeklyProgress> for WeeklyProgressBody {
    fn from(value: WeeklyProgress) -> Self {
        Self {
            week_start: value.week_start.to_rfc3339(),
            week_end: value.week_end.to_rfc3339(),
            earned_xp: value.earned_xp,
            goal_xp: value.goal_xp,
            remaining_xp: value.remaining_xp,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreakFreezeGrantBody {
    pub granted: u32,
    pub streak_freeze_count: u32,
}

impl From<GrantStreakFreezesResponse> for StreakFreezeGrantBody {
    fn from(value: GrantStreakFreezesResponse) -> Self {
        Self {
            granted: value.granted,
            streak_freeze_count: value.streak_freeze_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeagueUserBody {
    pub user_id: String,
    /// 1-based rank within the tier.
    pub rank: u32,
    pub weekly_xp: u64,
}

impl From<LeagueUser> for LeagueUserBody {
    fn from(value: LeagueUser) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            rank: value.rank,
            weekly_xp: value.weekly_xp,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeagueBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(example = "gold")]
    pub tier: String,
    #[schema(format = "date-time")]
    pub week_start: String,
    #[schema(format = "date-time")]
    pub week_end: String,
    pub users: Vec<LeagueUserBody>,
}

impl From<League> for LeagueBody {
    fn from(value: League) -> Self {
        Self {
            id: value.id.to_string(),
            tier: value.tier.as_str().to_owned(),
            week_start: value.week_start.to_rfc3339(),
            week_end: value.week_end.to_rfc3339(),
            users: value.users.into_iter().map(Into::into).collect(),
        }
    }
}
