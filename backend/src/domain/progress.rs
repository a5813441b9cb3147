//! Per-user progression snapshot and weekly goal view.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{StreakState, UserId};

/// Default weekly XP goal.
pub const DEFAULT_WEEKLY_GOAL_XP: u64 = 500;

/// Materialised progression state of one user.
///
/// `total_xp` always equals the ledger sum and `current_level` is derived
/// from it. Only the progression service writes this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: UserId,
    pub total_xp: u64,
    pub current_level: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub streak_freeze_count: u32,
}

impl UserProgress {
    /// Zeroed progress for a user without history.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            total_xp: 0,
            current_level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_activity_date: None,
            streak_freeze_count: 0,
        }
    }

    /// Streak fields as a [`StreakState`].
    pub fn streak(&self) -> StreakState {
        StreakState {
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            last_activity_date: self.last_activity_date,
            streak_freeze_count: self.streak_freeze_count,
        }
    }

    /// Replace the streak fields.
    pub fn with_streak(self, streak: StreakState) -> Self {
        Self {
            current_streak: streak.current_streak,
            longest_streak: streak.longest_streak,
            last_activity_date: streak.last_activity_date,
            streak_freeze_count: streak.streak_freeze_count,
            ..self
        }
    }
}

/// XP earned in the current week against the weekly goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgress {
    pub week_start: DateTime<Utc>,
    pub week_end: DateTime<Utc>,
    pub earned_xp: u64,
    pub goal_xp: u64,
    pub remaining_xp: u64,
}

impl WeeklyProgress {
    pub fn new(
        window: (DateTime<Utc>, DateTime<Utc>),
        earned_xp: u64,
        goal_xp: u64,
    ) -> Self {
        let (week_start, week_end) = window;
        Self {
            week_start,
            week_end,
            earned_xp,
            goal_xp,
            remaining_xp: goal_xp.saturating_sub(earned_xp),
        }
    }
}
