//! Daily streak bookkeeping.
//!
//! Dates are calendar days in the user's own timezone. Converting a timestamp
//! into that day happens before the tracker is called.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default number of freezes a user may bank.
pub const DEFAULT_FREEZE_CAP: u32 = 2;

/// Streak fields of a user's progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub streak_freeze_count: u32,
}

/// What a recorded activity did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreakOutcome {
    /// First activity ever.
    Started,
    /// Same day as the last activity, or an earlier day.
    Unchanged,
    /// Activity on the day after the last one.
    Extended,
    /// Skipped days were covered by freezes.
    #[serde(rename_all = "camelCase")]
    Preserved { freezes_used: u32 },
    /// The gap could not be covered; the streak restarted at 1.
    Reset,
}

impl StreakOutcome {
    /// Whether an existing streak was lost.
    pub fn is_reset(self) -> bool {
        matches!(self, Self::Reset)
    }
}

/// Applies the streak rules and the freeze bank cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakTracker {
    freeze_cap: u32,
}

impl Default for StreakTracker {
    fn default() -> Self {
        Self::new(DEFAULT_FREEZE_CAP)
    }
}

impl StreakTracker {
    pub fn new(freeze_cap: u32) -> Self {
        Self { freeze_cap }
    }

    pub fn freeze_cap(&self) -> u32 {
        self.freeze_cap
    }

    /// Record an activity on `activity_date`.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use progression::domain::{StreakOutcome, StreakState, StreakTracker};
    ///
    /// let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).expect("valid date");
    /// let tracker = StreakTracker::default();
    /// let (state, outcome) = tracker.record_activity(StreakState::default(), day(1));
    /// assert_eq!(outcome, StreakOutcome::Started);
    /// let (state, outcome) = tracker.record_activity(state, day(2));
    /// assert_eq!(outcome, StreakOutcome::Extended);
    /// assert_eq!(state.current_streak, 2);
    /// ```
    pub fn record_activity(
        &self,
        state: StreakState,
        activity_date: NaiveDate,
    ) -> (StreakState, StreakOutcome) {
        let Some(last) = state.last_activity_date else {
            let next = StreakState {
                current_streak: 1,
                longest_streak: state.longest_streak.max(1),
                last_activity_date: Some(activity_date),
                ..state
            };
            return (next, StreakOutcome::Started);
        };

        let gap = activity_date.signed_duration_since(last).num_days();
        if gap <= 0 {
            return (state, StreakOutcome::Unchanged);
        }

        let skipped = u32::try_from(gap - 1).unwrap_or(u32::MAX);
        let (current, freezes, outcome) = if skipped == 0 {
            (
                state.current_streak.saturating_add(1),
                state.streak_freeze_count,
                StreakOutcome::Extended,
            )
        } else if state.streak_freeze_count >= skipped {
            (
                state.current_streak.saturating_add(1),
                state.streak_freeze_count - skipped,
                StreakOutcome::Preserved {
                    freezes_used: skipped,
                },
            )
        } else {
            (1, 0, StreakOutcome::Reset)
        };

        let next = StreakState {
            current_streak: current,
            longest_streak: state.longest_streak.max(current),
            last_activity_date: Some(activity_date),
            streak_freeze_count: freezes,
        };
        (next, outcome)
    }

    /// Bank up to `count` freezes without exceeding the cap. Returns the new
    /// state and how many freezes were actually added.
    pub fn grant_freezes(&self, state: StreakState, count: u32) -> (StreakState, u32) {
        let banked = state
            .streak_freeze_count
            .saturating_add(count)
            .min(self.freeze_cap)
            .max(state.streak_freeze_count);
        let next = StreakState {
            streak_freeze_count: banked,
            ..state
        };
        (next, banked - state.streak_freeze_count)
    }
}
