//! XP ledger entries.
//!
//! An [`XpActivity`] is created for every qualifying event and never changes
//! afterwards. A user's total XP is the sum of their entries' amounts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Largest XP grant accepted for a single entry.
pub const XP_AMOUNT_MAX: i64 = 1_000_000;

/// Validation errors raised when building ledger entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XpValidationError {
    NonPositiveAmount { amount: i64 },
    AmountTooLarge { amount: i64, max: i64 },
}

impl fmt::Display for XpValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount { amount } => {
                write!(f, "xp amount must be greater than zero (got {amount})")
            }
            Self::AmountTooLarge { amount, max } => {
                write!(f, "xp amount must be at most {max} (got {amount})")
            }
        }
    }
}

impl std::error::Error for XpValidationError {}

/// Strictly positive XP grant.
///
/// # Examples
/// ```
/// use progression::domain::XpAmount;
///
/// assert_eq!(XpAmount::new(50).expect("positive").get(), 50);
/// assert!(XpAmount::new(0).is_err());
/// assert!(XpAmount::new(-5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct XpAmount(u64);

impl XpAmount {
    /// Validate a raw grant.
    pub fn new(amount: i64) -> Result<Self, XpValidationError> {
        if amount <= 0 {
            return Err(XpValidationError::NonPositiveAmount { amount });
        }
        if amount > XP_AMOUNT_MAX {
            return Err(XpValidationError::AmountTooLarge {
                amount,
                max: XP_AMOUNT_MAX,
            });
        }
        u64::try_from(amount)
            .map(Self)
            .map_err(|_| XpValidationError::NonPositiveAmount { amount })
    }

    /// The granted amount.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for XpAmount {
    type Error = XpValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<XpAmount> for u64 {
    fn from(value: XpAmount) -> Self {
        value.0
    }
}

/// What earned the XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpSource {
    LessonComplete,
    QuizComplete,
    QuizPerfect,
    ExerciseComplete,
    ProjectMilestone,
    DailyLogin,
    StreakBonus,
    CommunityHelp,
    /// Reserved for badge rewards granted by the engine itself.
    BadgeEarned,
}

impl XpSource {
    /// All sources in declaration order.
    pub const ALL: [Self; 9] = [
        Self::LessonComplete,
        Self::QuizComplete,
        Self::QuizPerfect,
        Self::ExerciseComplete,
        Self::ProjectMilestone,
        Self::DailyLogin,
        Self::StreakBonus,
        Self::CommunityHelp,
        Self::BadgeEarned,
    ];

    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LessonComplete => "lesson_complete",
            Self::QuizComplete => "quiz_complete",
            Self::QuizPerfect => "quiz_perfect",
            Self::ExerciseComplete => "exercise_complete",
            Self::ProjectMilestone => "project_milestone",
            Self::DailyLogin => "daily_login",
            Self::StreakBonus => "streak_bonus",
            Self::CommunityHelp => "community_help",
            Self::BadgeEarned => "badge_earned",
        }
    }

    /// Whether external callers may submit activities with this source.
    pub fn is_external(self) -> bool {
        !matches!(self, Self::BadgeEarned)
    }
}

impl fmt::Display for XpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`XpSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseXpSourceError {
    pub value: String,
}

impl fmt::Display for ParseXpSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown xp source: {}", self.value)
    }
}

impl std::error::Error for ParseXpSourceError {}

impl FromStr for XpSource {
    type Err = ParseXpSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| ParseXpSourceError {
                value: s.to_owned(),
            })
    }
}

/// Immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpActivity {
    pub id: Uuid,
    pub user_id: UserId,
    pub amount: XpAmount,
    pub source: XpSource,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Unvalidated input for a ledger entry.
#[derive(Debug, Clone)]
pub struct XpActivityDraft {
    pub user_id: UserId,
    pub amount: i64,
    pub source: XpSource,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<XpActivityDraft> for XpActivity {
    type Error = XpValidationError;

    fn try_from(draft: XpActivityDraft) -> Result<Self, Self::Error> {
        let amount = XpAmount::new(draft.amount)?;
        let description = match draft.description.trim() {
            "" => default_description(draft.source),
            trimmed => trimmed.to_owned(),
        };
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: draft.user_id,
            amount,
            source: draft.source,
            description,
            created_at: draft.created_at,
        })
    }
}

fn default_description(source: XpSource) -> String {
    match source {
        XpSource::LessonComplete => "Completed a lesson",
        XpSource::QuizComplete => "Completed a quiz",
        XpSource::QuizPerfect => "Perfect quiz score",
        XpSource::ExerciseComplete => "Completed an exercise",
        XpSource::ProjectMilestone => "Reached a project milestone",
        XpSource::DailyLogin => "Daily login",
        XpSource::StreakBonus => "Streak bonus",
        XpSource::CommunityHelp => "Helped the community",
        XpSource::BadgeEarned => "Badge reward",
    }
    .to_owned()
}

/// Sum the amounts of `entries`.
pub fn total_xp<'a>(entries: impl IntoIterator<Item = &'a XpActivity>) -> u64 {
    entries
        .into_iter()
        .fold(0_u64, |acc, entry| acc.saturating_add(entry.amount.get()))
}
