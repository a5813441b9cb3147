//! Badge definitions, awards and the unlock engine.
//!
//! The catalog is loaded once at start-up and never changes while the
//! process runs. A badge is awarded at most once per user.

mod catalog;
mod engine;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{UserId, XpSource};

pub use self::catalog::{BadgeCatalog, BadgeDefinition, CatalogError};
pub use self::engine::{BadgeEngine, BadgeSnapshot, LockedBadge};

/// Validation errors for [`BadgeId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeIdValidationError {
    Empty,
    SurroundingWhitespace,
}

impl fmt::Display for BadgeIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "badge id must not be empty"),
            Self::SurroundingWhitespace => {
                write!(f, "badge id must not contain surrounding whitespace")
            }
        }
    }
}

impl std::error::Error for BadgeIdValidationError {}

/// Catalog-wide unique badge identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BadgeId(String);

impl BadgeId {
    pub fn new(id: impl Into<String>) -> Result<Self, BadgeIdValidationError> {
        let raw = id.into();
        if raw.trim().is_empty() {
            return Err(BadgeIdValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(BadgeIdValidationError::SurroundingWhitespace);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for BadgeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BadgeId {
    type Error = BadgeIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BadgeId> for String {
    fn from(value: BadgeId) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeRarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl BadgeRarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

    /// XP granted by a badge of this rarity when the catalog does not say.
    pub fn default_reward(self) -> u64 {
        match self {
            Self::Common => 25,
            Self::Rare => 50,
            Self::Epic => 100,
            Self::Legendary => 250,
        }
    }
}

/// Metric a badge threshold is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaKind {
    LessonComplete,
    Streak,
    Xp,
    Project,
    Quiz,
    Community,
}

impl CriteriaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LessonComplete => "lesson_complete",
            Self::Streak => "streak",
            Self::Xp => "xp",
            Self::Project => "project",
            Self::Quiz => "quiz",
            Self::Community => "community",
        }
    }

    /// Whether the criterion counts ledger entries.
    pub fn is_counter(self) -> bool {
        !matches!(self, Self::Streak | Self::Xp)
    }

    /// Whether a ledger entry with `source` feeds this counter.
    pub fn counts(self, source: XpSource) -> bool {
        matches!(
            (self, source),
            (Self::LessonComplete, XpSource::LessonComplete)
                | (Self::Quiz, XpSource::QuizComplete | XpSource::QuizPerfect)
                | (Self::Project, XpSource::ProjectMilestone)
                | (Self::Community, XpSource::CommunityHelp)
        )
    }
}

/// Filter narrowing which ledger entries a counter criterion counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BadgeCondition {
    /// Same local calendar day as the triggering activity.
    SameDay,
    /// Local hour strictly before `hour`.
    LocalHourBefore { hour: u32 },
    /// Local hour at or after `hour`.
    LocalHourFrom { hour: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCriteria {
    #[serde(rename = "type")]
    pub kind: CriteriaKind,
    pub threshold: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_conditions: Vec<BadgeCondition>,
}

impl BadgeCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SameDay => "same_day",
            Self::LocalHourBefore { .. } => "local_hour_before",
            Self::LocalHourFrom { .. } => "local_hour_from",
        }
    }

    /// Hour bound, for the hour-based conditions.
    pub fn hour(self) -> Option<u32> {
        match self {
            Self::SameDay => None,
            Self::LocalHourBefore { hour } | Self::LocalHourFrom { hour } => Some(hour),
        }
    }
}

impl BadgeCriteria {
    pub fn new(kind: CriteriaKind, threshold: u64) -> Self {
        Self {
            kind,
            threshold,
            additional_conditions: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: BadgeCondition) -> Self {
        self.additional_conditions.push(condition);
        self
    }
}

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub rarity: BadgeRarity,
    pub criteria: BadgeCriteria,
    pub xp_reward: u64,
}

/// Award of one badge to one user. Unique per `(user_id, badge_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    pub user_id: UserId,
    pub badge_id: BadgeId,
    pub earned_at: DateTime<Utc>,
}
