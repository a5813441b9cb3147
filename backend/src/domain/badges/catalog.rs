//! Validated, immutable badge catalog.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;

use super::{Badge, BadgeCondition, BadgeCriteria, BadgeId, BadgeRarity, CriteriaKind};
use crate::domain::XP_AMOUNT_MAX;

/// Errors raised while building a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    DuplicateId { id: BadgeId },
    ZeroThreshold { id: BadgeId },
    BlankName { id: BadgeId },
    ConditionOnNonCounter { id: BadgeId, kind: CriteriaKind },
    InvalidHour { id: BadgeId, hour: u32 },
    RewardTooLarge { id: BadgeId, max: u64 },
    Parse { message: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => write!(f, "badge id {id} appears more than once"),
            Self::ZeroThreshold { id } => write!(f, "badge {id} needs a positive threshold"),
            Self::BlankName { id } => write!(f, "badge {id} needs a name"),
            Self::ConditionOnNonCounter { id, kind } => write!(
                f,
                "badge {id} has additional conditions on non-counter criteria {kind:?}"
            ),
            Self::InvalidHour { id, hour } => {
                write!(f, "badge {id} uses hour {hour}, expected 0-23")
            }
            Self::RewardTooLarge { id, max } => {
                write!(f, "badge {id} rewards more than {max} XP")
            }
            Self::Parse { message } => write!(f, "badge catalog is not valid JSON: {message}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Badge as written in a catalog file. `xpReward` falls back to the rarity
/// default when omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BadgeDefinition {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    pub rarity: BadgeRarity,
    pub criteria: BadgeCriteria,
    #[serde(default)]
    pub xp_reward: Option<u64>,
}

impl From<BadgeDefinition> for Badge {
    fn from(value: BadgeDefinition) -> Self {
        Self {
            xp_reward: value
                .xp_reward
                .unwrap_or_else(|| value.rarity.default_reward()),
            id: value.id,
            name: value.name,
            description: value.description,
            icon_url: value.icon_url,
            rarity: value.rarity,
            criteria: value.criteria,
        }
    }
}

/// Ordered set of badges with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeCatalog {
    badges: Vec<Badge>,
}

impl BadgeCatalog {
    /// Validate `badges` and keep their order.
    pub fn new(badges: Vec<Badge>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(badges.len());
        for badge in &badges {
            validate_badge(badge)?;
            if !seen.insert(&badge.id) {
                return Err(CatalogError::DuplicateId {
                    id: badge.id.clone(),
                });
            }
        }
        Ok(Self { badges })
    }

    /// Parse a JSON array of badge definitions.
    ///
    /// # Examples
    /// ```
    /// use progression::domain::BadgeCatalog;
    ///
    /// let catalog = BadgeCatalog::from_json(r#"[{
    ///     "id": "streak-3",
    ///     "name": "Warming Up",
    ///     "description": "Keep a 3-day streak",
    ///     "rarity": "common",
    ///     "criteria": { "type": "streak", "threshold": 3 }
    /// }]"#).expect("valid catalog");
    /// assert_eq!(catalog.badges()[0].xp_reward, 25);
    /// ```
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<BadgeDefinition> =
            serde_json::from_str(raw).map_err(|err| CatalogError::Parse {
                message: err.to_string(),
            })?;
        Self::new(definitions.into_iter().map(Badge::from).collect())
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn get(&self, id: &BadgeId) -> Option<&Badge> {
        self.badges.iter().find(|badge| &badge.id == id)
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}

fn validate_badge(badge: &Badge) -> Result<(), CatalogError> {
    let id = || badge.id.clone();
    if badge.name.trim().is_empty() {
        return Err(CatalogError::BlankName { id: id() });
    }
    let criteria = &badge.criteria;
    if criteria.threshold == 0 {
        return Err(CatalogError::ZeroThreshold { id: id() });
    }
    if badge.xp_reward > XP_AMOUNT_MAX.unsigned_abs() {
        return Err(CatalogError::RewardTooLarge {
            id: id(),
            max: XP_AMOUNT_MAX.unsigned_abs(),
        });
    }
    if !criteria.additional_conditions.is_empty() && !criteria.kind.is_counter() {
        return Err(CatalogError::ConditionOnNonCounter {
            id: id(),
            kind: criteria.kind,
        });
    }
    for condition in &criteria.additional_conditions {
        match *condition {
            BadgeCondition::LocalHourBefore { hour } | BadgeCondition::LocalHourFrom { hour }
                if hour > 23 =>
            {
                return Err(CatalogError::InvalidHour { id: id(), hour });
            }
            _ => {}
        }
    }
    Ok(())
}

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    rarity: BadgeRarity,
    criteria: BadgeCriteria,
}

impl Default for BadgeCatalog {
    /// Built-in catalog used when no catalog file is configured.
    fn default() -> Self {
        use BadgeCondition::{LocalHourBefore, LocalHourFrom, SameDay};
        use CriteriaKind::{Community, LessonComplete, Project, Streak, Xp};

        let seeds = [
            Seed {
                id: "first-steps",
                name: "First Steps",
                description: "Complete your first lesson",
                rarity: BadgeRarity::Common,
                criteria: BadgeCriteria::new(LessonComplete, 1),
            },
            Seed {
                id: "week-warrior",
                name: "Week Warrior",
                description: "Maintain a 7-day streak",
                rarity: BadgeRarity::Rare,
                criteria: BadgeCriteria::new(Streak, 7),
            },
            Seed {
                id: "quick-learner",
                name: "Quick Learner",
                description: "Complete 5 lessons in one day",
                rarity: BadgeRarity::Common,
                criteria: BadgeCriteria::new(LessonComplete, 5).with_condition(SameDay),
            },
            Seed {
                id: "early-bird",
                name: "Early Bird",
                description: "Study before 7 AM",
                rarity: BadgeRarity::Rare,
                criteria: BadgeCriteria::new(LessonComplete, 1)
                    .with_condition(LocalHourBefore { hour: 7 }),
            },
            Seed {
                id: "night-owl",
                name: "Night Owl",
                description: "Study after 11 PM",
                rarity: BadgeRarity::Common,
                criteria: BadgeCriteria::new(LessonComplete, 1)
                    .with_condition(LocalHourFrom { hour: 23 }),
            },
            Seed {
                id: "code-master",
                name: "Code Master",
                description: "Complete 25 lessons",
                rarity: BadgeRarity::Epic,
                criteria: BadgeCriteria::new(LessonComplete, 25),
            },
            Seed {
                id: "project-pro",
                name: "Project Pro",
                description: "Complete your first project",
                rarity: BadgeRarity::Rare,
                criteria: BadgeCriteria::new(Project, 1),
            },
            Seed {
                id: "full-stack-hero",
                name: "Full Stack Hero",
                description: "Complete all projects",
                rarity: BadgeRarity::Legendary,
                criteria: BadgeCriteria::new(Project, 3),
            },
            Seed {
                id: "month-master",
                name: "Month Master",
                description: "Maintain a 30-day streak",
                rarity: BadgeRarity::Epic,
                criteria: BadgeCriteria::new(Streak, 30),
            },
            Seed {
                id: "community-champion",
                name: "Community Champion",
                description: "Help 10 other students",
                rarity: BadgeRarity::Rare,
                criteria: BadgeCriteria::new(Community, 10),
            },
            Seed {
                id: "rising-star",
                name: "Rising Star",
                description: "Earn 1,000 XP",
                rarity: BadgeRarity::Rare,
                criteria: BadgeCriteria::new(Xp, 1000),
            },
        ];

        let badges = seeds
            .into_iter()
            .filter_map(|seed| {
                BadgeId::new(seed.id).ok().map(|id| Badge {
                    id,
                    name: seed.name.to_owned(),
                    description: seed.description.to_owned(),
                    icon_url: None,
                    xp_reward: seed.rarity.default_reward(),
                    rarity: seed.rarity,
                    criteria: seed.criteria,
                })
            })
            .collect();
        Self { badges }
    }
}
