//! Level resolution.
//!
//! Levels are derived from cumulative XP and never stored per user. A
//! [`LevelCurve`] holds the XP floor of each level and a [`TierTable`] names
//! contiguous level ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// XP per level used by the default curve.
pub const DEFAULT_LEVEL_STEP: u64 = 250;

/// Errors raised when a curve or tier table is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelConfigError {
    EmptyCurve,
    FirstFloorNotZero { floor: u64 },
    FloorsNotIncreasing { level: u32 },
    ZeroStep,
    EmptyTierTable,
    TiersMustStartAtOne { min_level: u32 },
    TierGap { expected: u32, found: u32 },
    InvertedTier { min_level: u32, max_level: u32 },
    ClosedLastTier { max_level: u32 },
    OpenTierBeforeLast { title: String },
}

impl fmt::Display for LevelConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCurve => write!(f, "level curve needs at least one floor"),
            Self::FirstFloorNotZero { floor } => {
                write!(f, "level 1 must start at 0 XP (got {floor})")
            }
            Self::FloorsNotIncreasing { level } => {
                write!(f, "floor of level {level} must exceed the previous floor")
            }
            Self::ZeroStep => write!(f, "level step must be positive"),
            Self::EmptyTierTable => write!(f, "tier table must not be empty"),
            Self::TiersMustStartAtOne { min_level } => {
                write!(f, "first tier must start at level 1 (got {min_level})")
            }
            Self::TierGap { expected, found } => {
                write!(f, "tier table gap: expected level {expected}, found {found}")
            }
            Self::InvertedTier {
                min_level,
                max_level,
            } => write!(f, "tier range {min_level}..={max_level} is inverted"),
            Self::ClosedLastTier { max_level } => {
                write!(f, "last tier must be open-ended (ends at {max_level})")
            }
            Self::OpenTierBeforeLast { title } => {
                write!(f, "only the last tier may be open-ended ({title})")
            }
        }
    }
}

impl std::error::Error for LevelConfigError {}

/// Strictly increasing XP floors per level.
///
/// Levels `1..=floors.len()` use the explicit floors; later levels add
/// `tail_step` per level on top of the last floor.
///
/// # Examples
/// ```
/// use progression::domain::LevelCurve;
///
/// let curve = LevelCurve::uniform(250).expect("valid step");
/// assert_eq!(curve.level_for(0), 1);
/// assert_eq!(curve.level_for(999), 4);
/// assert_eq!(curve.level_for(1000), 5);
/// assert_eq!(curve.floor_of(5), 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCurve {
    floors: Vec<u64>,
    tail_step: u64,
}

impl LevelCurve {
    /// Build a curve from explicit floors and a tail step.
    pub fn new(floors: Vec<u64>, tail_step: u64) -> Result<Self, LevelConfigError> {
        let first = *floors.first().ok_or(LevelConfigError::EmptyCurve)?;
        if first != 0 {
            return Err(LevelConfigError::FirstFloorNotZero { floor: first });
        }
        if let Some(index) = floors.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(LevelConfigError::FloorsNotIncreasing {
                level: level_number(index + 2),
            });
        }
        if tail_step == 0 {
            return Err(LevelConfigError::ZeroStep);
        }
        Ok(Self { floors, tail_step })
    }

    /// One level every `step` XP.
    pub fn uniform(step: u64) -> Result<Self, LevelConfigError> {
        Self::new(vec![0], step)
    }

    /// Level reached with `total_xp`. A value equal to a floor belongs to that
    /// level.
    pub fn level_for(&self, total_xp: u64) -> u32 {
        let explicit = self.floors.len();
        let last_floor = self.floors[explicit - 1];
        if total_xp >= last_floor {
            let extra = (total_xp - last_floor) / self.tail_step;
            return level_number(explicit).saturating_add(u32::try_from(extra).unwrap_or(u32::MAX));
        }
        level_number(self.floors.partition_point(|floor| *floor <= total_xp))
    }

    /// XP floor of `level`. Level 0 is treated as level 1.
    pub fn floor_of(&self, level: u32) -> u64 {
        let index = usize::try_from(level.max(1) - 1).unwrap_or(usize::MAX);
        if let Some(floor) = self.floors.get(index) {
            return *floor;
        }
        let last_floor = self.floors[self.floors.len() - 1];
        let beyond = u64::try_from(index + 1 - self.floors.len()).unwrap_or(u64::MAX);
        last_floor.saturating_add(beyond.saturating_mul(self.tail_step))
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            floors: vec![0],
            tail_step: DEFAULT_LEVEL_STEP,
        }
    }
}

fn level_number(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Titled range of levels. `max_level = None` means open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelTier {
    pub min_level: u32,
    pub max_level: Option<u32>,
    pub title: String,
}

impl LevelTier {
    fn new(min_level: u32, max_level: Option<u32>, title: &str) -> Self {
        Self {
            min_level,
            max_level,
            title: title.to_owned(),
        }
    }

    fn contains(&self, level: u32) -> bool {
        level >= self.min_level && self.max_level.is_none_or(|max| level <= max)
    }
}

/// Ordered, gap-free tier table covering levels `[1, ∞)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    tiers: Vec<LevelTier>,
}

impl TierTable {
    /// Validate that tiers start at 1, are contiguous, and only the last is
    /// open-ended.
    pub fn new(tiers: Vec<LevelTier>) -> Result<Self, LevelConfigError> {
        let first = tiers.first().ok_or(LevelConfigError::EmptyTierTable)?;
        if first.min_level != 1 {
            return Err(LevelConfigError::TiersMustStartAtOne {
                min_level: first.min_level,
            });
        }
        let mut expected = 1_u32;
        let last_index = tiers.len() - 1;
        for (index, tier) in tiers.iter().enumerate() {
            if tier.min_level != expected {
                return Err(LevelConfigError::TierGap {
                    expected,
                    found: tier.min_level,
                });
            }
            match (tier.max_level, index == last_index) {
                (Some(max_level), true) => {
                    return Err(LevelConfigError::ClosedLastTier { max_level });
                }
                (None, false) => {
                    return Err(LevelConfigError::OpenTierBeforeLast {
                        title: tier.title.clone(),
                    });
                }
                (Some(max_level), false) if max_level < tier.min_level => {
                    return Err(LevelConfigError::InvertedTier {
                        min_level: tier.min_level,
                        max_level,
                    });
                }
                (Some(max_level), false) => expected = max_level.saturating_add(1),
                (None, true) => {}
            }
        }
        Ok(Self { tiers })
    }

    /// Title for `level`.
    pub fn title_for(&self, level: u32) -> &str {
        self.tiers
            .iter()
            .find(|tier| tier.contains(level))
            .or_else(|| self.tiers.last())
            .map_or("", |tier| tier.title.as_str())
    }

    pub fn tiers(&self) -> &[LevelTier] {
        &self.tiers
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                LevelTier::new(1, Some(5), "Curious Explorer"),
                LevelTier::new(6, Some(10), "Code Apprentice"),
                LevelTier::new(11, Some(20), "Vibe Builder"),
                LevelTier::new(21, Some(35), "Digital Craftsman"),
                LevelTier::new(36, Some(50), "Full-Stack Creator"),
                LevelTier::new(51, None, "Vibe Master"),
            ],
        }
    }
}

/// Level, title and the XP window of the level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLevel {
    pub level: u32,
    pub tier_title: String,
    pub level_floor_xp: u64,
    pub next_level_floor_xp: u64,
}

/// Pure mapping from cumulative XP to [`ResolvedLevel`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelResolver {
    curve: LevelCurve,
    tiers: TierTable,
}

impl LevelResolver {
    pub fn new(curve: LevelCurve, tiers: TierTable) -> Self {
        Self { curve, tiers }
    }

    /// Resolve the level for `total_xp`.
    ///
    /// # Examples
    /// ```
    /// use progression::domain::LevelResolver;
    ///
    /// let resolved = LevelResolver::default().resolve(1250);
    /// assert_eq!(resolved.level, 6);
    /// assert_eq!(resolved.tier_title, "Code Apprentice");
    /// assert_eq!(resolved.next_level_floor_xp, 1500);
    /// ```
    pub fn resolve(&self, total_xp: u64) -> ResolvedLevel {
        let level = self.curve.level_for(total_xp);
        ResolvedLevel {
            level,
            tier_title: self.tiers.title_for(level).to_owned(),
            level_floor_xp: self.curve.floor_of(level),
            next_level_floor_xp: self.curve.floor_of(level.saturating_add(1)),
        }
    }

    pub fn curve(&self) -> &LevelCurve {
        &self.curve
    }
}
