//! Weekly leagues.
//!
//! Ranking and banding are pure functions over ledger entries. The
//! leaderboard service feeds them a week of entries and persists the result.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::WEEK_DAYS;
use super::{UserId, XpActivity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeagueTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl LeagueTier {
    /// Tiers from the top down.
    pub const DESCENDING: [Self; 5] = [
        Self::Diamond,
        Self::Platinum,
        Self::Gold,
        Self::Silver,
        Self::Bronze,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
            Self::Diamond => "diamond",
        }
    }
}

impl fmt::Display for LeagueTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLeagueTierError {
    pub value: String,
}

impl fmt::Display for ParseLeagueTierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown league tier: {}", self.value)
    }
}

impl std::error::Error for ParseLeagueTierError {}

impl FromStr for LeagueTier {
    type Err = ParseLeagueTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::DESCENDING
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| ParseLeagueTierError {
                value: s.to_owned(),
            })
    }
}

/// A ranked member of a league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueUser {
    pub user_id: UserId,
    /// 1-based position within the tier.
    pub rank: u32,
    pub weekly_xp: u64,
}

/// Immutable snapshot of one tier for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub id: Uuid,
    pub tier: LeagueTier,
    pub week_start: DateTime<Utc>,
    pub week_end: DateTime<Utc>,
    pub users: Vec<LeagueUser>,
}

/// One user's aggregate for a week, before banding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyStanding {
    pub user_id: UserId,
    pub weekly_xp: u64,
    pub last_entry_at: DateTime<Utc>,
}

/// Sum `entries` per user and order them best first.
///
/// Ties on XP go to the user whose last entry came earlier, then to the
/// lower user id. Users without entries never appear.
pub fn rank_entries<'a>(entries: impl IntoIterator<Item = &'a XpActivity>) -> Vec<WeeklyStanding> {
    let mut totals: HashMap<&UserId, (u64, DateTime<Utc>)> = HashMap::new();
    for entry in entries {
        let slot = totals
            .entry(&entry.user_id)
            .or_insert((0, entry.created_at));
        slot.0 = slot.0.saturating_add(entry.amount.get());
        slot.1 = slot.1.max(entry.created_at);
    }
    let mut standings: Vec<WeeklyStanding> = totals
        .into_iter()
        .map(|(user_id, (weekly_xp, last_entry_at))| WeeklyStanding {
            user_id: user_id.clone(),
            weekly_xp,
            last_entry_at,
        })
        .collect();
    standings.sort_by(|a, b| {
        b.weekly_xp
            .cmp(&a.weekly_xp)
            .then_with(|| a.last_entry_at.cmp(&b.last_entry_at))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    standings
}

/// Errors raised by [`LeagueBanding::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BandingError {
    OverAllocated { total_percent: u32 },
}

impl fmt::Display for BandingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverAllocated { total_percent } => write!(
                f,
                "upper tiers take {total_percent}% of users, at most 100% allowed"
            ),
        }
    }
}

impl std::error::Error for BandingError {}

/// Share of the ranked cohort placed in each upper tier; bronze takes the
/// rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueBanding {
    pub diamond_percent: u32,
    pub platinum_percent: u32,
    pub gold_percent: u32,
    pub silver_percent: u32,
}

impl Default for LeagueBanding {
    fn default() -> Self {
        Self {
            diamond_percent: 5,
            platinum_percent: 10,
            gold_percent: 20,
            silver_percent: 30,
        }
    }
}

impl LeagueBanding {
    pub fn new(
        diamond_percent: u32,
        platinum_percent: u32,
        gold_percent: u32,
        silver_percent: u32,
    ) -> Result<Self, BandingError> {
        let banding = Self {
            diamond_percent,
            platinum_percent,
            gold_percent,
            silver_percent,
        };
        let total_percent = banding.upper_tiers().iter().map(|(_, pct)| pct).sum();
        if total_percent > 100 {
            return Err(BandingError::OverAllocated { total_percent });
        }
        Ok(banding)
    }

    fn upper_tiers(&self) -> [(LeagueTier, u32); 4] {
        [
            (LeagueTier::Diamond, self.diamond_percent),
            (LeagueTier::Platinum, self.platinum_percent),
            (LeagueTier::Gold, self.gold_percent),
            (LeagueTier::Silver, self.silver_percent),
        ]
    }

    /// Split ranked `standings` into tiers, top down.
    ///
    /// Each upper tier ends at `ceil(n * cumulative% / 100)`.
    pub fn assign(&self, standings: Vec<WeeklyStanding>) -> HashMap<LeagueTier, Vec<LeagueUser>> {
        let n = standings.len();
        let mut boundaries = Vec::with_capacity(5);
        let mut cumulative = 0_u64;
        for (tier, percent) in self.upper_tiers() {
            cumulative += u64::from(percent);
            let n64 = u64::try_from(n).unwrap_or(u64::MAX);
            let end = (n64.saturating_mul(cumulative)).div_ceil(100).min(n64);
            boundaries.push((tier, usize::try_from(end).unwrap_or(n)));
        }
        boundaries.push((LeagueTier::Bronze, n));

        let mut tiers: HashMap<LeagueTier, Vec<LeagueUser>> = LeagueTier::DESCENDING
            .into_iter()
            .map(|tier| (tier, Vec::new()))
            .collect();
        let mut boundary = boundaries.iter().peekable();
        for (position, standing) in standings.into_iter().enumerate() {
            while let Some((_, end)) = boundary.peek() {
                if position < *end {
                    break;
                }
                boundary.next();
            }
            let Some((tier, _)) = boundary.peek() else {
                break;
            };
            let members = tiers.entry(*tier).or_default();
            members.push(LeagueUser {
                user_id: standing.user_id,
                rank: u32::try_from(members.len() + 1).unwrap_or(u32::MAX),
                weekly_xp: standing.weekly_xp,
            });
        }
        tiers
    }
}

/// Build the five league records for the week starting at `week_start`.
pub fn build_week(
    week_start: DateTime<Utc>,
    entries: &[XpActivity],
    banding: &LeagueBanding,
) -> Vec<League> {
    let week_end = week_end(week_start);
    let mut tiers = banding.assign(rank_entries(
        entries
            .iter()
            .filter(|entry| entry.created_at >= week_start && entry.created_at < week_end),
    ));
    LeagueTier::DESCENDING
        .into_iter()
        .map(|tier| League {
            id: Uuid::new_v4(),
            tier,
            week_start,
            week_end,
            users: tiers.remove(&tier).unwrap_or_default(),
        })
        .collect()
}

/// Exclusive end of the week starting at `week_start`.
pub fn week_end(week_start: DateTime<Utc>) -> DateTime<Utc> {
    week_start + Duration::days(WEEK_DAYS)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{XpAmount, XpSource};
    use chrono::TimeZone;
    use rstest::rstest;

    fn monday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn entry(user: &str, amount: i64, hours_in: i64) -> XpActivity {
        XpActivity {
            id: Uuid::new_v4(),
            user_id: UserId::new(user).expect("valid id"),
            amount: XpAmount::new(amount).expect("positive"),
            source: XpSource::LessonComplete,
            description: "lesson".to_owned(),
            created_at: monday() + Duration::hours(hours_in),
        }
    }

    fn standing(user: &str, weekly_xp: u64) -> WeeklyStanding {
        WeeklyStanding {
            user_id: UserId::new(user).expect("valid id"),
            weekly_xp,
            last_entry_at: monday(),
        }
    }

    #[rstest]
    fn ranks_by_xp_then_earlier_finish_then_id() {
        let entries = [
            entry("carol", 100, 5),
            entry("bob", 60, 1),
            entry("bob", 40, 9),
            entry("alice", 100, 5),
            entry("dave", 30, 2),
        ];
        let order: Vec<_> = rank_entries(&entries)
            .into_iter()
            .map(|s| (s.user_id.to_string(), s.weekly_xp))
            .collect();
        assert_eq!(
            order,
            vec![
                ("alice".to_owned(), 100),
                ("carol".to_owned(), 100),
                ("bob".to_owned(), 100),
                ("dave".to_owned(), 30),
            ]
        );
    }

    #[rstest]
    #[case(1, [1, 0, 0, 0, 0])]
    #[case(10, [1, 1, 2, 3, 3])]
    #[case(20, [1, 2, 4, 6, 7])]
    #[case(0, [0, 0, 0, 0, 0])]
    fn default_banding_sizes(#[case] n: usize, #[case] sizes: [usize; 5]) {
        let standings = (0..n)
            .map(|i| standing(&format!("user-{i:03}"), 1000 - i as u64))
            .collect();
        let tiers = LeagueBanding::default().assign(standings);
        let observed: Vec<usize> = LeagueTier::DESCENDING
            .iter()
            .map(|tier| tiers.get(tier).map_or(0, Vec::len))
            .collect();
        assert_eq!(observed, sizes.to_vec());
    }

    #[rstest]
    fn ranks_restart_in_each_tier() {
        let standings = (0..10)
            .map(|i| standing(&format!("user-{i}"), 100 - i))
            .collect();
        let tiers = LeagueBanding::default().assign(standings);
        let gold: Vec<u32> = tiers[&LeagueTier::Gold].iter().map(|u| u.rank).collect();
        assert_eq!(gold, vec![1, 2]);
        assert_eq!(tiers[&LeagueTier::Diamond][0].user_id.as_ref(), "user-0");
    }

    #[rstest]
    fn build_week_emits_every_tier_and_ignores_outside_entries() {
        let entries = [
            entry("alice", 50, 1),
            entry("bob", 20, -1),
            entry("carol", 20, 7 * 24),
        ];
        let leagues = build_week(monday(), &entries, &LeagueBanding::default());
        assert_eq!(leagues.len(), 5);
        assert_eq!(leagues[0].tier, LeagueTier::Diamond);
        assert_eq!(leagues[0].users.len(), 1);
        assert_eq!(leagues[0].week_end, monday() + Duration::days(7));
        assert!(leagues[1..].iter().all(|league| league.users.is_empty()));
    }

    #[rstest]
    fn rejects_over_allocated_banding() {
        assert_eq!(
            LeagueBanding::new(50, 30, 20, 10),
            Err(BandingError::OverAllocated { total_percent: 110 })
        );
    }

    #[rstest]
    fn tier_names_round_trip() {
        for tier in LeagueTier::DESCENDING {
            assert_eq!(tier.as_str().parse::<LeagueTier>(), Ok(tier));
        }
        assert!("wood".parse::<LeagueTier>().is_err());
    }
}
