//! Badge unlock evaluation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Timelike};
use serde::Serialize;

use super::{Badge, BadgeCatalog, BadgeCondition, BadgeCriteria, BadgeId, CriteriaKind};
use crate::domain::XpActivity;
use crate::domain::calendar::local_date;

/// Everything the engine needs to judge a user's badges.
#[derive(Debug, Clone, Copy)]
pub struct BadgeSnapshot<'a> {
    pub total_xp: u64,
    pub current_streak: u32,
    /// The user's full ledger, including staged entries.
    pub activities: &'a [XpActivity],
    pub utc_offset: FixedOffset,
    /// Local day `same_day` conditions compare against.
    pub reference_date: NaiveDate,
}

/// A badge not yet earned and how close the user is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedBadge {
    pub badge: Badge,
    pub progress: u64,
    pub target: u64,
}

/// Evaluates the catalog against a [`BadgeSnapshot`].
#[derive(Debug, Clone)]
pub struct BadgeEngine {
    catalog: Arc<BadgeCatalog>,
}

impl BadgeEngine {
    pub fn new(catalog: Arc<BadgeCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &BadgeCatalog {
        &self.catalog
    }

    /// Badges satisfied by `snapshot` that are not in `earned`.
    ///
    /// Makes exactly one pass over the catalog. Callers apply rewards and
    /// decide whether a follow-up pass is warranted.
    pub fn evaluate(&self, snapshot: &BadgeSnapshot<'_>, earned: &HashSet<BadgeId>) -> Vec<Badge> {
        self.catalog
            .badges()
            .iter()
            .filter(|badge| !earned.contains(&badge.id))
            .filter(|badge| progress_of(&badge.criteria, snapshot) >= badge.criteria.threshold)
            .cloned()
            .collect()
    }

    /// Progress towards every badge not in `earned`, capped at the target.
    pub fn locked_progress(
        &self,
        snapshot: &BadgeSnapshot<'_>,
        earned: &HashSet<BadgeId>,
    ) -> Vec<LockedBadge> {
        self.catalog
            .badges()
            .iter()
            .filter(|badge| !earned.contains(&badge.id))
            .map(|badge| {
                let target = badge.criteria.threshold;
                LockedBadge {
                    badge: badge.clone(),
                    progress: progress_of(&badge.criteria, snapshot).min(target),
                    target,
                }
            })
            .collect()
    }
}

fn progress_of(criteria: &BadgeCriteria, snapshot: &BadgeSnapshot<'_>) -> u64 {
    match criteria.kind {
        CriteriaKind::Xp => snapshot.total_xp,
        CriteriaKind::Streak => u64::from(snapshot.current_streak),
        kind => {
            let count = snapshot
                .activities
                .iter()
                .filter(|entry| kind.counts(entry.source))
                .filter(|entry| {
                    criteria
                        .additional_conditions
                        .iter()
                        .all(|condition| condition_holds(*condition, entry, snapshot))
                })
                .count();
            u64::try_from(count).unwrap_or(u64::MAX)
        }
    }
}

fn condition_holds(
    condition: BadgeCondition,
    entry: &XpActivity,
    snapshot: &BadgeSnapshot<'_>,
) -> bool {
    let local = entry.created_at.with_timezone(&snapshot.utc_offset);
    match condition {
        BadgeCondition::SameDay => {
            local_date(entry.created_at, snapshot.utc_offset) == snapshot.reference_date
        }
        BadgeCondition::LocalHourBefore { hour } => local.hour() < hour,
        BadgeCondition::LocalHourFrom { hour } => local.hour() >= hour,
    }
}
