//! In-memory progression store.
//!
//! A single lock guards every table so a [`ProgressionCommit`] is validated
//! and applied in one critical section: either all of it becomes visible or
//! none of it does. The store can be switched offline to exercise
//! `storage_unavailable` paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    ActivityReplay, BadgeAwardRepository, BadgeAwardRepositoryError, LeagueRepository,
    LeagueRepositoryError, ProgressRepository, ProgressRepositoryError, ProgressionCommit,
    ProgressionUnitOfWork, ProgressionUnitOfWorkError, XpLedgerRepository,
    XpLedgerRepositoryError,
};
use crate::domain::{
    EventId, League, LeagueTier, UserBadge, UserId, UserProgress, XpActivity, total_xp,
};

const OFFLINE: &str = "in-memory store is offline";
const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct Tables {
    /// Ledger in insertion order; `created_at` may arrive out of order.
    ledger: Vec<XpActivity>,
    progress: HashMap<UserId, UserProgress>,
    badges: HashMap<UserId, Vec<UserBadge>>,
    leagues: BTreeMap<(DateTime<Utc>, LeagueTier), League>,
    replays: HashMap<(UserId, EventId), ActivityReplay>,
}

impl Tables {
    fn sorted_entries<'a>(
        &'a self,
        keep: impl Fn(&XpActivity) -> bool + 'a,
    ) -> Vec<XpActivity> {
        let mut entries: Vec<XpActivity> = self
            .ledger
            .iter()
            .filter(|entry| keep(entry))
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.created_at);
        entries
    }

    fn has_badge(&self, badge: &UserBadge) -> bool {
        self.badges
            .get(&badge.user_id)
            .is_some_and(|held| held.iter().any(|b| b.badge_id == badge.badge_id))
    }
}

/// Process-local implementation of every storage port.
#[derive(Debug, Default)]
pub struct InMemoryProgressionStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl InMemoryProgressionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the backing store were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, &'static str> {
        if self.is_offline() {
            return Err(OFFLINE);
        }
        self.tables.read().map_err(|_| POISONED)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, &'static str> {
        if self.is_offline() {
            return Err(OFFLINE);
        }
        self.tables.write().map_err(|_| POISONED)
    }

    /// Number of ledger entries across all users.
    pub fn ledger_len(&self) -> usize {
        self.tables.read().map_or(0, |tables| tables.ledger.len())
    }
}

// Offline maps to a connection failure; a poisoned lock to a query failure.
macro_rules! access_error {
    ($error:ty, $reason:expr) => {
        if $reason == OFFLINE {
            <$error>::connection($reason)
        } else {
            <$error>::query($reason)
        }
    };
}

#[async_trait]
impl XpLedgerRepository for InMemoryProgressionStore {
    async fn append(&self, activity: &XpActivity) -> Result<(), XpLedgerRepositoryError> {
        let mut tables = self
            .write()
            .map_err(|reason| access_error!(XpLedgerRepositoryError, reason))?;
        tables.ledger.push(activity.clone());
        Ok(())
    }

    async fn total_for(&self, user_id: &UserId) -> Result<u64, XpLedgerRepositoryError> {
        let tables = self
            .read()
            .map_err(|reason| access_error!(XpLedgerRepositoryError, reason))?;
        Ok(total_xp(
            tables.ledger.iter().filter(|entry| &entry.user_id == user_id),
        ))
    }

    async fn entries_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<XpActivity>, XpLedgerRepositoryError> {
        let tables = self
            .read()
            .map_err(|reason| access_error!(XpLedgerRepositoryError, reason))?;
        Ok(tables.sorted_entries(|entry| &entry.user_id == user_id && entry.created_at >= since))
    }

    async fn entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<XpActivity>, XpLedgerRepositoryError> {
        let tables = self
            .read()
            .map_err(|reason| access_error!(XpLedgerRepositoryError, reason))?;
        Ok(tables.sorted_entries(|entry| entry.created_at >= start && entry.created_at < end))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressionStore {
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProgress>, ProgressRepositoryError> {
        let tables = self
            .read()
            .map_err(|reason| access_error!(ProgressRepositoryError, reason))?;
        Ok(tables.progress.get(user_id).cloned())
    }

    async fn save(&self, progress: &UserProgress) -> Result<(), ProgressRepositoryError> {
        let mut tables = self
            .write()
            .map_err(|reason| access_error!(ProgressRepositoryError, reason))?;
        tables
            .progress
            .insert(progress.user_id.clone(), progress.clone());
        Ok(())
    }
}

#[async_trait]
impl BadgeAwardRepository for InMemoryProgressionStore {
    async fn list_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserBadge>, BadgeAwardRepositoryError> {
        let tables = self
            .read()
            .map_err(|reason| access_error!(BadgeAwardRepositoryError, reason))?;
        Ok(tables.badges.get(user_id).cloned().unwrap_or_default())
    }

    async fn award(&self, badge: &UserBadge) -> Result<bool, BadgeAwardRepositoryError> {
        let mut tables = self
            .write()
            .map_err(|reason| access_error!(BadgeAwardRepositoryError, reason))?;
        if tables.has_badge(badge) {
            return Ok(false);
        }
        tables
            .badges
            .entry(badge.user_id.clone())
            .or_default()
            .push(badge.clone());
        Ok(true)
    }
}

#[async_trait]
impl LeagueRepository for InMemoryProgressionStore {
    async fn insert_week(&self, leagues: &[League]) -> Result<(), LeagueRepositoryError> {
        let mut tables = self
            .write()
            .map_err(|reason| access_error!(LeagueRepositoryError, reason))?;
        if let Some(existing) = leagues
            .iter()
            .find(|league| tables.leagues.contains_key(&(league.week_start, league.tier)))
        {
            return Err(LeagueRepositoryError::already_closed(
                existing.tier,
                existing.week_start,
            ));
        }
        for league in leagues {
            tables
                .leagues
                .insert((league.week_start, league.tier), league.clone());
        }
        Ok(())
    }

    async fn find(
        &self,
        tier: LeagueTier,
        week_start: DateTime<Utc>,
    ) -> Result<Option<League>, LeagueRepositoryError> {
        let tables = self
            .read()
            .map_err(|reason| access_error!(LeagueRepositoryError, reason))?;
        Ok(tables.leagues.get(&(week_start, tier)).cloned())
    }
}

#[async_trait]
impl ProgressionUnitOfWork for InMemoryProgressionStore {
    async fn commit(&self, commit: ProgressionCommit) -> Result<(), ProgressionUnitOfWorkError> {
        let mut tables = self
            .write()
            .map_err(|reason| access_error!(ProgressionUnitOfWorkError, reason))?;

        // Validate everything before the first mutation.
        if let Some(badge) = commit.badges.iter().find(|badge| tables.has_badge(badge)) {
            return Err(ProgressionUnitOfWorkError::conflict(format!(
                "badge {} already awarded to {}",
                badge.badge_id, badge.user_id
            )));
        }
        if let Some(replay) = &commit.replay {
            if tables
                .replays
                .contains_key(&(commit.user_id.clone(), replay.event_id))
            {
                return Err(ProgressionUnitOfWorkError::conflict(format!(
                    "event {} already recorded",
                    replay.event_id
                )));
            }
        }

        tables.ledger.extend(commit.activities);
        tables
            .progress
            .insert(commit.user_id.clone(), commit.progress);
        for badge in commit.badges {
            tables
                .badges
                .entry(badge.user_id.clone())
                .or_default()
                .push(badge);
        }
        if let Some(replay) = commit.replay {
            tables
                .replays
                .insert((commit.user_id, replay.event_id), replay);
        }
        Ok(())
    }

    async fn find_replay(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<ActivityReplay>, ProgressionUnitOfWorkError> {
        let tables = self
            .read()
            .map_err(|reason| access_error!(ProgressionUnitOfWorkError, reason))?;
        Ok(tables.replays.get(&(user_id.clone(), *event_id)).cloned())
    }
}
