//! Leaderboard aggregator.
//!
//! Closes finished weeks into immutable league snapshots. It only reads the
//! ledger and never touches progress, streaks or badges.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    LeagueCommand, LeagueQuery, LeagueRepository, LeagueRepositoryError, XpLedgerRepository,
};
use crate::domain::{
    DomainError, League, LeagueBanding, LeagueTier, XpLedger, build_week, week_end,
};

fn map_league_error(error: LeagueRepositoryError) -> DomainError {
    match error {
        LeagueRepositoryError::AlreadyClosed { tier, week_start } => DomainError::already_closed(
            format!("{tier} league for week starting {week_start} is already closed"),
        )
        .with_details(json!({ "tier": tier.as_str(), "weekStart": week_start })),
        LeagueRepositoryError::Connection { message } => {
            DomainError::storage_unavailable(format!("league store unavailable: {message}"))
        }
        LeagueRepositoryError::Query { message } => {
            DomainError::internal(format!("league store error: {message}"))
        }
    }
}

/// Whether `at` is a Monday 00:00 UTC week boundary.
pub fn is_week_boundary(at: DateTime<Utc>) -> bool {
    at.weekday() == Weekday::Mon && at.time() == NaiveTime::MIN
}

/// Leaderboard service implementing [`LeagueCommand`] and [`LeagueQuery`].
#[derive(Clone)]
pub struct LeaderboardService {
    ledger: XpLedger,
    leagues: Arc<dyn LeagueRepository>,
    clock: Arc<dyn Clock>,
    banding: LeagueBanding,
}

impl LeaderboardService {
    pub fn new(
        ledger: Arc<dyn XpLedgerRepository>,
        leagues: Arc<dyn LeagueRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger: XpLedger::new(ledger, Arc::clone(&clock)),
            leagues,
            clock,
            banding: LeagueBanding::default(),
        }
    }

    pub fn with_banding(mut self, banding: LeagueBanding) -> Self {
        self.banding = banding;
        self
    }
}

#[async_trait]
impl LeagueCommand for LeaderboardService {
    async fn close_week(&self, week_start: DateTime<Utc>) -> Result<Vec<League>, DomainError> {
        if !is_week_boundary(week_start) {
            return Err(DomainError::invalid_request(format!(
                "week start {week_start} is not a Monday 00:00 UTC boundary"
            ))
            .with_details(json!({ "field": "weekStart", "code": "not_week_boundary" })));
        }
        let end = week_end(week_start);
        if end > self.clock.utc() {
            return Err(DomainError::invalid_request(format!(
                "week starting {week_start} has not finished yet"
            ))
            .with_details(json!({ "field": "weekStart", "code": "week_in_progress" })));
        }

        let entries = self.ledger.entries_between(week_start, end).await?;
        let leagues = build_week(week_start, &entries, &self.banding);
        self.leagues
            .insert_week(&leagues)
            .await
            .map_err(map_league_error)?;

        let ranked: usize = leagues.iter().map(|league| league.users.len()).sum();
        info!(week_start = %week_start, ranked, "week closed");
        Ok(leagues)
    }
}

#[async_trait]
impl LeagueQuery for LeaderboardService {
    async fn get_league(
        &self,
        tier: LeagueTier,
        week_start: DateTime<Utc>,
    ) -> Result<League, DomainError> {
        self.leagues
            .find(tier, week_start)
            .await
            .map_err(map_league_error)?
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "no {tier} league for week starting {week_start}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{MockLeagueRepository, XpLedgerRepository};
    use crate::domain::{ErrorCode, UserId, XpActivity, XpAmount, XpSource};
    use crate::outbound::memory::InMemoryProgressionStore;
    use crate::test_support::MutableClock;
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    fn week_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn entry(user: &str, amount: i64, hours: i64) -> XpActivity {
        XpActivity {
            id: Uuid::new_v4(),
            user_id: UserId::new(user).expect("valid id"),
            amount: XpAmount::new(amount).expect("positive"),
            source: XpSource::LessonComplete,
            description: "lesson".to_owned(),
            created_at: week_start() + Duration::hours(hours),
        }
    }

    struct Harness {
        store: Arc<InMemoryProgressionStore>,
        service: LeaderboardService,
    }

    #[fixture]
    fn harness() -> Harness {
        let store = Arc::new(InMemoryProgressionStore::new());
        let clock = Arc::new(MutableClock::new(week_start() + Duration::days(8)));
        let service = LeaderboardService::new(store.clone(), store.clone(), clock);
        Harness { store, service }
    }

    #[rstest]
    #[tokio::test]
    async fn closing_a_week_ranks_users_into_tiers(harness: Harness) {
        for (user, amount, hours) in [("a", 300, 1), ("b", 200, 2), ("c", 100, 3), ("a", 50, 4)] {
            harness
                .store
                .append(&entry(user, amount, hours))
                .await
                .expect("seed ledger");
        }
        // Outside the window.
        harness
            .store
            .append(&entry("d", 999, 7 * 24))
            .await
            .expect("seed ledger");

        let leagues = harness
            .service
            .close_week(week_start())
            .await
            .expect("week closes");
        let tiers: Vec<LeagueTier> = leagues.iter().map(|league| league.tier).collect();
        assert_eq!(tiers, LeagueTier::DESCENDING.to_vec());

        let diamond = &leagues[0];
        assert_eq!(diamond.users.len(), 1);
        assert_eq!(diamond.users[0].user_id.as_ref(), "a");
        assert_eq!(diamond.users[0].weekly_xp, 350);
        assert_eq!(diamond.week_end, week_start() + Duration::days(7));
        let ranked: usize = leagues.iter().map(|league| league.users.len()).sum();
        assert_eq!(ranked, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn closing_twice_fails_and_keeps_the_first_snapshot(harness: Harness) {
        harness
            .store
            .append(&entry("a", 100, 1))
            .await
            .expect("seed ledger");
        let first = harness
            .service
            .close_week(week_start())
            .await
            .expect("first close");

        harness
            .store
            .append(&entry("b", 500, 2))
            .await
            .expect("late entry");
        let err = harness
            .service
            .close_week(week_start())
            .await
            .expect_err("second close");
        assert_eq!(err.code(), ErrorCode::AlreadyClosed);

        for league in first {
            let stored = harness
                .service
                .get_league(league.tier, week_start())
                .await
                .expect("stored league");
            assert_eq!(stored, league);
        }
    }

    #[rstest]
    #[case(week_start() + Duration::hours(1))]
    #[case(week_start() + Duration::days(1))]
    #[tokio::test]
    async fn rejects_non_boundary_week_starts(harness: Harness, #[case] start: DateTime<Utc>) {
        let err = harness
            .service
            .close_week(start)
            .await
            .expect_err("not a boundary");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_unfinished_weeks(harness: Harness) {
        let err = harness
            .service
            .close_week(week_start() + Duration::days(7))
            .await
            .expect_err("week in progress");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_league_is_not_found(harness: Harness) {
        let err = harness
            .service
            .get_league(LeagueTier::Gold, week_start())
            .await
            .expect_err("nothing closed");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn league_store_outage_is_storage_unavailable() {
        let mut leagues = MockLeagueRepository::new();
        leagues
            .expect_insert_week()
            .times(1)
            .return_once(|_| Err(LeagueRepositoryError::connection("down")));
        let store = Arc::new(InMemoryProgressionStore::new());
        let service = LeaderboardService::new(
            store,
            Arc::new(leagues),
            Arc::new(MutableClock::new(week_start() + Duration::days(8))),
        );

        let err = service
            .close_week(week_start())
            .await
            .expect_err("store down");
        assert_eq!(err.code(), ErrorCode::StorageUnavailable);
    }
}
