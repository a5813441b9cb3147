//! Assembles services and adapters from [`ProgressionSettings`].

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{LeagueCommand, LeagueQuery, ProgressionCommand, ProgressionQuery};
use crate::domain::{
    LeaderboardService, LevelCurve, LevelResolver, ProgressionPolicy, ProgressionPorts,
    ProgressionService, StreakTracker, TierTable, WeeklyLeagueCloseJob,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{InMemoryIdentityProvider, InMemoryProgressionStore};
use crate::startup::{ProgressionSettings, StartupError, load_badge_catalog};

/// Wired services sharing one in-memory store.
#[derive(Clone)]
pub struct ProgressionRuntime {
    pub store: Arc<InMemoryProgressionStore>,
    pub identity: Arc<InMemoryIdentityProvider>,
    pub progression: Arc<ProgressionService>,
    pub leaderboard: Arc<LeaderboardService>,
    clock: Arc<dyn Clock>,
}

impl ProgressionRuntime {
    /// Build the runtime, failing on any invalid setting.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use progression::startup::{ProgressionRuntime, ProgressionSettings};
    ///
    /// let runtime = ProgressionRuntime::from_settings(
    ///     &ProgressionSettings::default(),
    ///     Arc::new(DefaultClock),
    /// )
    /// .expect("defaults are valid");
    /// let _state = runtime.http_state();
    /// ```
    pub fn from_settings(
        settings: &ProgressionSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StartupError> {
        let catalog = Arc::new(load_badge_catalog(settings.catalog_path.as_deref())?);
        let curve = LevelCurve::uniform(settings.level_step())?;

        let identity = Arc::new(InMemoryIdentityProvider::with_users(settings.known_users()?));
        if let Some(user) = settings.session_user()? {
            identity.sign_in(user);
        }

        let store = Arc::new(InMemoryProgressionStore::new());
        let progression = ProgressionService::new(
            ProgressionPorts {
                ledger: store.clone(),
                progress: store.clone(),
                badges: store.clone(),
                unit_of_work: store.clone(),
                identity: identity.clone(),
            },
            Arc::clone(&clock),
            catalog,
        )
        .with_resolver(LevelResolver::new(curve, TierTable::default()))
        .with_streak_tracker(StreakTracker::new(settings.freeze_cap()))
        .with_policy(ProgressionPolicy {
            weekly_goal_xp: settings.weekly_goal_xp(),
        });
        let leaderboard = LeaderboardService::new(store.clone(), store.clone(), Arc::clone(&clock));

        info!(
            weekly_goal_xp = settings.weekly_goal_xp(),
            freeze_cap = settings.freeze_cap(),
            level_step = settings.level_step(),
            "progression runtime assembled"
        );
        Ok(Self {
            store,
            identity,
            progression: Arc::new(progression),
            leaderboard: Arc::new(leaderboard),
            clock,
        })
    }

    pub fn http_state(&self) -> HttpState {
        let progression: Arc<dyn ProgressionCommand> = self.progression.clone();
        let progression_query: Arc<dyn ProgressionQuery> = self.progression.clone();
        let leagues: Arc<dyn LeagueCommand> = self.leaderboard.clone();
        let leagues_query: Arc<dyn LeagueQuery> = self.leaderboard.clone();
        HttpState::new(HttpStatePorts {
            progression,
            progression_query,
            leagues,
            leagues_query,
        })
    }

    pub fn close_job(&self, settings: &ProgressionSettings) -> WeeklyLeagueCloseJob {
        WeeklyLeagueCloseJob::new(
            self.leaderboard.clone(),
            Arc::clone(&self.clock),
            settings.close_interval(),
        )
        .with_catch_up_weeks(settings.close_catch_up_weeks())
    }
}
