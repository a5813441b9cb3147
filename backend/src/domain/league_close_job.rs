//! Background closer for finished league weeks.
//!
//! On every tick the job revisits the most recent finished weeks, oldest
//! first, so weeks skipped while the server was down still get closed. A week
//! that is already closed counts as done, so the job is safe to run on
//! several instances.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use tokio::time;
use tracing::{debug, error, info};

use crate::domain::calendar::{WEEK_DAYS, utc_week_start};
use crate::domain::ports::LeagueCommand;
use crate::domain::{DomainError, ErrorCode};

/// Finished weeks revisited per tick unless configured otherwise.
pub const DEFAULT_CATCH_UP_WEEKS: u32 = 4;

/// What one tick achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Weeks closed by this tick, oldest first.
    Closed { weeks: Vec<DateTime<Utc>> },
    /// Every revisited week was already closed; `week_start` is the latest.
    AlreadyClosed { week_start: DateTime<Utc> },
}

/// Start of the latest week that has fully ended at `now`.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use progression::domain::league_close_job::last_finished_week;
///
/// let wednesday = Utc.with_ymd_and_hms(2026, 3, 11, 9, 0, 0).single().expect("valid");
/// let monday = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).single().expect("valid");
/// assert_eq!(last_finished_week(wednesday), monday);
/// ```
pub fn last_finished_week(now: DateTime<Utc>) -> DateTime<Utc> {
    utc_week_start(now) - Duration::days(WEEK_DAYS)
}

/// Periodic driver of [`LeagueCommand::close_week`].
#[derive(Clone)]
pub struct WeeklyLeagueCloseJob {
    leagues: Arc<dyn LeagueCommand>,
    clock: Arc<dyn Clock>,
    interval: StdDuration,
    catch_up_weeks: u32,
}

impl WeeklyLeagueCloseJob {
    pub fn new(
        leagues: Arc<dyn LeagueCommand>,
        clock: Arc<dyn Clock>,
        interval: StdDuration,
    ) -> Self {
        Self {
            leagues,
            clock,
            interval,
            catch_up_weeks: DEFAULT_CATCH_UP_WEEKS,
        }
    }

    /// Number of finished weeks revisited per tick, at least one.
    pub fn with_catch_up_weeks(mut self, weeks: u32) -> Self {
        self.catch_up_weeks = weeks.max(1);
        self
    }

    /// Close every unclosed week in the catch-up range once.
    ///
    /// Stops at the first failure other than `already_closed`; the next tick
    /// retries from the oldest week again.
    pub async fn run_once(&self) -> Result<CloseOutcome, DomainError> {
        let latest = last_finished_week(self.clock.utc());
        let mut weeks = Vec::new();
        for back in (0..self.catch_up_weeks).rev() {
            let week_start = latest - Duration::days(WEEK_DAYS * i64::from(back));
            match self.leagues.close_week(week_start).await {
                Ok(leagues) => {
                    info!(week_start = %week_start, leagues = leagues.len(), "league week closed by job");
                    weeks.push(week_start);
                }
                Err(err) if err.code() == ErrorCode::AlreadyClosed => {
                    debug!(week_start = %week_start, "league week already closed");
                }
                Err(err) => return Err(err),
            }
        }
        if weeks.is_empty() {
            Ok(CloseOutcome::AlreadyClosed { week_start: latest })
        } else {
            Ok(CloseOutcome::Closed { weeks })
        }
    }

    /// Tick until `shutdown` resolves. The first tick fires immediately.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        let mut ticker = time::interval(self.interval);
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("league close job stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.run_once().await {
                        error!(code = ?err.code(), error = %err, "league close job failed");
                    }
                }
            }
        }
    }
}
