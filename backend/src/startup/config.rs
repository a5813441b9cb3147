//! Runtime configuration loaded via OrthoConfig.
//!
//! Every value can come from the CLI, a configuration file or a
//! `PROGRESSION_*` environment variable. Unset values fall back to the
//! engine defaults through the accessor methods.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    DEFAULT_FREEZE_CAP, DEFAULT_LEVEL_STEP, DEFAULT_WEEKLY_GOAL_XP, KnownUser, UserId,
};
use crate::startup::StartupError;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CLOSE_INTERVAL_SECS: u64 = 300;
const DEFAULT_CLOSE_CATCH_UP_WEEKS: u32 = 4;
const MAX_OFFSET_MINUTES: u32 = 14 * 60;

/// Configuration values for the progression server.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PROGRESSION")]
pub struct ProgressionSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// XP target for the weekly goal.
    pub weekly_goal_xp: Option<u64>,
    /// Largest number of streak freezes a user may bank.
    pub freeze_cap: Option<u32>,
    /// XP per level on the uniform curve.
    pub level_step: Option<u64>,
    /// UTC offset in minutes applied to users from `known_users`.
    pub default_utc_offset_minutes: Option<i32>,
    /// JSON badge catalog. The built-in catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// Seconds between league close attempts.
    pub close_interval_secs: Option<u64>,
    /// Finished weeks, counting back from the latest, the close job revisits.
    pub close_catch_up_weeks: Option<u32>,
    /// Comma-separated user ids the in-memory identity directory confirms.
    pub known_users: Option<String>,
    /// User treated as signed in for the `/me` endpoints.
    pub session_user: Option<String>,
}

impl ProgressionSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    pub fn weekly_goal_xp(&self) -> u64 {
        self.weekly_goal_xp.unwrap_or(DEFAULT_WEEKLY_GOAL_XP)
    }

    pub fn freeze_cap(&self) -> u32 {
        self.freeze_cap.unwrap_or(DEFAULT_FREEZE_CAP)
    }

    pub fn level_step(&self) -> u64 {
        self.level_step.unwrap_or(DEFAULT_LEVEL_STEP)
    }

    pub fn close_interval(&self) -> Duration {
        Duration::from_secs(
            self.close_interval_secs
                .unwrap_or(DEFAULT_CLOSE_INTERVAL_SECS)
                .max(1),
        )
    }

    pub fn close_catch_up_weeks(&self) -> u32 {
        self.close_catch_up_weeks
            .unwrap_or(DEFAULT_CLOSE_CATCH_UP_WEEKS)
            .max(1)
    }

    /// Offset for configured users; UTC when unset.
    pub fn default_utc_offset(&self) -> Result<FixedOffset, StartupError> {
        let minutes = self.default_utc_offset_minutes.unwrap_or(0);
        if minutes.unsigned_abs() > MAX_OFFSET_MINUTES {
            return Err(StartupError::InvalidOffset { minutes });
        }
        FixedOffset::east_opt(minutes * 60).ok_or(StartupError::InvalidOffset { minutes })
    }

    /// Users parsed from `known_users`, blank segments skipped.
    pub fn known_users(&self) -> Result<Vec<KnownUser>, StartupError> {
        let offset = self.default_utc_offset()?;
        self.known_users
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                let id = parse_user(raw)?;
                Ok(KnownUser {
                    id,
                    utc_offset: offset,
                })
            })
            .collect()
    }

    pub fn session_user(&self) -> Result<Option<UserId>, StartupError> {
        self.session_user
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(parse_user)
            .transpose()
    }
}

fn parse_user(raw: &str) -> Result<UserId, StartupError> {
    UserId::new(raw).map_err(|source| StartupError::InvalidUserId {
        value: raw.to_owned(),
        source,
    })
}
