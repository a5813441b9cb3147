//! Startup concerns: configuration, badge catalog loading and wiring.

mod catalog;
mod config;
mod runtime;

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{CatalogError, LevelConfigError, UserValidationError};

pub use catalog::load_badge_catalog;
pub use config::ProgressionSettings;
pub use runtime::ProgressionRuntime;

/// Errors raised while turning settings into a running service.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Catalog file could not be read.
    #[error("failed to read badge catalog at {path}: {source}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Catalog file was read but is invalid.
    #[error("invalid badge catalog at {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
    #[error("invalid level curve: {0}")]
    LevelCurve(#[from] LevelConfigError),
    #[error("utc offset of {minutes} minutes is out of range")]
    InvalidOffset { minutes: i32 },
    #[error("invalid user id {value:?}: {source}")]
    InvalidUserId {
        value: String,
        #[source]
        source: UserValidationError,
    },
}
