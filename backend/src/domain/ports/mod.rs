//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports describe the storage and identity collaborators. Driving
//! ports describe the use-cases adapters call into.

mod macros;
pub(crate) use macros::define_port_error;

mod badge_award_repository;
mod identity_provider;
mod league_command;
mod league_repository;
mod progress_repository;
mod progression_command;
mod progression_unit_of_work;
mod xp_ledger_repository;

#[cfg(test)]
pub use badge_award_repository::MockBadgeAwardRepository;
pub use badge_award_repository::{
    BadgeAwardRepository, BadgeAwardRepositoryError, FixtureBadgeAwardRepository,
};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{FixtureIdentityProvider, IdentityProvider, IdentityProviderError};
pub use league_command::{LeagueCommand, LeagueQuery};
#[cfg(test)]
pub use league_command::{MockLeagueCommand, MockLeagueQuery};
#[cfg(test)]
pub use league_repository::MockLeagueRepository;
pub use league_repository::{FixtureLeagueRepository, LeagueRepository, LeagueRepositoryError};
#[cfg(test)]
pub use progress_repository::MockProgressRepository;
pub use progress_repository::{
    FixtureProgressRepository, ProgressRepository, ProgressRepositoryError,
};
pub use progression_command::{
    ApplyActivityRequest, BadgeOverview, EarnedBadge, GrantStreakFreezesRequest,
    GrantStreakFreezesResponse, ProgressView, ProgressionCommand, ProgressionQuery,
    ProgressionResult,
};
#[cfg(test)]
pub use progression_command::{MockProgressionCommand, MockProgressionQuery};
#[cfg(test)]
pub use progression_unit_of_work::MockProgressionUnitOfWork;
pub use progression_unit_of_work::{
    ActivityReplay, FixtureProgressionUnitOfWork, ProgressionCommit, ProgressionUnitOfWork,
    ProgressionUnitOfWorkError,
};
#[cfg(test)]
pub use xp_ledger_repository::MockXpLedgerRepository;
pub use xp_ledger_repository::{
    FixtureXpLedgerRepository, XpLedgerRepository, XpLedgerRepositoryError,
};
