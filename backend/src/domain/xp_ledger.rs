//! XP ledger component.
//!
//! The ledger is the only source of truth for a user's total XP. Drafting an
//! entry and persisting it are separate so the progression service can stage
//! several entries and commit them in one unit of work.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{XpLedgerRepository, XpLedgerRepositoryError};
use crate::domain::{DomainError, UserId, XpActivity, XpActivityDraft, XpSource, XpValidationError};

fn map_ledger_error(error: XpLedgerRepositoryError) -> DomainError {
    match error {
        XpLedgerRepositoryError::Connection { message } => {
            DomainError::storage_unavailable(format!("xp ledger unavailable: {message}"))
        }
        XpLedgerRepositoryError::Query { message } => {
            DomainError::internal(format!("xp ledger error: {message}"))
        }
    }
}

fn map_validation_error(error: XpValidationError) -> DomainError {
    DomainError::invalid_amount(error.to_string())
}

/// Append-only XP ledger over an [`XpLedgerRepository`].
#[derive(Clone)]
pub struct XpLedger {
    repo: Arc<dyn XpLedgerRepository>,
    clock: Arc<dyn Clock>,
}

impl XpLedger {
    pub fn new(repo: Arc<dyn XpLedgerRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Validate a new entry without persisting it.
    ///
    /// `created_at` defaults to the ledger clock.
    pub fn draft(
        &self,
        user_id: &UserId,
        amount: i64,
        source: XpSource,
        description: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<XpActivity, DomainError> {
        XpActivity::try_from(XpActivityDraft {
            user_id: user_id.clone(),
            amount,
            source,
            description: description.to_owned(),
            created_at: created_at.unwrap_or_else(|| self.clock.utc()),
        })
        .map_err(map_validation_error)
    }

    /// Validate and persist an entry on its own.
    ///
    /// `ProgressionService` does not call this: it stages entries with
    /// [`Self::draft`] and writes them through the progression unit of work so
    /// the ledger row commits together with the streak and badge changes. Use
    /// `append` for grants that touch nothing but the ledger.
    ///
    /// # Errors
    /// [`crate::domain::ErrorCode::InvalidAmount`] when `amount <= 0`; nothing
    /// is written in that case.
    pub async fn append(
        &self,
        user_id: &UserId,
        amount: i64,
        source: XpSource,
        description: &str,
    ) -> Result<XpActivity, DomainError> {
        let activity = self.draft(user_id, amount, source, description, None)?;
        self.repo
            .append(&activity)
            .await
            .map_err(map_ledger_error)?;
        debug!(user_id = %user_id, xp = activity.amount.get(), source = %source, "xp appended");
        Ok(activity)
    }

    /// Sum of all entries for `user_id`.
    pub async fn total_for(&self, user_id: &UserId) -> Result<u64, DomainError> {
        self.repo.total_for(user_id).await.map_err(map_ledger_error)
    }

    /// Entries at or after `since`, oldest first.
    pub async fn entries_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<XpActivity>, DomainError> {
        self.repo
            .entries_since(user_id, since)
            .await
            .map_err(map_ledger_error)
    }

    /// Every entry ever recorded for `user_id`.
    pub async fn history(&self, user_id: &UserId) -> Result<Vec<XpActivity>, DomainError> {
        self.entries_since(user_id, DateTime::<Utc>::MIN_UTC).await
    }

    /// Entries of all users in `[start, end)`.
    pub async fn entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<XpActivity>, DomainError> {
        self.repo
            .entries_between(start, end)
            .await
            .map_err(map_ledger_error)
    }
}
