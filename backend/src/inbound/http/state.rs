//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised with mocks and no storage.

use std::sync::Arc;

use crate::domain::ports::{LeagueCommand, LeagueQuery, ProgressionCommand, ProgressionQuery};

/// Parameter object bundling the driving ports.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub progression: Arc<dyn ProgressionCommand>,
    pub progression_query: Arc<dyn ProgressionQuery>,
    pub leagues: Arc<dyn LeagueCommand>,
    pub leagues_query: Arc<dyn LeagueQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub progression: Arc<dyn ProgressionCommand>,
    pub progression_query: Arc<dyn ProgressionQuery>,
    pub leagues: Arc<dyn LeagueCommand>,
    pub leagues_query: Arc<dyn LeagueQuery>,
}

impl HttpState {
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use progression::domain::{
    ///     BadgeCatalog, LeaderboardService, ProgressionPorts, ProgressionService,
    /// };
    /// use progression::inbound::http::state::{HttpState, HttpStatePorts};
    /// use progression::outbound::memory::{InMemoryIdentityProvider, InMemoryProgressionStore};
    ///
    /// let store = Arc::new(InMemoryProgressionStore::new());
    /// let progression = Arc::new(ProgressionService::new(
    ///     ProgressionPorts {
    ///         ledger: store.clone(),
    ///         progress: store.clone(),
    ///         badges: store.clone(),
    ///         unit_of_work: store.clone(),
    ///         identity: Arc::new(InMemoryIdentityProvider::new()),
    ///     },
    ///     Arc::new(DefaultClock),
    ///     Arc::new(BadgeCatalog::default()),
    /// ));
    /// let leagues = Arc::new(LeaderboardService::new(
    ///     store.clone(),
    ///     store,
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(HttpStatePorts {
    ///     progression: progression.clone(),
    ///     progression_query: progression,
    ///     leagues: leagues.clone(),
    ///     leagues_query: leagues,
    /// });
    /// let _command = state.progression.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            progression,
            progression_query,
            leagues,
            leagues_query,
        } = ports;
        Self {
            progression,
            progression_query,
            leagues,
            leagues_query,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
