//! Server harness and shared world for the progression behaviour suites.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The `WorldFixture` stops the server
//! even if a step panics.

use std::cell::RefCell;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use chrono::{DateTime, TimeZone, Utc};
use progression::Trace;
use progression::domain::CloseOutcome;
use progression::inbound::http::health::{HealthState, live, ready};
use progression::inbound::http::leagues::{close_week, get_league};
use progression::inbound::http::me::{current_progress, sign_out};
use progression::inbound::http::state::HttpState;
use progression::inbound::http::users::{
    apply_activity, get_badges, get_progress, get_weekly_progress, grant_streak_freezes,
};
use progression::startup::{ProgressionRuntime, ProgressionSettings};
use progression::test_support::MutableClock;
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

pub(crate) struct ProgressionWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) services: ProgressionRuntime,
    pub(crate) clock: Arc<MutableClock>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_trace_id: Option<String>,
    pub(crate) first_result: Option<Value>,
    pub(crate) ledger_after_first: Option<usize>,
    pub(crate) last_close: Option<CloseOutcome>,
}

pub(crate) type SharedWorld = Rc<RefCell<ProgressionWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        shutdown(self.world.clone());
    }
}

pub(crate) fn shutdown(world: SharedWorld) {
    // `LocalSet` must be driven on the thread that owns it, so the world stays
    // borrowed during `block_on`. The future must not borrow the world again.
    let ctx = world.borrow();
    let server = ctx.server.clone();
    ctx.local.block_on(&ctx.runtime, async move {
        server.stop(true).await;
    });
}

pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

/// Monday 2026-03-02 10:00 UTC.
pub(crate) fn scenario_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Parse an RFC 3339 timestamp from a step.
pub(crate) fn instant(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("RFC 3339 timestamp")
        .with_timezone(&Utc)
}

async fn spawn_progression_server(http_state: HttpState) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;

    let http_data = web::Data::new(http_state);
    let health_data = web::Data::new(HealthState::new());
    health_data.mark_ready();

    let server = HttpServer::new(move || {
        let api = web::scope("/api/v1")
            .service(apply_activity)
            .service(get_progress)
            .service(get_badges)
            .service(get_weekly_progress)
            .service(grant_streak_freezes)
            .service(current_progress)
            .service(sign_out)
            .service(close_week)
            .service(get_league);

        App::new()
            .app_data(http_data.clone())
            .app_data(health_data.clone())
            .wrap(Trace)
            .service(api)
            .service(ready)
            .service(live)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

fn create_runtime_and_local() -> (Runtime, LocalSet) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();

    (runtime, local)
}

/// Users `ada` and `grace` are known and `ada` is signed in.
fn create_services(clock: Arc<MutableClock>) -> ProgressionRuntime {
    let settings = ProgressionSettings {
        known_users: Some("ada,grace".to_owned()),
        session_user: Some("ada".to_owned()),
        ..ProgressionSettings::default()
    };
    ProgressionRuntime::from_settings(&settings, clock).expect("valid settings")
}

/// Build a world around a freshly started server.
pub(crate) fn world() -> WorldFixture {
    let (runtime, local) = create_runtime_and_local();
    let clock = Arc::new(MutableClock::new(scenario_start()));
    let services = create_services(clock.clone());

    let (base_url, server) = local
        .block_on(&runtime, async {
            spawn_progression_server(services.http_state()).await
        })
        .expect("server should start");

    let world = Rc::new(RefCell::new(ProgressionWorld {
        runtime,
        local,
        base_url,
        server,
        services,
        clock,
        last_status: None,
        last_body: None,
        last_trace_id: None,
        first_result: None,
        ledger_after_first: None,
        last_close: None,
    }));

    WorldFixture { world }
}
