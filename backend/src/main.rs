//! Progression server entry-point: loads settings, wires the in-memory
//! adapters and runs the HTTP server next to the league close job.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use progression::inbound::http::health::HealthState;
use progression::startup::{ProgressionRuntime, ProgressionSettings};

use server::create_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ProgressionSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let runtime = ProgressionRuntime::from_settings(&settings, Arc::new(DefaultClock))
        .map_err(std::io::Error::other)?;

    let (stop_job, job_stopped) = oneshot::channel::<()>();
    let close_job = tokio::spawn(runtime.close_job(&settings).run(async move {
        let _ = job_stopped.await;
    }));

    let health_state = web::Data::new(HealthState::new());
    let bind_addr = settings.bind_addr();
    let server = create_server(health_state, runtime.http_state(), bind_addr)?;
    info!(%bind_addr, "progression server listening");

    let outcome = server.await;
    let _ = stop_job.send(());
    if let Err(e) = close_job.await {
        warn!(error = %e, "league close job ended abnormally");
    }
    outcome
}
