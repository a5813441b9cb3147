//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer together
//! with the error schema wrappers ([`ErrorSchema`], [`ErrorCodeSchema`]).
//! Request and response bodies are collected from the path definitions.
//!
//! The document backs Swagger UI in debug builds and is exported with
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Progression API",
        description = "XP, levels, streaks, badges and weekly leagues for learners.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::apply_activity,
        crate::inbound::http::users::get_progress,
        crate::inbound::http::users::get_badges,
        crate::inbound::http::users::get_weekly_progress,
        crate::inbound::http::users::grant_streak_freezes,
        crate::inbound::http::me::current_progress,
        crate::inbound::http::me::sign_out,
        crate::inbound::http::leagues::get_league,
        crate::inbound::http::leagues::close_week,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "progression", description = "Activities, levels, streaks and badges"),
        (name = "leagues", description = "Weekly league snapshots"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
