//! Weekly league handlers.
//!
//! ```text
//! GET  /api/v1/leagues/{tier}/{weekStart}
//! POST /api/v1/leagues/weeks/{weekStart}/close
//! ```

use actix_web::{get, post, web};
use serde::Deserialize;

use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::LeagueBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_rfc3339_timestamp, parse_tier};

#[derive(Debug, Deserialize)]
struct LeaguePath {
    tier: String,
    week_start: String,
}

#[derive(Debug, Deserialize)]
struct WeekPath {
    week_start: String,
}

/// Stored league snapshot for one tier and week.
#[utoipa::path(
    get,
    path = "/api/v1/leagues/{tier}/{weekStart}",
    params(
        ("tier" = String, Path, description = "bronze, silver, gold, platinum or diamond"),
        ("weekStart" = String, Path, description = "Monday 00:00 UTC, RFC 3339")
    ),
    responses(
        (status = 200, description = "League", body = LeagueBody),
        (status = 400, description = "Invalid tier or timestamp", body = ErrorSchema),
        (status = 404, description = "Week not closed for this tier", body = ErrorSchema)
    ),
    tags = ["leagues"],
    operation_id = "getLeague"
)]
#[get("/leagues/{tier}/{week_start}")]
pub async fn get_league(
    state: web::Data<HttpState>,
    path: web::Path<LeaguePath>,
) -> ApiResult<web::Json<LeagueBody>> {
    let LeaguePath { tier, week_start } = path.into_inner();
    let tier = parse_tier(tier, FieldName::new("tier"))?;
    let week_start = parse_rfc3339_timestamp(week_start, FieldName::new("weekStart"))?;
    let league = state.leagues_query.get_league(tier, week_start).await?;
    Ok(web::Json(league.into()))
}

/// Close a finished week into one league per tier.
#[utoipa::path(
    post,
    path = "/api/v1/leagues/weeks/{weekStart}/close",
    params(("weekStart" = String, Path, description = "Monday 00:00 UTC, RFC 3339")),
    responses(
        (status = 200, description = "Leagues created, highest tier first", body = [LeagueBody]),
        (status = 400, description = "Not a week boundary or week unfinished", body = ErrorSchema),
        (status = 409, description = "Week already closed", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["leagues"],
    operation_id = "closeWeek"
)]
#[post("/leagues/weeks/{week_start}/close")]
pub async fn close_week(
    state: web::Data<HttpState>,
    path: web::Path<WeekPath>,
) -> ApiResult<web::Json<Vec<LeagueBody>>> {
    let week_start =
        parse_rfc3339_timestamp(path.into_inner().week_start, FieldName::new("weekStart"))?;
    let leagues = state.leagues.close_week(week_start).await?;
    Ok(web::Json(leagues.into_iter().map(LeagueBody::from).collect()))
}
