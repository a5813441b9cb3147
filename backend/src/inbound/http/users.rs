//! Per-user progression handlers.
//!
//! ```text
//! POST /api/v1/users/{userId}/activities
//! GET  /api/v1/users/{userId}/progress
//! GET  /api/v1/users/{userId}/badges
//! GET  /api/v1/users/{userId}/weekly-progress?at=2026-03-04T10:00:00Z
//! POST /api/v1/users/{userId}/streak-freezes
//! ```

use actix_web::{HttpRequest, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{ApplyActivityRequest, GrantStreakFreezesRequest};
use crate::domain::{DomainError, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{
    BadgeOverviewBody, ProgressBody, ProgressionResultBody, StreakFreezeGrantBody,
    WeeklyProgressBody,
};
use crate::inbound::http::idempotency::{extract_event_id, map_event_id_error};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_optional_rfc3339_timestamp, parse_source, parse_user_id,
};

#[derive(Debug, Deserialize)]
struct UserPath {
    user_id: String,
}

impl UserPath {
    fn into_user_id(self) -> Result<UserId, DomainError> {
        parse_user_id(self.user_id, FieldName::new("userId"))
    }
}

/// Request payload for recording an activity.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequestBody {
    #[schema(example = "lesson_complete")]
    pub source: String,
    #[schema(example = 50)]
    pub amount: i64,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to the server clock.
    #[schema(format = "date-time")]
    #[serde(default)]
    pub occurred_at: Option<String>,
}

/// Request payload for banking streak freezes.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreakFreezeRequestBody {
    #[schema(minimum = 1, example = 1)]
    pub count: u32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeeklyProgressQuery {
    /// Instant inside the week to report; defaults to now.
    #[param(format = "date-time")]
    pub at: Option<String>,
}

/// Record a qualifying activity and everything it unlocks.
///
/// Sending the same `Idempotency-Key` with the same body replays the first
/// result; a different body with a used key is a conflict.
#[utoipa::path(
    post,
    path = "/api/v1/users/{userId}/activities",
    params(
        ("userId" = String, Path, description = "Identifier issued by the identity collaborator"),
        ("Idempotency-Key" = Option<String>, Header, description = "Event id (UUID) for safe redelivery")
    ),
    request_body = ActivityRequestBody,
    responses(
        (status = 200, description = "Activity applied", body = ProgressionResultBody),
        (status = 400, description = "Invalid request or amount", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "Event id reused with a different payload", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["progression"],
    operation_id = "applyActivity"
)]
#[post("/users/{user_id}/activities")]
pub async fn apply_activity(
    state: web::Data<HttpState>,
    request: HttpRequest,
    path: web::Path<UserPath>,
    payload: web::Json<ActivityRequestBody>,
) -> ApiResult<web::Json<ProgressionResultBody>> {
    let user_id = path.into_inner().into_user_id()?;
    let event_id = extract_event_id(request.headers()).map_err(map_event_id_error)?;
    let body = payload.into_inner();
    let source = parse_source(body.source, FieldName::new("source"))?;
    let occurred_at =
        parse_optional_rfc3339_timestamp(body.occurred_at, FieldName::new("occurredAt"))?;

    let result = state
        .progression
        .apply_activity(ApplyActivityRequest {
            user_id,
            source,
            amount: body.amount,
            description: body.description.unwrap_or_default(),
            occurred_at,
            event_id,
        })
        .await?;
    Ok(web::Json(result.into()))
}

/// Progress record with its resolved level.
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/progress",
    params(("userId" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Progress", body = ProgressBody),
        (status = 400, description = "Invalid user id", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["progression"],
    operation_id = "getProgress"
)]
#[get("/users/{user_id}/progress")]
pub async fn get_progress(
    state: web::Data<HttpState>,
    path: web::Path<UserPath>,
) -> ApiResult<web::Json<ProgressBody>> {
    let user_id = path.into_inner().into_user_id()?;
    let view = state.progression_query.get_progress(&user_id).await?;
    Ok(web::Json(view.into()))
}

/// Earned badges and progress towards the locked ones.
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/badges",
    params(("userId" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Badges", body = BadgeOverviewBody),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["progression"],
    operation_id = "getBadges"
)]
#[get("/users/{user_id}/badges")]
pub async fn get_badges(
    state: web::Data<HttpState>,
    path: web::Path<UserPath>,
) -> ApiResult<web::Json<BadgeOverviewBody>> {
    let user_id = path.into_inner().into_user_id()?;
    let overview = state.progression_query.get_badges(&user_id).await?;
    Ok(web::Json(overview.into()))
}

/// XP earned towards the weekly goal.
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/weekly-progress",
    params(("userId" = String, Path, description = "User identifier"), WeeklyProgressQuery),
    responses(
        (status = 200, description = "Weekly progress", body = WeeklyProgressBody),
        (status = 400, description = "Invalid timestamp", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["progression"],
    operation_id = "getWeeklyProgress"
)]
#[get("/users/{user_id}/weekly-progress")]
pub async fn get_weekly_progress(
    state: web::Data<HttpState>,
    path: web::Path<UserPath>,
    query: web::Query<WeeklyProgressQuery>,
) -> ApiResult<web::Json<WeeklyProgressBody>> {
    let user_id = path.into_inner().into_user_id()?;
    let at = parse_optional_rfc3339_timestamp(query.into_inner().at, FieldName::new("at"))?;
    let weekly = state
        .progression_query
        .get_weekly_progress(&user_id, at)
        .await?;
    Ok(web::Json(weekly.into()))
}

/// Bank streak freezes up to the configured cap.
#[utoipa::path(
    post,
    path = "/api/v1/users/{userId}/streak-freezes",
    params(("userId" = String, Path, description = "User identifier")),
    request_body = StreakFreezeRequestBody,
    responses(
        (status = 200, description = "Freezes banked", body = StreakFreezeGrantBody),
        (status = 400, description = "Invalid count", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["progression"],
    operation_id = "grantStreakFreezes"
)]
#[post("/users/{user_id}/streak-freezes")]
pub async fn grant_streak_freezes(
    state: web::Data<HttpState>,
    path: web::Path<UserPath>,
    payload: web::Json<StreakFreezeRequestBody>,
) -> ApiResult<web::Json<StreakFreezeGrantBody>> {
    let user_id = path.into_inner().into_user_id()?;
    let response = state
        .progression
        .grant_streak_freezes(GrantStreakFreezesRequest {
            user_id,
            count: payload.into_inner().count,
        })
        .await?;
    Ok(web::Json(response.into()))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
