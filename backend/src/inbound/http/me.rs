//! Handlers acting on the user signed in with the identity collaborator.
//!
//! ```text
//! GET  /api/v1/me/progress
//! POST /api/v1/me/sign-out
//! ```

use actix_web::{HttpResponse, get, post, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::ProgressBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Progress of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/me/progress",
    responses(
        (status = 200, description = "Progress", body = ProgressBody),
        (status = 401, description = "Nobody is signed in", body = ErrorSchema),
        (status = 503, description = "Identity or storage unavailable", body = ErrorSchema)
    ),
    tags = ["progression"],
    operation_id = "currentProgress"
)]
#[get("/me/progress")]
pub async fn current_progress(state: web::Data<HttpState>) -> ApiResult<web::Json<ProgressBody>> {
    let view = state.progression_query.current_progress().await?;
    Ok(web::Json(view.into()))
}

/// End the current identity session.
#[utoipa::path(
    post,
    path = "/api/v1/me/sign-out",
    responses(
        (status = 204, description = "Signed out"),
        (status = 503, description = "Identity unavailable", body = ErrorSchema)
    ),
    tags = ["progression"],
    operation_id = "signOut"
)]
#[post("/me/sign-out")]
pub async fn sign_out(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    state.progression.sign_out().await?;
    Ok(HttpResponse::NoContent().finish())
}
