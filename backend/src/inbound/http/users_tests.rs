//! Tests for per-user progression handlers.

use super::*;
use crate::domain::ports::{
    BadgeOverview, GrantStreakFreezesResponse, MockLeagueCommand, MockLeagueQuery,
    MockProgressionCommand, MockProgressionQuery, ProgressionResult,
};
use crate::domain::{ResolvedLevel, StreakOutcome, WeeklyProgress, XpSource};
use crate::inbound::http::idempotency::IDEMPOTENCY_KEY_HEADER as IDEMPOTENCY_KEY;
use crate::inbound::http::state::HttpStatePorts;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;

fn level(level: u32) -> ResolvedLevel {
    ResolvedLevel {
        level,
        tier_title: "Curious Explorer".to_owned(),
        level_floor_xp: u64::from(level - 1) * 100,
        next_level_floor_xp: u64::from(level) * 100,
    }
}

fn sample_result() -> ProgressionResult {
    ProgressionResult {
        xp_gained: 50,
        total_xp: 150,
        level_before: level(1),
        level_after: level(2),
        leveled_up: true,
        streak_before: 0,
        streak_after: 1,
        streak_outcome: StreakOutcome::Started,
        freezes_remaining: 0,
        new_badges: Vec::new(),
    }
}

fn state(command: MockProgressionCommand, query: MockProgressionQuery) -> HttpState {
    HttpState::new(HttpStatePorts {
        progression: Arc::new(command),
        progression_query: Arc::new(query),
        leagues: Arc::new(MockLeagueCommand::new()),
        leagues_query: Arc::new(MockLeagueQuery::new()),
    })
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .service(apply_activity)
            .service(get_progress)
            .service(get_badges)
            .service(get_weekly_progress)
            .service(grant_streak_freezes),
    )
}

#[actix_web::test]
async fn apply_activity_forwards_the_parsed_request() {
    let mut command = MockProgressionCommand::new();
    command
        .expect_apply_activity()
        .withf(|request| {
            request.user_id.as_ref() == "ada"
                && request.source == XpSource::LessonComplete
                && request.amount == 50
                && request.description == "Ownership basics"
                && request.event_id.is_some()
                && request.occurred_at
                    == Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).single()
        })
        .times(1)
        .return_once(|_| Ok(sample_result()));
    let app = actix_test::init_service(test_app(state(command, MockProgressionQuery::new()))).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users/ada/activities")
        .insert_header((
            IDEMPOTENCY_KEY,
            "550e8400-e29b-41d4-a716-446655440000",
        ))
        .set_json(json!({
            "source": "lesson_complete",
            "amount": 50,
            "description": "Ownership basics",
            "occurredAt": "2026-03-02T10:00:00Z",
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["xpGained"], json!(50));
    assert_eq!(body["leveledUp"], json!(true));
    assert_eq!(body["levelAfter"]["level"], json!(2));
    assert_eq!(body["streakOutcome"]["kind"], json!("started"));
}

#[rstest]
#[case(json!({ "source": "gardening", "amount": 10 }), "source")]
#[case(json!({ "source": "quiz_complete", "amount": 10, "occurredAt": "yesterday" }), "occurredAt")]
#[actix_web::test]
async fn apply_activity_rejects_invalid_fields(#[case] payload: Value, #[case] field: &str) {
    let app = actix_test::init_service(test_app(state(
        MockProgressionCommand::new(),
        MockProgressionQuery::new(),
    )))
    .await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users/ada/activities")
        .set_json(payload)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], json!("invalid_request"));
    assert_eq!(body["details"]["field"], json!(field));
}

#[actix_web::test]
async fn apply_activity_rejects_malformed_idempotency_keys() {
    let app = actix_test::init_service(test_app(state(
        MockProgressionCommand::new(),
        MockProgressionQuery::new(),
    )))
    .await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users/ada/activities")
        .insert_header((IDEMPOTENCY_KEY, "not-a-uuid"))
        .set_json(json!({ "source": "quiz_complete", "amount": 10 }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[case(DomainError::invalid_amount("xp amount must be positive, got 0"), StatusCode::BAD_REQUEST)]
#[case(DomainError::unknown_user("nobody"), StatusCode::NOT_FOUND)]
#[case(DomainError::conflict("event reused"), StatusCode::CONFLICT)]
#[case(DomainError::storage_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[actix_web::test]
async fn apply_activity_maps_domain_errors(#[case] error: DomainError, #[case] status: StatusCode) {
    let mut command = MockProgressionCommand::new();
    command
        .expect_apply_activity()
        .times(1)
        .return_once(move |_| Err(error));
    let app = actix_test::init_service(test_app(state(command, MockProgressionQuery::new()))).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users/ada/activities")
        .set_json(json!({ "source": "daily_login", "amount": 0 }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), status);
}

#[actix_web::test]
async fn get_progress_returns_record_and_level() {
    let mut query = MockProgressionQuery::new();
    query
        .expect_get_progress()
        .withf(|user| user.as_ref() == "grace")
        .times(1)
        .returning(|user| {
            let mut progress = crate::domain::UserProgress::new(user.clone());
            progress.total_xp = 150;
            progress.current_level = 2;
            Ok(crate::domain::ports::ProgressView {
                progress,
                level: level(2),
            })
        });
    let app = actix_test::init_service(test_app(state(MockProgressionCommand::new(), query))).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users/grace/progress")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["progress"]["userId"], json!("grace"));
    assert_eq!(body["progress"]["totalXp"], json!(150));
    assert_eq!(body["progress"]["lastActivityDate"], Value::Null);
    assert_eq!(body["level"]["nextLevelFloorXp"], json!(200));
}

#[actix_web::test]
async fn get_badges_lists_earned_and_locked() {
    let mut query = MockProgressionQuery::new();
    query.expect_get_badges().times(1).returning(|_| {
        Ok(BadgeOverview {
            earned: Vec::new(),
            locked: Vec::new(),
        })
    });
    let app = actix_test::init_service(test_app(state(MockProgressionCommand::new(), query))).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users/grace/badges")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body, json!({ "earned": [], "locked": [] }));
}

#[actix_web::test]
async fn get_weekly_progress_passes_the_requested_instant() {
    let at = Utc
        .with_ymd_and_hms(2026, 3, 4, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    let week_start = Utc
        .with_ymd_and_hms(2026, 3, 2, 0, 0, 0)
        .single()
        .expect("valid timestamp");
    let mut query = MockProgressionQuery::new();
    query
        .expect_get_weekly_progress()
        .withf(move |_, requested| *requested == Some(at))
        .times(1)
        .returning(move |_, _| {
            Ok(WeeklyProgress::new(
                (week_start, week_start + chrono::Duration::days(7)),
                120,
                500,
            ))
        });
    let app = actix_test::init_service(test_app(state(MockProgressionCommand::new(), query))).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users/ada/weekly-progress?at=2026-03-04T10:00:00Z")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["earnedXp"], json!(120));
    assert_eq!(body["remainingXp"], json!(380));
    assert_eq!(body["weekStart"], json!("2026-03-02T00:00:00+00:00"));
}

#[actix_web::test]
async fn grant_streak_freezes_reports_the_capped_grant() {
    let mut command = MockProgressionCommand::new();
    command
        .expect_grant_streak_freezes()
        .withf(|request| request.count == 5)
        .times(1)
        .return_once(|_| {
            Ok(GrantStreakFreezesResponse {
                granted: 2,
                streak_freeze_count: 2,
            })
        });
    let app = actix_test::init_service(test_app(state(command, MockProgressionQuery::new()))).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users/ada/streak-freezes")
        .set_json(json!({ "count": 5 }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body, json!({ "granted": 2, "streakFreezeCount": 2 }));
}
