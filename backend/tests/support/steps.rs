//! Step definitions shared by the progression and league suites.

use rstest_bdd_macros::{given, then, when};
use serde_json::Value;

use crate::harness::{WorldFixture, instant};
use crate::progression_http::{ActivitySpec, perform_get, record_activity};

#[given("a running progression server")]
fn a_running_progression_server(world: &WorldFixture) {
    let _ = world;
}

#[given("the progression store is offline")]
fn the_progression_store_is_offline(world: &WorldFixture) {
    world.world().borrow().services.store.set_offline(true);
}

#[when("{user} records a {source} activity worth {amount} XP")]
fn records_an_activity(world: &WorldFixture, user: String, source: String, amount: i64) {
    record_activity(
        &world.world(),
        ActivitySpec {
            user: &user,
            source: &source,
            amount,
            occurred_at: None,
            event_key: None,
        },
    );
}

#[when("{user} records a {source} activity worth {amount} XP dated {at}")]
fn records_a_dated_activity(
    world: &WorldFixture,
    user: String,
    source: String,
    amount: i64,
    at: String,
) {
    record_activity(
        &world.world(),
        ActivitySpec {
            user: &user,
            source: &source,
            amount,
            occurred_at: Some(&at),
            event_key: None,
        },
    );
}

#[when("{user} records a {source} activity worth {amount} XP on {days} consecutive days")]
fn records_activities_on_consecutive_days(
    world: &WorldFixture,
    user: String,
    source: String,
    amount: i64,
    days: u32,
) {
    let shared_world = world.world();
    let clock = shared_world.borrow().clock.clone();
    for day in 0..days {
        if day > 0 {
            clock.advance_days(1);
        }
        record_activity(
            &shared_world,
            ActivitySpec {
                user: &user,
                source: &source,
                amount,
                occurred_at: None,
                event_key: None,
            },
        );
        assert_eq!(shared_world.borrow().last_status, Some(200), "day {day}");
    }
}

#[when("the clock advances {hours} hours")]
fn the_clock_advances_hours(world: &WorldFixture, hours: i64) {
    world.world().borrow().clock.advance_hours(hours);
}

#[when("the clock advances {days} days")]
fn the_clock_advances_days(world: &WorldFixture, days: i64) {
    world.world().borrow().clock.advance_days(days);
}

#[when("the clock moves to {at}")]
fn the_clock_moves_to(world: &WorldFixture, at: String) {
    world.world().borrow().clock.set(instant(&at));
}

#[when("the progress of {user} is requested")]
fn the_progress_of_a_user_is_requested(world: &WorldFixture, user: String) {
    perform_get(&world.world(), &format!("/api/v1/users/{user}/progress"));
}

#[then("the response is ok")]
fn the_response_is_ok(world: &WorldFixture) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    assert_eq!(ctx.last_status, Some(200));
}

#[then("the response is ok with a trace id")]
fn the_response_is_ok_with_a_trace_id(world: &WorldFixture) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    assert_eq!(ctx.last_status, Some(200));
    assert!(ctx.last_trace_id.is_some(), "trace id header");
}

#[then("the response carries a trace id")]
fn the_response_carries_a_trace_id(world: &WorldFixture) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    let trace_id = ctx.last_trace_id.as_deref().expect("trace id header");
    let body = ctx.last_body.as_ref().expect("error body");
    assert_eq!(body.get("traceId").and_then(Value::as_str), Some(trace_id));
}

#[then("the response status is {status} with code {code}")]
fn the_response_status_is_with_code(world: &WorldFixture, status: u16, code: String) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    assert_eq!(ctx.last_status, Some(status));
    let body = ctx.last_body.as_ref().expect("error body");
    assert_eq!(body.get("code").and_then(Value::as_str), Some(code.as_str()));
}

#[then("the error names the field {field} with code {code}")]
fn the_error_names_the_field(world: &WorldFixture, field: String, code: String) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    let details = ctx
        .last_body
        .as_ref()
        .and_then(|body| body.get("details"))
        .and_then(Value::as_object)
        .expect("details object");
    assert_eq!(
        details.get("field").and_then(Value::as_str),
        Some(field.as_str())
    );
    assert_eq!(
        details.get("code").and_then(Value::as_str),
        Some(code.as_str())
    );
}

#[then("the ledger is empty")]
fn the_ledger_is_empty(world: &WorldFixture) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    assert_eq!(ctx.services.store.ledger_len(), 0);
}
