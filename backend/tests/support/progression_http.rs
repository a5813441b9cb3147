//! HTTP helpers for the progression behaviour suites.

use actix_web::http::Method;
use awc::Client;
use progression::domain::TRACE_ID_HEADER;
use progression::inbound::http::idempotency::IDEMPOTENCY_KEY_HEADER;
use serde_json::{Value, json};

use crate::harness::{SharedWorld, with_world_async};

pub(crate) struct JsonRequest<'a> {
    pub(crate) method: Method,
    pub(crate) path: &'a str,
    pub(crate) payload: Option<Value>,
    pub(crate) idempotency_key: Option<&'a str>,
}

struct CapturedResponse {
    status: u16,
    trace_id: Option<String>,
    body: Option<Value>,
}

fn record_response(world: &SharedWorld, captured: CapturedResponse) {
    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(captured.status);
    ctx.last_trace_id = captured.trace_id;
    ctx.last_body = captured.body;
}

pub(crate) fn perform_json_request(world: &SharedWorld, spec: JsonRequest<'_>) {
    let captured = with_world_async(world, |base_url| async move {
        let mut request =
            Client::default().request(spec.method, format!("{base_url}{}", spec.path));
        if let Some(key) = spec.idempotency_key {
            request = request.insert_header((IDEMPOTENCY_KEY_HEADER, key));
        }
        let mut response = match spec.payload {
            Some(payload) => request.send_json(&payload).await.expect("json request"),
            None => request.send().await.expect("request"),
        };
        let status = response.status().as_u16();
        let trace_id = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.body().await.expect("body");
        // 204 responses and probes carry no JSON.
        let body = serde_json::from_slice(&body).ok();
        CapturedResponse {
            status,
            trace_id,
            body,
        }
    });

    record_response(world, captured);
}

pub(crate) fn perform_get(world: &SharedWorld, path: &str) {
    perform_json_request(
        world,
        JsonRequest {
            method: Method::GET,
            path,
            payload: None,
            idempotency_key: None,
        },
    );
}

pub(crate) fn perform_post(world: &SharedWorld, path: &str, payload: Option<Value>) {
    perform_json_request(
        world,
        JsonRequest {
            method: Method::POST,
            path,
            payload,
            idempotency_key: None,
        },
    );
}

/// Activity submitted by the steps.
pub(crate) struct ActivitySpec<'a> {
    pub(crate) user: &'a str,
    pub(crate) source: &'a str,
    pub(crate) amount: i64,
    pub(crate) occurred_at: Option<&'a str>,
    pub(crate) event_key: Option<&'a str>,
}

/// Post an activity and remember the first accepted result with the ledger
/// size right after it.
pub(crate) fn record_activity(world: &SharedWorld, spec: ActivitySpec<'_>) {
    let mut payload = json!({
        "source": spec.source,
        "amount": spec.amount,
        "description": "scenario activity",
    });
    if let Some(at) = spec.occurred_at {
        payload["occurredAt"] = json!(at);
    }
    let path = format!("/api/v1/users/{}/activities", spec.user);
    perform_json_request(
        world,
        JsonRequest {
            method: Method::POST,
            path: &path,
            payload: Some(payload),
            idempotency_key: spec.event_key,
        },
    );

    let mut guard = world.borrow_mut();
    let ctx = &mut *guard;
    if ctx.last_status == Some(200) && ctx.first_result.is_none() {
        ctx.first_result = ctx.last_body.clone();
        ctx.ledger_after_first = Some(ctx.services.store.ledger_len());
    }
}
