//! Tests for domain error construction and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(DomainError::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(DomainError::invalid_amount("zero"), ErrorCode::InvalidAmount)]
#[case(DomainError::unknown_user("who"), ErrorCode::UnknownUser)]
#[case(DomainError::unauthorized("nobody"), ErrorCode::Unauthorized)]
#[case(DomainError::not_found("missing"), ErrorCode::NotFound)]
#[case(DomainError::already_closed("closed"), ErrorCode::AlreadyClosed)]
#[case(DomainError::conflict("reused"), ErrorCode::Conflict)]
#[case(DomainError::storage_unavailable("down"), ErrorCode::StorageUnavailable)]
#[case(DomainError::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: DomainError, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid UUID");
    let error = TraceId::scope(trace_id, async move { DomainError::internal("boom") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn new_has_no_trace_id_out_of_scope() {
    assert!(DomainError::internal("boom").trace_id().is_none());
}

#[rstest]
fn serialises_with_camel_case_and_snake_case_code() {
    let error = DomainError::already_closed("week closed")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "tier": "gold" }));
    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "code": "already_closed",
            "message": "week closed",
            "traceId": TRACE_ID,
            "details": { "tier": "gold" },
        })
    );
}

#[rstest]
fn omits_empty_optional_fields() {
    let value = serde_json::to_value(DomainError::not_found("missing")).expect("serialise error");
    assert!(value.get("traceId").is_none());
    assert!(value.get("details").is_none());
}

#[rstest]
fn display_uses_message() {
    assert_eq!(DomainError::conflict("reused key").to_string(), "reused key");
}
