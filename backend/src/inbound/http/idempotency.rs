//! `Idempotency-Key` header parsing.
//!
//! The header carries the activity's event id. Redelivering the same payload
//! with the same key replays the recorded result.

use actix_web::http::header::HeaderMap;
use serde_json::json;

use crate::domain::{DomainError, EventId, EventIdValidationError};

pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Event id from the request headers, if present.
pub fn extract_event_id(headers: &HeaderMap) -> Result<Option<EventId>, EventIdValidationError> {
    let Some(value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| EventIdValidationError::NotUuid)?;
    EventId::parse(raw).map(Some)
}

pub fn map_event_id_error(err: EventIdValidationError) -> DomainError {
    let message = match err {
        EventIdValidationError::Empty => "idempotency-key header must not be empty",
        EventIdValidationError::NotUuid => "idempotency-key header must be a valid uuid",
    };
    DomainError::invalid_request(message)
        .with_details(json!({ "field": IDEMPOTENCY_KEY_HEADER, "code": "invalid_idempotency_key" }))
}
