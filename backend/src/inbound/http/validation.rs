//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns an `invalid_request` error whose details name the
//! offending field, the rejected value and a stable code.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{DomainError, LeagueTier, UserId, XpSource};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUserId,
    InvalidTimestamp,
    InvalidSource,
    InvalidTier,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUserId => "invalid_user_id",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidSource => "invalid_source",
            ErrorCode::InvalidTier => "invalid_tier",
        }
    }
}

/// HTTP field name as clients spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn invalid_value(field: FieldName, code: ErrorCode, message: String, value: &str) -> DomainError {
    DomainError::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_user_id(value: String, field: FieldName) -> Result<UserId, DomainError> {
    UserId::new(value.clone()).map_err(|err| {
        invalid_value(
            field,
            ErrorCode::InvalidUserId,
            format!("{}: {err}", field.as_str()),
            &value,
        )
    })
}

pub(crate) fn parse_rfc3339_timestamp(
    value: String,
    field: FieldName,
) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            invalid_value(
                field,
                ErrorCode::InvalidTimestamp,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
                &value,
            )
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, DomainError> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

pub(crate) fn parse_source(value: String, field: FieldName) -> Result<XpSource, DomainError> {
    XpSource::from_str(&value).map_err(|_| {
        let known: Vec<&str> = XpSource::ALL.iter().map(|source| source.as_str()).collect();
        invalid_value(
            field,
            ErrorCode::InvalidSource,
            format!("{} must be one of {}", field.as_str(), known.join(", ")),
            &value,
        )
    })
}

pub(crate) fn parse_tier(value: String, field: FieldName) -> Result<LeagueTier, DomainError> {
    LeagueTier::from_str(&value).map_err(|_| {
        invalid_value(
            field,
            ErrorCode::InvalidTier,
            format!(
                "{} must be bronze, silver, gold, platinum or diamond",
                field.as_str()
            ),
            &value,
        )
    })
}
