//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic and do not derive `ToSchema`. The
//! wrappers here mirror their shape and register under the domain names.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// An XP grant was zero or negative.
    #[schema(rename = "invalid_amount")]
    InvalidAmount,
    /// The identity collaborator could not confirm the user.
    #[schema(rename = "unknown_user")]
    UnknownUser,
    /// Nobody is signed in.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The league week has already been closed.
    #[schema(rename = "already_closed")]
    AlreadyClosed,
    /// An event id was reused with a different payload.
    #[schema(rename = "conflict")]
    Conflict,
    /// Storage or identity is temporarily unavailable.
    #[schema(rename = "storage_unavailable")]
    StorageUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::DomainError`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DomainError, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_amount")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "xp amount must be positive, got 0")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details such as the offending field.
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_schema_uses_wire_field_names() {
        let schema_json = schema_to_json::<ErrorSchema>();
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.DomainError");
        assert!(schema_json.contains("traceId"), "missing traceId");
        assert!(schema_json.contains("details"), "missing details");
    }

    #[rstest]
    #[case("invalid_request")]
    #[case("invalid_amount")]
    #[case("unknown_user")]
    #[case("unauthorized")]
    #[case("not_found")]
    #[case("already_closed")]
    #[case("conflict")]
    #[case("storage_unavailable")]
    #[case("internal_error")]
    fn error_code_schema_lists_every_code(#[case] code: &str) {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        assert!(schema_json.contains(code), "missing {code}");
    }
}
