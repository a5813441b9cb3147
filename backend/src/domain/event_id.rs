//! Caller-supplied activity event identifiers.
//!
//! Retried activities carry the same [`EventId`]. The service stores a
//! [`PayloadHash`] next to the original result so a retry with identical input
//! replays it and a reused id with different input is rejected.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Validation errors for [`EventId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventIdValidationError {
    Empty,
    NotUuid,
}

impl fmt::Display for EventIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "event id must not be empty"),
            Self::NotUuid => write!(f, "event id must be a valid UUID"),
        }
    }
}

impl std::error::Error for EventIdValidationError {}

/// Identifier of one logical activity submission.
///
/// # Examples
/// ```
/// use progression::domain::EventId;
///
/// let id = EventId::parse("550e8400-e29b-41d4-a716-446655440000").expect("valid");
/// assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
/// assert!(EventId::parse("").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Parse a textual UUID. Surrounding whitespace is rejected.
    pub fn parse(raw: &str) -> Result<Self, EventIdValidationError> {
        if raw.is_empty() {
            return Err(EventIdValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(EventIdValidationError::NotUuid);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| EventIdValidationError::NotUuid)
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SHA-256 fingerprint of a canonical JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadHash([u8; 32]);

impl PayloadHash {
    /// Hash `value` after sorting object keys recursively.
    ///
    /// # Examples
    /// ```
    /// use progression::domain::PayloadHash;
    /// use serde_json::json;
    ///
    /// let a = PayloadHash::of_json(&json!({ "b": 1, "a": [2, 3] }));
    /// let b = PayloadHash::of_json(&json!({ "a": [2, 3], "b": 1 }));
    /// assert_eq!(a, b);
    /// ```
    pub fn of_json(value: &Value) -> Self {
        let mut hasher = Sha256::new();
        write_canonical(value, &mut hasher);
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hexadecimal form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PayloadHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Streams compact JSON with sorted keys straight into the digest. Scalars
// reuse serde_json's own encoding so strings are escaped consistently.
fn write_canonical(value: &Value, hasher: &mut Sha256) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            hasher.update(b"{");
            for (index, key) in keys.into_iter().enumerate() {
                if index > 0 {
                    hasher.update(b",");
                }
                write_canonical(&Value::String(key.clone()), hasher);
                hasher.update(b":");
                if let Some(child) = map.get(key) {
                    write_canonical(child, hasher);
                }
            }
            hasher.update(b"}");
        }
        Value::Array(items) => {
            hasher.update(b"[");
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    hasher.update(b",");
                }
                write_canonical(item, hasher);
            }
            hasher.update(b"]");
        }
        scalar => hasher.update(scalar.to_string().as_bytes()),
    }
}
