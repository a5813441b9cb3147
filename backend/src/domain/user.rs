//! User identity as seen by the progression engine.
//!
//! Users are owned by the identity collaborator. The engine only keys state
//! by their opaque identifier and reads the timezone that defines their
//! calendar days.

use std::fmt;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Maximum accepted identifier length in bytes.
pub const USER_ID_MAX_LEN: usize = 128;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    SurroundingWhitespace,
    TooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::SurroundingWhitespace => {
                write!(f, "user id must not contain surrounding whitespace")
            }
            Self::TooLong { max } => write!(f, "user id must be at most {max} bytes"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Opaque stable user identifier issued by the identity collaborator.
///
/// # Examples
/// ```
/// use progression::domain::UserId;
///
/// let id = UserId::new("user-42").expect("valid id");
/// assert_eq!(id.as_ref(), "user-42");
/// assert!(UserId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = id.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::SurroundingWhitespace);
        }
        if raw.len() > USER_ID_MAX_LEN {
            return Err(UserValidationError::TooLong {
                max: USER_ID_MAX_LEN,
            });
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A user confirmed by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownUser {
    pub id: UserId,
    /// Offset that defines the user's calendar days.
    pub utc_offset: FixedOffset,
}

impl KnownUser {
    /// A confirmed user whose days follow UTC.
    pub fn utc(id: UserId) -> Self {
        Self {
            id,
            utc_offset: Utc.fix(),
        }
    }
}
