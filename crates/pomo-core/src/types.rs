//! Core type definitions with validation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The category name is not one of the known categories.
    #[error("unknown category: {value}")]
    UnknownCategory { value: String },
}

/// The fixed set of categories a focus session can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Category {
    #[default]
    Study,
    Coding,
    Project,
    Reading,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 4] = [Self::Study, Self::Coding, Self::Project, Self::Reading];

    /// String representation for database storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Study => "Study",
            Self::Coding => "Coding",
            Self::Project => "Project",
            Self::Reading => "Reading",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownCategory {
                value: s.to_string(),
            })
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Generates a fresh random ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated user identifier.
    ///
    /// Every persisted session record carries the ID of the user that owns it.
    UserId, "user ID"
);

define_string_id!(
    /// A validated session record identifier.
    SessionId, "session ID"
);

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// Normalizes a username for registration and lookup.
pub fn normalize_username(username: &str) -> Result<&str, ValidationError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "username" });
    }
    Ok(trimmed)
}

/// The facts of a finished (or manually paused) focus run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub category: Category,
    pub duration_seconds: u32,
    pub distraction_count: u32,
}

/// A session record that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSessionRecord {
    pub owner_id: UserId,
    pub date: NaiveDate,
    pub summary: SessionSummary,
}

/// A persisted, immutable session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub owner_id: UserId,
    pub date: NaiveDate,
    pub category: Category,
    pub duration_seconds: u32,
    pub distraction_count: u32,
}

impl SessionRecord {
    /// Builds the stored form of a new record under the given ID.
    #[must_use]
    pub fn from_new(id: SessionId, record: &NewSessionRecord) -> Self {
        Self {
            id,
            owner_id: record.owner_id.clone(),
            date: record.date,
            category: record.summary.category,
            duration_seconds: record.summary.duration_seconds,
            distraction_count: record.summary.distraction_count,
        }
    }
}
