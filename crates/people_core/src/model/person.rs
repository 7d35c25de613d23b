//! Person domain model.
//!
//! # Responsibility
//! - Define the stored `Person` record and its insert-side shape `NewPerson`.
//! - Own the model-level invariants re-checked at the persistence boundary.
//!
//! # Invariants
//! - `name` is trimmed, non-empty and at most [`NAME_MAX_CHARS`] characters.
//! - `id` is assigned by the store and never changes afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier (SQLite rowid).
pub type PersonId = i64;

/// Maximum length of `name`, counted in characters.
pub const NAME_MAX_CHARS: usize = 100;

/// Wire/storage format of `date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A persisted person record.
///
/// `date` is omitted from the JSON form when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Validated candidate for insertion; has no identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub name: String,
    pub date: Option<NaiveDate>,
}

impl NewPerson {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Checks model invariants before any write.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        validate_name(&self.name)
    }

    /// Attaches the store-assigned identifier.
    pub fn into_person(self, id: PersonId) -> Person {
        Person {
            id,
            name: self.name,
            date: self.date,
        }
    }
}

impl Person {
    /// Checks the same invariants as [`NewPerson::validate`] on a read-back row.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        validate_name(&self.name)
    }
}

fn validate_name(name: &str) -> Result<(), PersonValidationError> {
    if name.trim().is_empty() {
        return Err(PersonValidationError::BlankName);
    }
    if name.trim() != name {
        return Err(PersonValidationError::UntrimmedName);
    }
    let chars = name.chars().count();
    if chars > NAME_MAX_CHARS {
        return Err(PersonValidationError::NameTooLong {
            chars,
            max: NAME_MAX_CHARS,
        });
    }
    Ok(())
}

/// Model invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    BlankName,
    UntrimmedName,
    NameTooLong { chars: usize, max: usize },
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "person name must not be blank"),
            Self::UntrimmedName => {
                write!(f, "person name must not have surrounding whitespace")
            }
            Self::NameTooLong { chars, max } => {
                write!(f, "person name has {chars} characters; maximum is {max}")
            }
        }
    }
}

impl Error for PersonValidationError {}
