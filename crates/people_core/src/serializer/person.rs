//! Person serializer.
//!
//! Field rules (in declaration order):
//! - `name`: required, not null, string or number, trimmed, not blank,
//!   at most `NAME_MAX_CHARS` characters, no NUL characters.
//! - `date`: optional; absent, `null` and `""` mean unset; otherwise a
//!   `YYYY-MM-DD` string.
//!
//! Unknown keys, including a client-supplied `id`, are ignored.

use super::errors::ValidationErrors;
use crate::model::person::{NewPerson, DATE_FORMAT, NAME_MAX_CHARS};
use chrono::NaiveDate;
use serde_json::{Map, Value};

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_NULL: &str = "This field may not be null.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_INVALID_STRING: &str = "Not a valid string.";
pub const MSG_NO_DATA: &str = "No data provided";
pub const MSG_NULL_CHARACTERS: &str = "Null characters are not allowed.";
pub const MSG_DATE_FORMAT: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

/// Validation entry point for untyped person input.
pub struct PersonSerializer;

impl PersonSerializer {
    /// Validates `data` and returns an insert candidate.
    ///
    /// # Errors
    /// Returns every failing field at once; nothing is persisted by this call.
    pub fn validate(data: &Value) -> Result<NewPerson, ValidationErrors> {
        let object = match data {
            Value::Object(object) => object,
            Value::Null => return Err(ValidationErrors::non_field(MSG_NO_DATA)),
            other => {
                return Err(ValidationErrors::non_field(format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_type_name(other)
                )))
            }
        };

        let mut errors = ValidationErrors::new();
        let name = validate_name(object).map_err(|message| errors.add("name", message));
        let date = validate_date(object).map_err(|message| errors.add("date", message));

        match (name, date) {
            (Ok(name), Ok(date)) => Ok(NewPerson { name, date }),
            _ => Err(errors),
        }
    }
}

fn validate_name(object: &Map<String, Value>) -> Result<String, String> {
    let raw = match object.get("name") {
        None => return Err(MSG_REQUIRED.to_string()),
        Some(Value::Null) => return Err(MSG_NULL.to_string()),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(_) => return Err(MSG_INVALID_STRING.to_string()),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MSG_BLANK.to_string());
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        return Err(format!(
            "Ensure this field has no more than {NAME_MAX_CHARS} characters."
        ));
    }
    if trimmed.contains('\0') {
        return Err(MSG_NULL_CHARACTERS.to_string());
    }
    Ok(trimmed.to_string())
}

fn validate_date(object: &Map<String, Value>) -> Result<Option<NaiveDate>, String> {
    match object.get("date") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(Value::String(text)) => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Some)
            .map_err(|_| MSG_DATE_FORMAT.to_string()),
        Some(_) => Err(MSG_DATE_FORMAT.to_string()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "list",
        Value::String(_) => "str",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "int",
        Value::Object(_) => "dict",
        Value::Null => "NoneType",
    }
}
