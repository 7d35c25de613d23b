//! Field-level validation error map.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key used for errors that are not tied to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Ordered mapping of field name to error messages.
///
/// Serializes as a JSON object, e.g. `{"name": ["This field is required."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an error map holding one non-field message.
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(NON_FIELD_ERRORS, message);
        errors
    }

    /// Appends `message` under `field`, keeping first-seen field order.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.fields.push((field.to_string(), vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for `field`, empty when the field passed.
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    /// Failing field names in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, messages) in &self.fields {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::ValidationErrors;

    #[test]
    fn serializes_in_insertion_order() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "first");
        errors.add("date", "second");
        errors.add("name", "third");

        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"{"name":["first","third"],"date":["second"]}"#);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name", "date"]);
        assert_eq!(errors.to_string(), "name: first; name: third; date: second");
    }

    #[test]
    fn messages_of_passing_field_are_empty() {
        let errors = ValidationErrors::non_field("No data provided");
        assert!(errors.messages("name").is_empty());
        assert_eq!(errors.messages("non_field_errors"), ["No data provided"]);
    }
}
