//! Field-level validation messages.
//!
//! Domain types derive [`validator::Validate`]; the persistence layer runs
//! validation on every add and save and reports failures as [`FieldErrors`].

use std::collections::BTreeMap;

use serde::Serialize;
use validator::{Validate, ValidationErrors};

/// Field name → human-readable messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// One-line summary, e.g. `name: must not be empty; url: invalid`.
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, failures) in errors.field_errors() {
            for failure in failures {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Run the derived validation rules of `value`.
pub fn validate_fields<T: Validate>(value: &T) -> Result<(), FieldErrors> {
    value.validate().map_err(FieldErrors::from)
}
