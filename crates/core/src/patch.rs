//! Sparse partial updates.
//!
//! A [`ChangeSet`] holds only the fields a caller explicitly supplied. Fields
//! absent from the change set are never touched, so a patch can not reset a
//! value by omission. Values that happen to equal the current state still
//! count as changes: only an empty change set is a no-op.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::entity::ID_FIELD;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("Patch payload must be a JSON object")]
    NotAnObject,

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{0}' cannot be modified")]
    ImmutableField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Normalise a field name for comparison: case-insensitive, ignoring `_`
/// and `-`. `OrganizationId`, `organizationId` and `organization_id` are
/// the same field.
pub fn normalize_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// An ordered collection of `(field, new value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<(String, Value)>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a change set from a JSON object, keeping key order. Every key
    /// present in the object is a change, including explicit `null`s.
    pub fn from_json(payload: Value) -> Result<Self, PatchError> {
        match payload {
            Value::Object(map) => Ok(map
                .into_iter()
                .fold(Self::new(), |set, (field, value)| set.with(field, value))),
            _ => Err(PatchError::NotAnObject),
        }
    }

    /// Add a change. A later change to the same (normalised) field replaces
    /// the earlier one in place.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let key = normalize_field_name(&field);
        let value = value.into();
        match self
            .changes
            .iter_mut()
            .find(|(existing, _)| normalize_field_name(existing) == key)
        {
            Some(slot) => *slot = (field, value),
            None => self.changes.push((field, value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Names of the fields this change set would modify, as supplied.
    pub fn changed_field_names(&self) -> Vec<&str> {
        self.changes.iter().map(|(f, _)| f.as_str()).collect()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        let key = normalize_field_name(field);
        self.changes
            .iter()
            .any(|(existing, _)| normalize_field_name(existing) == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.changes.iter().map(|(f, v)| (f.as_str(), v))
    }
}

/// Apply `changes` to `original` in place.
///
/// Returns the canonical names of the fields that were written. On error
/// `original` is left exactly as it was.
///
/// Field lookup goes through the entity's serialized form, so entity types
/// must serialize every patchable field (no `skip_serializing_if`).
pub fn apply_changes<E>(original: &mut E, changes: &ChangeSet) -> Result<Vec<String>, PatchError>
where
    E: Serialize + DeserializeOwned,
{
    let mut document = match serde_json::to_value(&*original) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(PatchError::NotAnObject),
        Err(e) => return Err(PatchError::InvalidValue(e.to_string())),
    };

    let mut written = Vec::with_capacity(changes.len());
    for (field, value) in changes.iter() {
        let key = resolve_field(&document, field)?;
        if key == ID_FIELD {
            return Err(PatchError::ImmutableField(key));
        }
        document.insert(key.clone(), value.clone());
        written.push(key);
    }

    let updated: E = serde_json::from_value(Value::Object(document))
        .map_err(|e| PatchError::InvalidValue(e.to_string()))?;
    *original = updated;
    Ok(written)
}

fn resolve_field(document: &Map<String, Value>, field: &str) -> Result<String, PatchError> {
    let wanted = normalize_field_name(field);
    document
        .keys()
        .find(|k| normalize_field_name(k) == wanted)
        .cloned()
        .ok_or_else(|| PatchError::UnknownField(field.to_string()))
}
