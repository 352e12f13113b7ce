use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::case;
use crate::types::DbId;

/// Field-scoped error messages keyed by internal (camelCase) field name.
///
/// Fields keep the order they were checked in. Serialized as a plain JSON
/// object so clients can attach each message to the matching form control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<String, String>);

impl FieldErrors {
    /// A map holding exactly one field error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    /// Record a message for `field`. The first message recorded for a field wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        for (field, list) in fields {
            let Some(error) = list.first() else {
                continue;
            };
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            // validator reports Rust field names; expose internal key-space names.
            out.insert(case::decode_key(&field), message);
        }
        out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(FieldErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Validation error scoped to a single field.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation(FieldErrors::single(field, message))
    }

    /// Uniqueness conflict scoped to a single field.
    pub fn conflict(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Conflict(FieldErrors::single(field, message))
    }

    /// The field errors carried by `Validation` and `Conflict`, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            CoreError::Validation(errors) | CoreError::Conflict(errors) => Some(errors),
            _ => None,
        }
    }
}
