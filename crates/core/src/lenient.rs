//! Tolerant deserializers for form-style request fields.
//!
//! Browser forms submit ids and durations as strings (often empty), API
//! clients submit numbers. Both land here as trimmed text so validation can
//! report a field-scoped message instead of a generic body rejection.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// Deserialize a string/number/null into trimmed text; empty text becomes `None`.
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    let text = match raw {
        None => return Ok(None),
        Some(Scalar::Text(s)) => s.trim().to_string(),
        Some(Scalar::Int(n)) => n.to_string(),
        Some(Scalar::Float(n)) => n.to_string(),
        Some(Scalar::Bool(b)) => b.to_string(),
    };
    Ok(if text.is_empty() { None } else { Some(text) })
}
