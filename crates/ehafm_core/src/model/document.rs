//! Opaque structured document attached to facilities and contacts.
//!
//! # Responsibility
//! - Give attachments a crate-owned tagged value shape.
//! - Validate raw input as JSON and re-serialize it deterministically.
//!
//! # Invariants
//! - Object keys are kept sorted, so serialization is stable for equal values.
//! - Blank input means "no document" and is never an error.
//! - Contents are never interpreted beyond structural well-formedness.

use super::validation::{ValidationError, ValidationRule};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Deepest container nesting accepted in a document.
pub const MAX_DOCUMENT_DEPTH: usize = 256;

/// JSON number kept in the narrowest lossless representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

/// Structured value: object, array, string, number, boolean or null.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Document>),
    Object(BTreeMap<String, Document>),
}

impl Document {
    /// Parses raw user input for `field`.
    ///
    /// Returns `Ok(None)` for blank input. Nesting deeper than
    /// [`MAX_DOCUMENT_DEPTH`] is rejected with [`ValidationRule::TooDeep`];
    /// anything else that is not well-formed JSON with
    /// [`ValidationRule::MalformedDocument`].
    pub fn parse(field: &'static str, raw: &str) -> Result<Option<Self>, ValidationError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        if nesting_depth(raw) > MAX_DOCUMENT_DEPTH {
            return Err(ValidationError::new(
                field,
                ValidationRule::TooDeep {
                    max: MAX_DOCUMENT_DEPTH,
                },
            ));
        }
        let malformed = |_: serde_json::Error| ValidationError::new(field, ValidationRule::MalformedDocument);
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        deserializer.disable_recursion_limit();
        let value = serde_json::Value::deserialize(&mut deserializer).map_err(malformed)?;
        deserializer.end().map_err(malformed)?;
        Ok(Some(Self::from(value)))
    }

    /// Compact serialization with sorted object keys.
    pub fn to_canonical_string(&self) -> String {
        serde_json::Value::from(self).to_string()
    }

    /// Looks up a top-level object member.
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Self::Object(members) => members.get(key),
            _ => None,
        }
    }
}

/// Deepest `[`/`{` nesting in `raw`, ignoring brackets inside strings.
///
/// Runs before parsing so recursive conversion and drop stay bounded.
fn nesting_depth(raw: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for byte in raw.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(flag) => Self::Bool(flag),
            serde_json::Value::Number(number) => Self::Number(Number::from(&number)),
            serde_json::Value::String(text) => Self::String(text),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(members) => Self::Object(
                members
                    .into_iter()
                    .map(|(key, member)| (key, Self::from(member)))
                    .collect(),
            ),
        }
    }
}

impl From<&Document> for serde_json::Value {
    fn from(document: &Document) -> Self {
        match document {
            Document::Null => Self::Null,
            Document::Bool(flag) => Self::Bool(*flag),
            Document::Number(number) => number.to_json(),
            Document::String(text) => Self::String(text.clone()),
            Document::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            Document::Object(members) => Self::Object(
                members
                    .iter()
                    .map(|(key, member)| (key.clone(), Self::from(member)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Number> for Number {
    fn from(number: &serde_json::Number) -> Self {
        if let Some(value) = number.as_i64() {
            Self::Int(value)
        } else if let Some(value) = number.as_u64() {
            Self::UInt(value)
        } else {
            // serde_json guarantees one of the three accessors succeeds.
            Self::Float(number.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl Number {
    fn to_json(self) -> serde_json::Value {
        match self {
            Self::Int(value) => serde_json::Value::from(value),
            Self::UInt(value) => serde_json::Value::from(value),
            Self::Float(value) => serde_json::Number::from_f64(value)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
        }
    }
}
