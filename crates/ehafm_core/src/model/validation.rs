//! Field-level validation errors and shared input normalizers.
//!
//! Every rejected input is reported as one [`ValidationError`] naming the
//! offending field and the rule it broke, so callers can attach the message
//! to the right form control.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("valid email regex")
});

/// Maximum length of a contact phone number.
pub const PHONE_MAX_CHARS: usize = 32;

/// Rule broken by a rejected field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    /// Value is blank after trim.
    Required,
    /// Value exceeds the maximum character count.
    TooLong { max: usize },
    /// Value is not one of the enumerated choices.
    UnknownChoice {
        value: String,
        allowed: &'static [&'static str],
    },
    /// Value is not a well-formed e-mail address.
    InvalidEmail,
    /// Value is not well-formed JSON.
    MalformedDocument,
    /// Document nests containers deeper than `max`.
    TooDeep { max: usize },
    /// Referenced record does not exist.
    UnknownReference { id: Uuid },
    /// Assigning this parent would make the area its own ancestor.
    CycleDetected { parent: Uuid },
}

/// Recoverable rejection of one input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Caller-facing field name (`name`, `area_type`, `parent`, ...).
    pub field: &'static str,
    pub rule: ValidationRule,
}

impl ValidationError {
    pub fn new(field: &'static str, rule: ValidationRule) -> Self {
        Self { field, rule }
    }

    /// Human-readable message without the field prefix.
    pub fn message(&self) -> String {
        match &self.rule {
            ValidationRule::Required => "this field is required".to_string(),
            ValidationRule::TooLong { max } => {
                format!("ensure this value has at most {max} characters")
            }
            ValidationRule::UnknownChoice { value, allowed } => format!(
                "`{value}` is not one of the available choices ({})",
                allowed.join(", ")
            ),
            ValidationRule::InvalidEmail => "enter a valid email address".to_string(),
            ValidationRule::MalformedDocument => "enter valid JSON".to_string(),
            ValidationRule::TooDeep { max } => {
                format!("ensure the document nests at most {max} levels deep")
            }
            ValidationRule::UnknownReference { id } => {
                format!("referenced record does not exist: {id}")
            }
            ValidationRule::CycleDetected { parent } => {
                format!("parent {parent} would make the area its own ancestor")
            }
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message())
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it when nothing remains.
pub fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, ValidationRule::Required));
    }
    Ok(trimmed.to_string())
}

/// Trims `value` and rejects it when longer than `max` characters.
pub fn bounded_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max {
        return Err(ValidationError::new(field, ValidationRule::TooLong { max }));
    }
    Ok(trimmed.to_string())
}

/// Trims `value`; an empty result is accepted, anything else must look like
/// an e-mail address.
pub fn optional_email(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || EMAIL_RE.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }
    Err(ValidationError::new(field, ValidationRule::InvalidEmail))
}

pub(crate) fn parse_choice<T: Copy>(
    field: &'static str,
    value: &str,
    choices: &[(&'static str, T)],
    allowed: &'static [&'static str],
) -> Result<T, ValidationError> {
    let trimmed = value.trim();
    choices
        .iter()
        .find(|(label, _)| *label == trimmed)
        .map(|(_, choice)| *choice)
        .ok_or_else(|| {
            ValidationError::new(
                field,
                ValidationRule::UnknownChoice {
                    value: trimmed.to_string(),
                    allowed,
                },
            )
        })
}
