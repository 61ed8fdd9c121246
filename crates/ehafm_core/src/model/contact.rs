//! Contact domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable contact identifier.
pub type ContactId = Uuid;

/// Person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub uuid: ContactId,
    pub name: String,
    /// Empty when unknown.
    pub phone: String,
    /// Empty when unknown, otherwise a well-formed address.
    pub email: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Validated field values for creating or editing a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
}
