//! Domain model for the facility registry.
//!
//! # Responsibility
//! - Define the canonical records: areas, facilities, contacts and roles.
//! - Define enumerated choices and field-level validation rules.
//! - Define the structured document shape used for attachments.
//!
//! # Invariants
//! - Every record is identified by a stable UUIDv4.
//! - Enumerated fields only ever hold one of their declared choices.

pub mod area;
pub mod contact;
pub mod document;
pub mod facility;
pub mod role;
pub mod validation;

use std::fmt::{Display, Formatter};

/// Record family, used to name the subject of lookups and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Area,
    Facility,
    Contact,
    Role,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::Facility => "facility",
            Self::Contact => "contact",
            Self::Role => "role",
        }
    }

    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Area => "areas",
            Self::Facility => "facilities",
            Self::Contact => "contacts",
            Self::Role => "roles",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
