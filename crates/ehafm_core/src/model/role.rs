//! Role domain model.
//!
//! # Invariants
//! - A role never outlives the contact or facility it references.

use super::contact::ContactId;
use super::facility::FacilityId;
use super::validation::{parse_choice, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable role identifier.
pub type RoleId = Uuid;

const ROLE_NAME_LABELS: &[&str] = &["SCCO", "ZCCO", "LGA CCO", "LIO", "WTO", "HFIC"];

/// Named capacity in which a contact serves a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleName {
    #[serde(rename = "SCCO")]
    Scco,
    #[serde(rename = "ZCCO")]
    Zcco,
    #[serde(rename = "LGA CCO")]
    LgaCco,
    #[serde(rename = "LIO")]
    Lio,
    #[serde(rename = "WTO")]
    Wto,
    #[serde(rename = "HFIC")]
    Hfic,
}

impl RoleName {
    pub const ALL: [RoleName; 6] = [
        Self::Scco,
        Self::Zcco,
        Self::LgaCco,
        Self::Lio,
        Self::Wto,
        Self::Hfic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scco => "SCCO",
            Self::Zcco => "ZCCO",
            Self::LgaCco => "LGA CCO",
            Self::Lio => "LIO",
            Self::Wto => "WTO",
            Self::Hfic => "HFIC",
        }
    }

    pub fn parse(field: &'static str, value: &str) -> Result<Self, ValidationError> {
        let choices = Self::ALL.map(|name| (name.as_str(), name));
        parse_choice(field, value, &choices, ROLE_NAME_LABELS)
    }
}

impl Display for RoleName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binding of one contact to one facility under a named capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub uuid: RoleId,
    pub name: RoleName,
    pub contact_uuid: Option<ContactId>,
    pub facility_uuid: Option<FacilityId>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Validated field values for creating a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDraft {
    pub name: RoleName,
    pub contact_uuid: Option<ContactId>,
    pub facility_uuid: Option<FacilityId>,
}
