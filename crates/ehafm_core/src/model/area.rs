//! Area domain model.
//!
//! # Invariants
//! - `parent_uuid`, when set, names an existing area.
//! - The parent chain is acyclic; an area is never its own ancestor.

use super::validation::{parse_choice, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable area identifier.
pub type AreaId = Uuid;

const AREA_TYPE_LABELS: &[&str] = &["State", "State Zone", "LGA", "Ward"];

/// Administrative level of an area, from widest to narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaType {
    #[serde(rename = "State")]
    State,
    #[serde(rename = "State Zone")]
    StateZone,
    #[serde(rename = "LGA")]
    Lga,
    #[serde(rename = "Ward")]
    Ward,
}

impl AreaType {
    pub const ALL: [AreaType; 4] = [Self::State, Self::StateZone, Self::Lga, Self::Ward];

    /// Canonical stored and displayed form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::State => "State",
            Self::StateZone => "State Zone",
            Self::Lga => "LGA",
            Self::Ward => "Ward",
        }
    }

    /// Parses the canonical form; anything else is rejected for `field`.
    pub fn parse(field: &'static str, value: &str) -> Result<Self, ValidationError> {
        let choices = Self::ALL.map(|kind| (kind.as_str(), kind));
        parse_choice(field, value, &choices, AREA_TYPE_LABELS)
    }
}

impl Display for AreaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the area hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub uuid: AreaId,
    pub name: String,
    #[serde(rename = "type")]
    pub area_type: AreaType,
    /// `None` means the area is a root.
    pub parent_uuid: Option<AreaId>,
    /// Epoch ms.
    pub created_at: i64,
    /// Epoch ms.
    pub updated_at: i64,
}

impl Area {
    pub fn is_root(&self) -> bool {
        self.parent_uuid.is_none()
    }
}
