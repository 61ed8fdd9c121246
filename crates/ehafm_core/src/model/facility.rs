//! Facility domain model.

use super::area::AreaId;
use super::validation::{parse_choice, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable facility identifier.
pub type FacilityId = Uuid;

const FACILITY_TYPE_LABELS: &[&str] = &["State Store", "Zonal Store", "LGA Store", "Health Facility"];

/// Kind of site a facility record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacilityType {
    #[serde(rename = "State Store")]
    StateStore,
    #[serde(rename = "Zonal Store")]
    ZonalStore,
    #[serde(rename = "LGA Store")]
    LgaStore,
    #[serde(rename = "Health Facility")]
    HealthFacility,
}

impl FacilityType {
    pub const ALL: [FacilityType; 4] = [
        Self::StateStore,
        Self::ZonalStore,
        Self::LgaStore,
        Self::HealthFacility,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StateStore => "State Store",
            Self::ZonalStore => "Zonal Store",
            Self::LgaStore => "LGA Store",
            Self::HealthFacility => "Health Facility",
        }
    }

    pub fn parse(field: &'static str, value: &str) -> Result<Self, ValidationError> {
        let choices = Self::ALL.map(|kind| (kind.as_str(), kind));
        parse_choice(field, value, &choices, FACILITY_TYPE_LABELS)
    }
}

impl Display for FacilityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical store or health facility, optionally located in an area.
///
/// The attached document lives in the same row but is read and written only
/// through the attachment store, so it is not part of this read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub uuid: FacilityId,
    pub name: String,
    #[serde(rename = "type")]
    pub facility_type: FacilityType,
    /// Free text; empty when unknown.
    pub status: String,
    /// Cleared when the referenced area is deleted.
    pub area_uuid: Option<AreaId>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Validated field values for creating or editing a facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityDraft {
    pub name: String,
    pub facility_type: FacilityType,
    pub status: String,
}
