//! Core domain logic for facility and area management.
//! This crate owns the data model and every referential-integrity rule.

pub mod config;
pub mod db;
pub mod error;
pub mod label;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use logging::{default_log_level, init_logging, init_logging_with_config, logging_status};
pub use model::area::{Area, AreaId, AreaType};
pub use model::contact::{Contact, ContactId};
pub use model::document::{Document, Number, MAX_DOCUMENT_DEPTH};
pub use model::facility::{Facility, FacilityId, FacilityType};
pub use model::role::{Role, RoleId, RoleName};
pub use model::validation::{ValidationError, ValidationRule};
pub use model::RecordKind;
pub use repo::area_repo::{AreaRepository, SqliteAreaRepository};
pub use repo::attachment_repo::{AttachmentOwner, AttachmentRepository, SqliteAttachmentRepository};
pub use repo::entity_repo::{EntityRepository, SqliteEntityRepository};
pub use repo::relations::CascadeOutcome;
pub use repo::{RepoError, RepoResult};
pub use service::area_service::AreaService;
pub use service::attachment_service::AttachmentService;
pub use service::entity_service::EntityService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
