//! Facility/contact/role use-case service.
//!
//! # Responsibility
//! - Validate entity input and normalize free-text fields.
//! - Orchestrate cascade deletes and report their effect.
//! - Render facility, contact and role labels, resolving area ancestry
//!   through the area service.
//!
//! # Invariants
//! - Enumerated fields accept only their declared choices.
//! - Deleting a contact or facility removes the roles bound to it.
//! - Deleting a role never removes its contact or facility.

use crate::error::{CoreError, CoreResult};
use crate::label::{contact_label, facility_label, role_label};
use crate::model::area::AreaId;
use crate::model::contact::{Contact, ContactDraft, ContactId};
use crate::model::facility::{Facility, FacilityDraft, FacilityId, FacilityType};
use crate::model::role::{Role, RoleDraft, RoleId, RoleName};
use crate::model::validation::{
    bounded_text, optional_email, require_text, ValidationError, PHONE_MAX_CHARS,
};
use crate::model::RecordKind;
use crate::repo::area_repo::AreaRepository;
use crate::repo::entity_repo::EntityRepository;
use crate::repo::relations::CascadeOutcome;
use crate::service::area_service::AreaService;
use log::info;
use uuid::Uuid;

/// Entity graph service facade.
pub struct EntityService<R: EntityRepository, A: AreaRepository> {
    repo: R,
    areas: AreaService<A>,
}

impl<R: EntityRepository, A: AreaRepository> EntityService<R, A> {
    /// Creates service from entity repository and the area service used for
    /// label rendering.
    pub fn new(repo: R, areas: AreaService<A>) -> Self {
        Self { repo, areas }
    }

    /// Area service shared by this entity service.
    pub fn areas(&self) -> &AreaService<A> {
        &self.areas
    }

    pub fn create_facility(
        &self,
        name: &str,
        facility_type: &str,
        status: &str,
        area_uuid: Option<AreaId>,
    ) -> CoreResult<Facility> {
        let draft = facility_draft(name, facility_type, status)?;
        let facility = self.repo.create_facility(&draft, area_uuid)?;
        info!(
            "event=facility_create module=entity status=ok facility_uuid={} has_area={}",
            facility.uuid,
            area_uuid.is_some()
        );
        Ok(facility)
    }

    pub fn get_facility(&self, facility_uuid: FacilityId) -> CoreResult<Option<Facility>> {
        Ok(self.repo.get_facility(facility_uuid)?)
    }

    pub fn list_facilities(&self) -> CoreResult<Vec<Facility>> {
        Ok(self.repo.list_facilities()?)
    }

    /// Lists facilities located directly in `area_uuid`.
    pub fn facilities_in_area(&self, area_uuid: AreaId) -> CoreResult<Vec<Facility>> {
        if self.areas.get_area(area_uuid)?.is_none() {
            return Err(CoreError::NotFound {
                kind: RecordKind::Area,
                id: area_uuid,
            });
        }
        Ok(self.repo.list_facilities_in_area(area_uuid)?)
    }

    /// Replaces name, type and status; the area is changed only through
    /// [`Self::set_facility_area`].
    pub fn update_facility(
        &self,
        facility_uuid: FacilityId,
        name: &str,
        facility_type: &str,
        status: &str,
    ) -> CoreResult<Facility> {
        let draft = facility_draft(name, facility_type, status)?;
        self.repo.update_facility(facility_uuid, &draft)?;
        self.require_facility(facility_uuid)
    }

    /// Sets or clears the facility's area. Roles are not affected.
    pub fn set_facility_area(
        &self,
        facility_uuid: FacilityId,
        area_uuid: Option<AreaId>,
    ) -> CoreResult<()> {
        self.repo.set_facility_area(facility_uuid, area_uuid)?;
        info!(
            "event=facility_set_area module=entity status=ok facility_uuid={} has_area={}",
            facility_uuid,
            area_uuid.is_some()
        );
        Ok(())
    }

    /// Deletes the facility and every role at it; contacts are kept.
    pub fn delete_facility(&self, facility_uuid: FacilityId) -> CoreResult<CascadeOutcome> {
        let outcome = self.repo.delete_facility(facility_uuid)?;
        info!(
            "event=facility_delete module=entity status=ok facility_uuid={} roles_deleted={}",
            facility_uuid, outcome.deleted
        );
        Ok(outcome)
    }

    pub fn create_contact(&self, name: &str, phone: &str, email: &str) -> CoreResult<Contact> {
        let draft = contact_draft(name, phone, email)?;
        let contact = self.repo.create_contact(&draft)?;
        info!(
            "event=contact_create module=entity status=ok contact_uuid={}",
            contact.uuid
        );
        Ok(contact)
    }

    pub fn get_contact(&self, contact_uuid: ContactId) -> CoreResult<Option<Contact>> {
        Ok(self.repo.get_contact(contact_uuid)?)
    }

    pub fn list_contacts(&self) -> CoreResult<Vec<Contact>> {
        Ok(self.repo.list_contacts()?)
    }

    pub fn update_contact(
        &self,
        contact_uuid: ContactId,
        name: &str,
        phone: &str,
        email: &str,
    ) -> CoreResult<Contact> {
        let draft = contact_draft(name, phone, email)?;
        self.repo.update_contact(contact_uuid, &draft)?;
        self.require_contact(contact_uuid)
    }

    /// Deletes the contact and every role it holds; facilities are kept.
    pub fn delete_contact(&self, contact_uuid: ContactId) -> CoreResult<CascadeOutcome> {
        let outcome = self.repo.delete_contact(contact_uuid)?;
        info!(
            "event=contact_delete module=entity status=ok contact_uuid={} roles_deleted={}",
            contact_uuid, outcome.deleted
        );
        Ok(outcome)
    }

    pub fn create_role(
        &self,
        name: &str,
        contact_uuid: Option<ContactId>,
        facility_uuid: Option<FacilityId>,
    ) -> CoreResult<Role> {
        let draft = RoleDraft {
            name: RoleName::parse("name", name)?,
            contact_uuid,
            facility_uuid,
        };
        let role = self.repo.create_role(&draft)?;
        info!(
            "event=role_create module=entity status=ok role_uuid={} has_contact={} has_facility={}",
            role.uuid,
            contact_uuid.is_some(),
            facility_uuid.is_some()
        );
        Ok(role)
    }

    pub fn get_role(&self, role_uuid: RoleId) -> CoreResult<Option<Role>> {
        Ok(self.repo.get_role(role_uuid)?)
    }

    pub fn list_roles(&self) -> CoreResult<Vec<Role>> {
        Ok(self.repo.list_roles()?)
    }

    /// Roles held by one contact.
    pub fn roles_for_contact(&self, contact_uuid: ContactId) -> CoreResult<Vec<Role>> {
        self.require_contact(contact_uuid)?;
        Ok(self.repo.list_roles_for_contact(contact_uuid)?)
    }

    /// Roles bound to one facility.
    pub fn roles_for_facility(&self, facility_uuid: FacilityId) -> CoreResult<Vec<Role>> {
        self.require_facility(facility_uuid)?;
        Ok(self.repo.list_roles_for_facility(facility_uuid)?)
    }

    pub fn set_role_contact(
        &self,
        role_uuid: RoleId,
        contact_uuid: Option<ContactId>,
    ) -> CoreResult<()> {
        Ok(self.repo.set_role_contact(role_uuid, contact_uuid)?)
    }

    pub fn set_role_facility(
        &self,
        role_uuid: RoleId,
        facility_uuid: Option<FacilityId>,
    ) -> CoreResult<()> {
        Ok(self.repo.set_role_facility(role_uuid, facility_uuid)?)
    }

    /// Deletes only the role.
    pub fn delete_role(&self, role_uuid: RoleId) -> CoreResult<()> {
        self.repo.delete_role(role_uuid)?;
        info!(
            "event=role_delete module=entity status=ok role_uuid={}",
            role_uuid
        );
        Ok(())
    }

    pub fn facility_label(&self, facility_uuid: FacilityId) -> CoreResult<String> {
        let facility = self.require_facility(facility_uuid)?;
        self.label_facility(&facility)
    }

    pub fn contact_label(&self, contact_uuid: ContactId) -> CoreResult<String> {
        let contact = self.require_contact(contact_uuid)?;
        Ok(contact_label(&contact))
    }

    pub fn role_label(&self, role_uuid: RoleId) -> CoreResult<String> {
        let role = self
            .repo
            .get_role(role_uuid)?
            .ok_or(not_found(RecordKind::Role, role_uuid))?;
        let facility_text = match role.facility_uuid {
            Some(facility_uuid) => Some(self.facility_label(facility_uuid)?),
            None => None,
        };
        Ok(role_label(&role, facility_text.as_deref()))
    }

    fn label_facility(&self, facility: &Facility) -> CoreResult<String> {
        let area_text = match facility.area_uuid {
            Some(area_uuid) => Some(self.areas.area_label(area_uuid)?),
            None => None,
        };
        Ok(facility_label(facility, area_text.as_deref()))
    }

    fn require_facility(&self, facility_uuid: FacilityId) -> CoreResult<Facility> {
        self.repo
            .get_facility(facility_uuid)?
            .ok_or(not_found(RecordKind::Facility, facility_uuid))
    }

    fn require_contact(&self, contact_uuid: ContactId) -> CoreResult<Contact> {
        self.repo
            .get_contact(contact_uuid)?
            .ok_or(not_found(RecordKind::Contact, contact_uuid))
    }
}

fn facility_draft(
    name: &str,
    facility_type: &str,
    status: &str,
) -> Result<FacilityDraft, ValidationError> {
    Ok(FacilityDraft {
        name: require_text("name", name)?,
        facility_type: FacilityType::parse("facility_type", facility_type)?,
        status: status.trim().to_string(),
    })
}

fn contact_draft(name: &str, phone: &str, email: &str) -> Result<ContactDraft, ValidationError> {
    Ok(ContactDraft {
        name: require_text("name", name)?,
        phone: bounded_text("phone", phone, PHONE_MAX_CHARS)?,
        email: optional_email("email", email)?,
    })
}

fn not_found(kind: RecordKind, id: Uuid) -> CoreError {
    CoreError::NotFound { kind, id }
}
