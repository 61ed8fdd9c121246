//! Facility, contact and role repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist facilities, contacts and roles.
//! - Validate cross-record references inside the writing transaction.
//! - Delete facilities and contacts together with their dependent roles.
//!
//! # Invariants
//! - `facilities.area_uuid`, `roles.contact_uuid` and `roles.facility_uuid`
//!   only ever reference existing rows.
//! - Deleting a role never touches its contact or facility.
//! - Listings are deterministic: insertion order.

use super::relations::{
    apply_delete_policies, CascadeOutcome, CONTACT_DEPENDENTS, FACILITY_DEPENDENTS,
};
use super::{
    ensure_connection_ready, ensure_exists, ensure_reference, parse_optional_uuid, parse_uuid,
    RepoError, RepoResult,
};
use crate::model::area::AreaId;
use crate::model::contact::{Contact, ContactDraft, ContactId};
use crate::model::facility::{Facility, FacilityDraft, FacilityId, FacilityType};
use crate::model::role::{Role, RoleDraft, RoleId, RoleName};
use crate::model::RecordKind;
use rusqlite::{params, Connection, Row, ToSql, Transaction, TransactionBehavior};
use uuid::Uuid;

const FACILITY_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    facility_type,
    status,
    area_uuid,
    created_at,
    updated_at
FROM facilities";

const CONTACT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    phone,
    email,
    created_at,
    updated_at
FROM contacts";

const ROLE_SELECT_SQL: &str = "SELECT
    uuid,
    role_name,
    contact_uuid,
    facility_uuid,
    created_at,
    updated_at
FROM roles";

const INSERTION_ORDER: &str = "ORDER BY created_at ASC, rowid ASC";

/// Repository interface for facilities, contacts and roles.
pub trait EntityRepository {
    /// Inserts one facility, optionally located in `area_uuid`.
    fn create_facility(
        &self,
        draft: &FacilityDraft,
        area_uuid: Option<AreaId>,
    ) -> RepoResult<Facility>;
    /// Loads one facility by id.
    fn get_facility(&self, facility_uuid: FacilityId) -> RepoResult<Option<Facility>>;
    /// Lists every facility.
    fn list_facilities(&self) -> RepoResult<Vec<Facility>>;
    /// Lists facilities located directly in `area_uuid`.
    fn list_facilities_in_area(&self, area_uuid: AreaId) -> RepoResult<Vec<Facility>>;
    /// Replaces name, type and status of one facility.
    fn update_facility(&self, facility_uuid: FacilityId, draft: &FacilityDraft)
        -> RepoResult<()>;
    /// Sets or clears the facility's area.
    fn set_facility_area(
        &self,
        facility_uuid: FacilityId,
        area_uuid: Option<AreaId>,
    ) -> RepoResult<()>;
    /// Deletes the facility and every role at it.
    fn delete_facility(&self, facility_uuid: FacilityId) -> RepoResult<CascadeOutcome>;

    /// Inserts one contact.
    fn create_contact(&self, draft: &ContactDraft) -> RepoResult<Contact>;
    /// Loads one contact by id.
    fn get_contact(&self, contact_uuid: ContactId) -> RepoResult<Option<Contact>>;
    /// Lists every contact.
    fn list_contacts(&self) -> RepoResult<Vec<Contact>>;
    /// Replaces name, phone and email of one contact.
    fn update_contact(&self, contact_uuid: ContactId, draft: &ContactDraft) -> RepoResult<()>;
    /// Deletes the contact and every role it holds.
    fn delete_contact(&self, contact_uuid: ContactId) -> RepoResult<CascadeOutcome>;

    /// Inserts one role.
    fn create_role(&self, draft: &RoleDraft) -> RepoResult<Role>;
    /// Loads one role by id.
    fn get_role(&self, role_uuid: RoleId) -> RepoResult<Option<Role>>;
    /// Lists every role.
    fn list_roles(&self) -> RepoResult<Vec<Role>>;
    /// Lists roles held by `contact_uuid`.
    fn list_roles_for_contact(&self, contact_uuid: ContactId) -> RepoResult<Vec<Role>>;
    /// Lists roles at `facility_uuid`.
    fn list_roles_for_facility(&self, facility_uuid: FacilityId) -> RepoResult<Vec<Role>>;
    /// Rebinds the role to another contact, or unbinds it.
    fn set_role_contact(&self, role_uuid: RoleId, contact_uuid: Option<ContactId>)
        -> RepoResult<()>;
    /// Rebinds the role to another facility, or unbinds it.
    fn set_role_facility(
        &self,
        role_uuid: RoleId,
        facility_uuid: Option<FacilityId>,
    ) -> RepoResult<()>;
    /// Deletes only the role.
    fn delete_role(&self, role_uuid: RoleId) -> RepoResult<()>;
}

/// SQLite-backed entity repository.
pub struct SqliteEntityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntityRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "facilities",
            &["uuid", "name", "facility_type", "status", "area_uuid"],
        )?;
        ensure_connection_ready(conn, "contacts", &["uuid", "name", "phone", "email"])?;
        ensure_connection_ready(
            conn,
            "roles",
            &["uuid", "role_name", "contact_uuid", "facility_uuid"],
        )?;
        Ok(Self { conn })
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl EntityRepository for SqliteEntityRepository<'_> {
    fn create_facility(
        &self,
        draft: &FacilityDraft,
        area_uuid: Option<AreaId>,
    ) -> RepoResult<Facility> {
        let facility_uuid = Uuid::new_v4();
        let tx = self.begin()?;
        ensure_reference(&tx, "area", RecordKind::Area, area_uuid)?;
        tx.execute(
            "INSERT INTO facilities (uuid, name, facility_type, status, area_uuid)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                facility_uuid.to_string(),
                draft.name.as_str(),
                draft.facility_type.as_str(),
                draft.status.as_str(),
                area_uuid.map(|value| value.to_string()),
            ],
        )?;
        let facility = query_one(
            &tx,
            FACILITY_SELECT_SQL,
            facility_uuid,
            parse_facility_row,
        )?
        .ok_or(RepoError::NotFound {
            kind: RecordKind::Facility,
            id: facility_uuid,
        })?;
        tx.commit()?;
        Ok(facility)
    }

    fn get_facility(&self, facility_uuid: FacilityId) -> RepoResult<Option<Facility>> {
        query_one(
            self.conn,
            FACILITY_SELECT_SQL,
            facility_uuid,
            parse_facility_row,
        )
    }

    fn list_facilities(&self) -> RepoResult<Vec<Facility>> {
        query_many(
            self.conn,
            &format!("{FACILITY_SELECT_SQL} {INSERTION_ORDER};"),
            &[],
            parse_facility_row,
        )
    }

    fn list_facilities_in_area(&self, area_uuid: AreaId) -> RepoResult<Vec<Facility>> {
        query_many(
            self.conn,
            &format!("{FACILITY_SELECT_SQL} WHERE area_uuid = ?1 {INSERTION_ORDER};"),
            &[&area_uuid.to_string()],
            parse_facility_row,
        )
    }

    fn update_facility(
        &self,
        facility_uuid: FacilityId,
        draft: &FacilityDraft,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE facilities
             SET name = ?2,
                 facility_type = ?3,
                 status = ?4,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                facility_uuid.to_string(),
                draft.name.as_str(),
                draft.facility_type.as_str(),
                draft.status.as_str(),
            ],
        )?;
        ensure_changed(changed, RecordKind::Facility, facility_uuid)
    }

    fn set_facility_area(
        &self,
        facility_uuid: FacilityId,
        area_uuid: Option<AreaId>,
    ) -> RepoResult<()> {
        let tx = self.begin()?;
        ensure_exists(&tx, RecordKind::Facility, facility_uuid)?;
        ensure_reference(&tx, "area", RecordKind::Area, area_uuid)?;
        tx.execute(
            "UPDATE facilities
             SET area_uuid = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                facility_uuid.to_string(),
                area_uuid.map(|value| value.to_string()),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_facility(&self, facility_uuid: FacilityId) -> RepoResult<CascadeOutcome> {
        let tx = self.begin()?;
        ensure_exists(&tx, RecordKind::Facility, facility_uuid)?;
        let outcome = apply_delete_policies(&tx, FACILITY_DEPENDENTS, facility_uuid)?;
        tx.execute(
            "DELETE FROM facilities WHERE uuid = ?1;",
            [facility_uuid.to_string()],
        )?;
        tx.commit()?;
        Ok(outcome)
    }

    fn create_contact(&self, draft: &ContactDraft) -> RepoResult<Contact> {
        let contact_uuid = Uuid::new_v4();
        let tx = self.begin()?;
        tx.execute(
            "INSERT INTO contacts (uuid, name, phone, email)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                contact_uuid.to_string(),
                draft.name.as_str(),
                draft.phone.as_str(),
                draft.email.as_str(),
            ],
        )?;
        let contact = query_one(&tx, CONTACT_SELECT_SQL, contact_uuid, parse_contact_row)?
            .ok_or(RepoError::NotFound {
                kind: RecordKind::Contact,
                id: contact_uuid,
            })?;
        tx.commit()?;
        Ok(contact)
    }

    fn get_contact(&self, contact_uuid: ContactId) -> RepoResult<Option<Contact>> {
        query_one(self.conn, CONTACT_SELECT_SQL, contact_uuid, parse_contact_row)
    }

    fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        query_many(
            self.conn,
            &format!("{CONTACT_SELECT_SQL} {INSERTION_ORDER};"),
            &[],
            parse_contact_row,
        )
    }

    fn update_contact(&self, contact_uuid: ContactId, draft: &ContactDraft) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE contacts
             SET name = ?2,
                 phone = ?3,
                 email = ?4,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                contact_uuid.to_string(),
                draft.name.as_str(),
                draft.phone.as_str(),
                draft.email.as_str(),
            ],
        )?;
        ensure_changed(changed, RecordKind::Contact, contact_uuid)
    }

    fn delete_contact(&self, contact_uuid: ContactId) -> RepoResult<CascadeOutcome> {
        let tx = self.begin()?;
        ensure_exists(&tx, RecordKind::Contact, contact_uuid)?;
        let outcome = apply_delete_policies(&tx, CONTACT_DEPENDENTS, contact_uuid)?;
        tx.execute(
            "DELETE FROM contacts WHERE uuid = ?1;",
            [contact_uuid.to_string()],
        )?;
        tx.commit()?;
        Ok(outcome)
    }

    fn create_role(&self, draft: &RoleDraft) -> RepoResult<Role> {
        let role_uuid = Uuid::new_v4();
        let tx = self.begin()?;
        ensure_reference(&tx, "contact", RecordKind::Contact, draft.contact_uuid)?;
        ensure_reference(&tx, "facility", RecordKind::Facility, draft.facility_uuid)?;
        tx.execute(
            "INSERT INTO roles (uuid, role_name, contact_uuid, facility_uuid)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                role_uuid.to_string(),
                draft.name.as_str(),
                draft.contact_uuid.map(|value| value.to_string()),
                draft.facility_uuid.map(|value| value.to_string()),
            ],
        )?;
        let role = query_one(&tx, ROLE_SELECT_SQL, role_uuid, parse_role_row)?.ok_or(
            RepoError::NotFound {
                kind: RecordKind::Role,
                id: role_uuid,
            },
        )?;
        tx.commit()?;
        Ok(role)
    }

    fn get_role(&self, role_uuid: RoleId) -> RepoResult<Option<Role>> {
        query_one(self.conn, ROLE_SELECT_SQL, role_uuid, parse_role_row)
    }

    fn list_roles(&self) -> RepoResult<Vec<Role>> {
        query_many(
            self.conn,
            &format!("{ROLE_SELECT_SQL} {INSERTION_ORDER};"),
            &[],
            parse_role_row,
        )
    }

    fn list_roles_for_contact(&self, contact_uuid: ContactId) -> RepoResult<Vec<Role>> {
        query_many(
            self.conn,
            &format!("{ROLE_SELECT_SQL} WHERE contact_uuid = ?1 {INSERTION_ORDER};"),
            &[&contact_uuid.to_string()],
            parse_role_row,
        )
    }

    fn list_roles_for_facility(&self, facility_uuid: FacilityId) -> RepoResult<Vec<Role>> {
        query_many(
            self.conn,
            &format!("{ROLE_SELECT_SQL} WHERE facility_uuid = ?1 {INSERTION_ORDER};"),
            &[&facility_uuid.to_string()],
            parse_role_row,
        )
    }

    fn set_role_contact(
        &self,
        role_uuid: RoleId,
        contact_uuid: Option<ContactId>,
    ) -> RepoResult<()> {
        let tx = self.begin()?;
        ensure_exists(&tx, RecordKind::Role, role_uuid)?;
        ensure_reference(&tx, "contact", RecordKind::Contact, contact_uuid)?;
        tx.execute(
            "UPDATE roles
             SET contact_uuid = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                role_uuid.to_string(),
                contact_uuid.map(|value| value.to_string()),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn set_role_facility(
        &self,
        role_uuid: RoleId,
        facility_uuid: Option<FacilityId>,
    ) -> RepoResult<()> {
        let tx = self.begin()?;
        ensure_exists(&tx, RecordKind::Role, role_uuid)?;
        ensure_reference(&tx, "facility", RecordKind::Facility, facility_uuid)?;
        tx.execute(
            "UPDATE roles
             SET facility_uuid = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                role_uuid.to_string(),
                facility_uuid.map(|value| value.to_string()),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_role(&self, role_uuid: RoleId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM roles WHERE uuid = ?1;", [role_uuid.to_string()])?;
        ensure_changed(changed, RecordKind::Role, role_uuid)
    }
}

fn ensure_changed(changed: usize, kind: RecordKind, id: Uuid) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound { kind, id });
    }
    Ok(())
}

fn query_one<T>(
    conn: &Connection,
    select_sql: &str,
    id: Uuid,
    parse: fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Option<T>> {
    let mut stmt = conn.prepare(&format!("{select_sql} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse(row)?));
    }
    Ok(None)
}

fn query_many<T>(
    conn: &Connection,
    sql: &str,
    bind: &[&dyn ToSql],
    parse: fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(bind)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }
    Ok(items)
}

fn parse_facility_row(row: &Row<'_>) -> RepoResult<Facility> {
    let uuid_text: String = row.get("uuid")?;
    let type_text: String = row.get("facility_type")?;
    let facility_type = FacilityType::parse("facility_type", &type_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid facility type `{type_text}` in facilities.facility_type"
        ))
    })?;

    Ok(Facility {
        uuid: parse_uuid(&uuid_text, "facilities.uuid")?,
        name: row.get("name")?,
        facility_type,
        status: row.get("status")?,
        area_uuid: parse_optional_uuid(row.get("area_uuid")?, "facilities.area_uuid")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Contact {
        uuid: parse_uuid(&uuid_text, "contacts.uuid")?,
        name: row.get("name")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_role_row(row: &Row<'_>) -> RepoResult<Role> {
    let uuid_text: String = row.get("uuid")?;
    let name_text: String = row.get("role_name")?;
    let name = RoleName::parse("role_name", &name_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid role name `{name_text}` in roles.role_name"))
    })?;

    Ok(Role {
        uuid: parse_uuid(&uuid_text, "roles.uuid")?,
        name,
        contact_uuid: parse_optional_uuid(row.get("contact_uuid")?, "roles.contact_uuid")?,
        facility_uuid: parse_optional_uuid(row.get("facility_uuid")?, "roles.facility_uuid")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
