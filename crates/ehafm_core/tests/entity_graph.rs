use ehafm_core::db::open_db_in_memory;
use ehafm_core::{
    AreaService, EntityService, ErrorKind, FacilityType, RoleName, SqliteAreaRepository,
    SqliteEntityRepository, ValidationRule,
};
use rusqlite::Connection;
use uuid::Uuid;

type Service<'conn> = EntityService<SqliteEntityRepository<'conn>, SqliteAreaRepository<'conn>>;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(conn: &Connection) -> Service<'_> {
    EntityService::new(
        SqliteEntityRepository::try_new(conn).unwrap(),
        AreaService::new(SqliteAreaRepository::try_new(conn).unwrap()),
    )
}

#[test]
fn create_facility_without_area() {
    let conn = setup();
    let service = service(&conn);

    let facility = service
        .create_facility("Central Store", "State Store", "  active ", None)
        .unwrap();

    assert_eq!(facility.facility_type, FacilityType::StateStore);
    assert_eq!(facility.status, "active");
    assert_eq!(facility.area_uuid, None);
    assert_eq!(service.list_facilities().unwrap(), vec![facility]);
}

#[test]
fn create_facility_rejects_unknown_type() {
    let conn = setup();
    let service = service(&conn);

    let err = service
        .create_facility("Depot", "Warehouse", "", None)
        .unwrap_err();
    assert_eq!(err.validation().unwrap().field, "facility_type");
    assert!(service.list_facilities().unwrap().is_empty());
}

#[test]
fn create_facility_rejects_missing_area() {
    let conn = setup();
    let service = service(&conn);
    let missing = Uuid::new_v4();

    let err = service
        .create_facility("Depot", "LGA Store", "", Some(missing))
        .unwrap_err();
    let validation = err.validation().unwrap();
    assert_eq!(validation.field, "area");
    assert_eq!(
        validation.rule,
        ValidationRule::UnknownReference { id: missing }
    );
    assert!(service.list_facilities().unwrap().is_empty());
}

#[test]
fn update_facility_keeps_area() {
    let conn = setup();
    let service = service(&conn);
    let area = service.areas().create_area("Lagos", "State", None).unwrap();
    let facility = service
        .create_facility("Old", "State Store", "", Some(area.uuid))
        .unwrap();

    let updated = service
        .update_facility(facility.uuid, "New", "Health Facility", "open")
        .unwrap();

    assert_eq!(updated.name, "New");
    assert_eq!(updated.facility_type, FacilityType::HealthFacility);
    assert_eq!(updated.status, "open");
    assert_eq!(updated.area_uuid, Some(area.uuid));
}

#[test]
fn set_facility_area_assigns_and_clears() {
    let conn = setup();
    let service = service(&conn);
    let area = service.areas().create_area("Kano", "State", None).unwrap();
    let facility = service
        .create_facility("Depot", "State Store", "", None)
        .unwrap();

    service
        .set_facility_area(facility.uuid, Some(area.uuid))
        .unwrap();
    assert_eq!(
        service.facilities_in_area(area.uuid).unwrap(),
        vec![service.get_facility(facility.uuid).unwrap().unwrap()]
    );

    service.set_facility_area(facility.uuid, None).unwrap();
    assert!(service.facilities_in_area(area.uuid).unwrap().is_empty());
}

#[test]
fn set_area_of_missing_facility_is_not_found() {
    let conn = setup();
    let service = service(&conn);

    let err = service
        .set_facility_area(Uuid::new_v4(), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn create_contact_with_optional_fields_blank() {
    let conn = setup();
    let service = service(&conn);

    let contact = service.create_contact("Ada", "", "").unwrap();

    assert_eq!(contact.phone, "");
    assert_eq!(contact.email, "");
    assert_eq!(service.contact_label(contact.uuid).unwrap(), "Ada");
}

#[test]
fn create_contact_rejects_invalid_fields() {
    let conn = setup();
    let service = service(&conn);

    let err = service.create_contact("", "", "").unwrap_err();
    assert_eq!(err.validation().unwrap().field, "name");

    let err = service.create_contact("Ada", "", "not-an-email").unwrap_err();
    let validation = err.validation().unwrap();
    assert_eq!(validation.field, "email");
    assert_eq!(validation.rule, ValidationRule::InvalidEmail);

    let long_phone = "1".repeat(33);
    let err = service.create_contact("Ada", &long_phone, "").unwrap_err();
    let validation = err.validation().unwrap();
    assert_eq!(validation.field, "phone");
    assert_eq!(validation.rule, ValidationRule::TooLong { max: 32 });

    assert!(service.list_contacts().unwrap().is_empty());
}

#[test]
fn update_contact_replaces_fields() {
    let conn = setup();
    let service = service(&conn);
    let contact = service.create_contact("Ada", "", "").unwrap();

    let updated = service
        .update_contact(contact.uuid, "Ada L.", "+234 800", "ada@example.org")
        .unwrap();

    assert_eq!(updated.name, "Ada L.");
    assert_eq!(updated.phone, "+234 800");
    assert_eq!(updated.email, "ada@example.org");
}

#[test]
fn create_role_with_and_without_references() {
    let conn = setup();
    let service = service(&conn);
    let contact = service.create_contact("Ada", "", "").unwrap();
    let facility = service
        .create_facility("Depot", "State Store", "", None)
        .unwrap();

    let bound = service
        .create_role("SCCO", Some(contact.uuid), Some(facility.uuid))
        .unwrap();
    let floating = service.create_role("WTO", None, None).unwrap();

    assert_eq!(bound.name, RoleName::Scco);
    assert_eq!(bound.contact_uuid, Some(contact.uuid));
    assert_eq!(bound.facility_uuid, Some(facility.uuid));
    assert_eq!(floating.contact_uuid, None);
    assert_eq!(service.list_roles().unwrap().len(), 2);
}

#[test]
fn create_role_rejects_unknown_name_and_missing_references() {
    let conn = setup();
    let service = service(&conn);

    let err = service.create_role("Boss", None, None).unwrap_err();
    assert_eq!(err.validation().unwrap().field, "name");

    let err = service
        .create_role("LIO", Some(Uuid::new_v4()), None)
        .unwrap_err();
    assert_eq!(err.validation().unwrap().field, "contact");

    let err = service
        .create_role("LIO", None, Some(Uuid::new_v4()))
        .unwrap_err();
    assert_eq!(err.validation().unwrap().field, "facility");

    assert!(service.list_roles().unwrap().is_empty());
}

#[test]
fn delete_contact_removes_its_roles_only() {
    let conn = setup();
    let service = service(&conn);
    let contact = service.create_contact("Ada", "", "").unwrap();
    let other = service.create_contact("Bola", "", "").unwrap();
    let facility = service
        .create_facility("Depot", "State Store", "", None)
        .unwrap();
    let doomed = service
        .create_role("SCCO", Some(contact.uuid), Some(facility.uuid))
        .unwrap();
    let kept = service
        .create_role("ZCCO", Some(other.uuid), Some(facility.uuid))
        .unwrap();

    let outcome = service.delete_contact(contact.uuid).unwrap();

    assert_eq!(outcome.deleted, 1);
    assert!(service.get_contact(contact.uuid).unwrap().is_none());
    assert!(service.get_role(doomed.uuid).unwrap().is_none());
    assert!(service.get_role(kept.uuid).unwrap().is_some());
    assert!(service.get_facility(facility.uuid).unwrap().is_some());
}

#[test]
fn delete_facility_removes_its_roles_and_keeps_contacts() {
    let conn = setup();
    let service = service(&conn);
    let contact = service.create_contact("Ada", "", "").unwrap();
    let facility = service
        .create_facility("Depot", "State Store", "", None)
        .unwrap();
    let role = service
        .create_role("HFIC", Some(contact.uuid), Some(facility.uuid))
        .unwrap();

    let outcome = service.delete_facility(facility.uuid).unwrap();

    assert_eq!(outcome.deleted, 1);
    assert!(service.get_role(role.uuid).unwrap().is_none());
    assert!(service.get_contact(contact.uuid).unwrap().is_some());
}

#[test]
fn delete_role_keeps_contact_and_facility() {
    let conn = setup();
    let service = service(&conn);
    let contact = service.create_contact("Ada", "", "").unwrap();
    let facility = service
        .create_facility("Depot", "State Store", "", None)
        .unwrap();
    let role = service
        .create_role("LIO", Some(contact.uuid), Some(facility.uuid))
        .unwrap();

    service.delete_role(role.uuid).unwrap();

    assert!(service.get_role(role.uuid).unwrap().is_none());
    assert!(service.get_contact(contact.uuid).unwrap().is_some());
    assert!(service.get_facility(facility.uuid).unwrap().is_some());

    let err = service.delete_role(role.uuid).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn reverse_associations_list_roles_by_contact_and_facility() {
    let conn = setup();
    let service = service(&conn);
    let contact = service.create_contact("Ada", "", "").unwrap();
    let first = service
        .create_facility("First", "State Store", "", None)
        .unwrap();
    let second = service
        .create_facility("Second", "LGA Store", "", None)
        .unwrap();
    let r1 = service
        .create_role("SCCO", Some(contact.uuid), Some(first.uuid))
        .unwrap();
    let r2 = service
        .create_role("LIO", Some(contact.uuid), Some(second.uuid))
        .unwrap();

    let by_contact: Vec<Uuid> = service
        .roles_for_contact(contact.uuid)
        .unwrap()
        .into_iter()
        .map(|role| role.uuid)
        .collect();
    assert_eq!(by_contact, vec![r1.uuid, r2.uuid]);

    let by_facility = service.roles_for_facility(second.uuid).unwrap();
    assert_eq!(by_facility.len(), 1);
    assert_eq!(by_facility[0].uuid, r2.uuid);

    let err = service.roles_for_contact(Uuid::new_v4()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn reassigning_role_references() {
    let conn = setup();
    let service = service(&conn);
    let contact = service.create_contact("Ada", "", "").unwrap();
    let facility = service
        .create_facility("Depot", "State Store", "", None)
        .unwrap();
    let role = service.create_role("WTO", None, None).unwrap();

    service.set_role_contact(role.uuid, Some(contact.uuid)).unwrap();
    service
        .set_role_facility(role.uuid, Some(facility.uuid))
        .unwrap();
    let stored = service.get_role(role.uuid).unwrap().unwrap();
    assert_eq!(stored.contact_uuid, Some(contact.uuid));
    assert_eq!(stored.facility_uuid, Some(facility.uuid));

    let err = service
        .set_role_contact(role.uuid, Some(Uuid::new_v4()))
        .unwrap_err();
    assert_eq!(err.validation().unwrap().field, "contact");

    service.set_role_facility(role.uuid, None).unwrap();
    assert_eq!(
        service.get_role(role.uuid).unwrap().unwrap().facility_uuid,
        None
    );
}

#[test]
fn facility_label_includes_status_and_area_path() {
    let conn = setup();
    let service = service(&conn);
    let area = service
        .areas()
        .create_area("Area 51", "State Zone", None)
        .unwrap();
    let facility = service
        .create_facility("Facility 0", "Zonal Store", "some status", Some(area.uuid))
        .unwrap();
    let bare = service
        .create_facility("Facility 1", "Zonal Store", "", None)
        .unwrap();

    assert_eq!(
        service.facility_label(facility.uuid).unwrap(),
        "Facility 0 [some status] in Area 51 (State Zone)"
    );
    assert_eq!(service.facility_label(bare.uuid).unwrap(), "Facility 1");
}

#[test]
fn contact_and_role_labels() {
    let conn = setup();
    let service = service(&conn);
    let contact = service.create_contact("Contact 0", "", "a@b.cc").unwrap();
    let facility = service
        .create_facility("Hyperion", "Health Facility", "status1", None)
        .unwrap();
    let role = service
        .create_role("SCCO", Some(contact.uuid), Some(facility.uuid))
        .unwrap();
    let unbound = service.create_role("LGA CCO", None, None).unwrap();

    assert_eq!(
        service.contact_label(contact.uuid).unwrap(),
        "Contact 0 <a@b.cc>"
    );
    assert_eq!(
        service.role_label(role.uuid).unwrap(),
        "SCCO @ Hyperion [status1]"
    );
    assert_eq!(service.role_label(unbound.uuid).unwrap(), "LGA CCO");
}

#[test]
fn failed_facility_delete_keeps_its_roles() {
    let conn = setup();
    let service = service(&conn);
    let contact = service.create_contact("Ada", "", "").unwrap();
    let facility = service
        .create_facility("Depot", "State Store", "", None)
        .unwrap();
    let role = service
        .create_role("SCCO", Some(contact.uuid), Some(facility.uuid))
        .unwrap();
    conn.execute_batch(
        "CREATE TRIGGER block_facility_delete BEFORE DELETE ON facilities
         BEGIN
             SELECT RAISE(ABORT, 'facility delete blocked');
         END;",
    )
    .unwrap();

    let err = service.delete_facility(facility.uuid).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(conn.is_autocommit());
    assert!(service.get_facility(facility.uuid).unwrap().is_some());
    let roles = service.roles_for_facility(facility.uuid).unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].uuid, role.uuid);
}

#[test]
fn failed_contact_delete_keeps_its_roles() {
    let conn = setup();
    let service = service(&conn);
    let contact = service.create_contact("Ada", "", "").unwrap();
    let role = service.create_role("LIO", Some(contact.uuid), None).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER block_contact_delete BEFORE DELETE ON contacts
         BEGIN
             SELECT RAISE(ABORT, 'contact delete blocked');
         END;",
    )
    .unwrap();

    let err = service.delete_contact(contact.uuid).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(conn.is_autocommit());
    assert!(service.get_contact(contact.uuid).unwrap().is_some());
    assert_eq!(
        service.get_role(role.uuid).unwrap().unwrap().contact_uuid,
        Some(contact.uuid)
    );
}
