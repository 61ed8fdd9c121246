use ehafm_core::db::open_db_in_memory;
use ehafm_core::{
    AreaService, AttachmentOwner, AttachmentService, Document, EntityService, ErrorKind,
    SqliteAreaRepository, SqliteAttachmentRepository, SqliteEntityRepository, ValidationRule,
    MAX_DOCUMENT_DEPTH,
};
use rusqlite::Connection;
use std::collections::BTreeMap;
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn attachments(conn: &Connection) -> AttachmentService<SqliteAttachmentRepository<'_>> {
    AttachmentService::new(SqliteAttachmentRepository::try_new(conn).unwrap())
}

fn entities(
    conn: &Connection,
) -> EntityService<SqliteEntityRepository<'_>, SqliteAreaRepository<'_>> {
    EntityService::new(
        SqliteEntityRepository::try_new(conn).unwrap(),
        AreaService::new(SqliteAreaRepository::try_new(conn).unwrap()),
    )
}

#[test]
fn new_records_have_no_document() {
    let conn = setup();
    let entities = entities(&conn);
    let service = attachments(&conn);
    let facility = entities
        .create_facility("Depot", "State Store", "", None)
        .unwrap();

    let owner = AttachmentOwner::Facility(facility.uuid);
    assert_eq!(service.get_document(owner).unwrap(), None);
    assert_eq!(service.get_document_raw(owner).unwrap(), None);
}

#[test]
fn document_round_trips_structurally() {
    let conn = setup();
    let entities = entities(&conn);
    let service = attachments(&conn);
    let facility = entities
        .create_facility("Depot", "State Store", "", None)
        .unwrap();
    let owner = AttachmentOwner::Facility(facility.uuid);

    service
        .set_document(owner, Some(r#"{ "b": [true, null], "a": 1 }"#))
        .unwrap();

    let document = service.get_document(owner).unwrap().unwrap();
    let expected = Document::parse("json", r#"{"a":1,"b":[true,null]}"#)
        .unwrap()
        .unwrap();
    assert_eq!(document, expected);
    assert_eq!(
        service.get_document_raw(owner).unwrap().as_deref(),
        Some(r#"{"a":1,"b":[true,null]}"#)
    );
}

#[test]
fn malformed_document_is_rejected_and_previous_value_kept() {
    let conn = setup();
    let entities = entities(&conn);
    let service = attachments(&conn);
    let contact = entities.create_contact("Ada", "", "").unwrap();
    let owner = AttachmentOwner::Contact(contact.uuid);
    service.set_document(owner, Some(r#"{"kept":true}"#)).unwrap();

    let err = service.set_document(owner, Some("{ { } ")).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    let validation = err.validation().unwrap();
    assert_eq!(validation.field, "json");
    assert_eq!(validation.rule, ValidationRule::MalformedDocument);
    assert_eq!(validation.to_string(), "json: enter valid JSON");
    assert_eq!(
        service.get_document_raw(owner).unwrap().as_deref(),
        Some(r#"{"kept":true}"#)
    );
}

#[test]
fn blank_or_absent_input_clears_document() {
    let conn = setup();
    let entities = entities(&conn);
    let service = attachments(&conn);
    let contact = entities.create_contact("Ada", "", "").unwrap();
    let owner = AttachmentOwner::Contact(contact.uuid);

    service.set_document(owner, Some("[1, 2]")).unwrap();
    service.set_document(owner, Some("   ")).unwrap();
    assert_eq!(service.get_document(owner).unwrap(), None);

    service.set_document(owner, Some("\"note\"")).unwrap();
    service.set_document(owner, None).unwrap();
    assert_eq!(service.get_document(owner).unwrap(), None);

    service.set_document(owner, Some("42")).unwrap();
    service.clear_document(owner).unwrap();
    assert_eq!(service.get_document_raw(owner).unwrap(), None);
}

#[test]
fn structured_document_is_stored_canonically() {
    let conn = setup();
    let entities = entities(&conn);
    let service = attachments(&conn);
    let facility = entities
        .create_facility("Depot", "State Store", "", None)
        .unwrap();
    let owner = AttachmentOwner::Facility(facility.uuid);

    let mut members = BTreeMap::new();
    members.insert("zeta".to_string(), Document::Bool(false));
    members.insert("alpha".to_string(), Document::String("x".to_string()));
    service
        .set_document_value(owner, &Document::Object(members))
        .unwrap();

    assert_eq!(
        service.get_document_raw(owner).unwrap().as_deref(),
        Some(r#"{"alpha":"x","zeta":false}"#)
    );
}

#[test]
fn attachment_on_missing_owner_is_not_found() {
    let conn = setup();
    let service = attachments(&conn);
    let owner = AttachmentOwner::Facility(Uuid::new_v4());

    let err = service.set_document(owner, Some("{}")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = service.get_document(owner).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn documents_are_independent_per_owner() {
    let conn = setup();
    let entities = entities(&conn);
    let service = attachments(&conn);
    let facility = entities
        .create_facility("Depot", "State Store", "", None)
        .unwrap();
    let contact = entities.create_contact("Ada", "", "").unwrap();

    service
        .set_document(AttachmentOwner::Facility(facility.uuid), Some("[1]"))
        .unwrap();

    assert_eq!(
        service
            .get_document(AttachmentOwner::Contact(contact.uuid))
            .unwrap(),
        None
    );
}

#[test]
fn deeply_nested_documents_are_stored_up_to_the_depth_limit() {
    let conn = setup();
    let entities = entities(&conn);
    let service = attachments(&conn);
    let facility = entities
        .create_facility("Depot", "State Store", "", None)
        .unwrap();
    let owner = AttachmentOwner::Facility(facility.uuid);

    for depth in [127, 128, 129, MAX_DOCUMENT_DEPTH] {
        let raw = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        service.set_document(owner, Some(&raw)).unwrap();
        assert_eq!(service.get_document_raw(owner).unwrap(), Some(raw.clone()));
        assert!(service.get_document(owner).unwrap().is_some());
    }

    let too_deep = format!(
        "{}{}",
        "[".repeat(MAX_DOCUMENT_DEPTH + 1),
        "]".repeat(MAX_DOCUMENT_DEPTH + 1)
    );
    let err = service.set_document(owner, Some(&too_deep)).unwrap_err();
    assert_eq!(
        err.validation().unwrap().rule,
        ValidationRule::TooDeep {
            max: MAX_DOCUMENT_DEPTH
        }
    );
}
