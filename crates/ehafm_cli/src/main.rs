//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `ehafm_core` linkage.
//! - Given a database path, print the label of every stored record.
//!
//! Set `EHAFM_LOG_DIR` to write core logs to that directory.

use ehafm_core::db::open_db;
use ehafm_core::{AreaService, EntityService, SqliteAreaRepository, SqliteEntityRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("ehafm_core ping={}", ehafm_core::ping());
    println!("ehafm_core version={}", ehafm_core::core_version());

    if let Ok(log_dir) = std::env::var("EHAFM_LOG_DIR") {
        if let Err(err) = ehafm_core::init_logging(ehafm_core::default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match print_labels(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_list module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_labels(db_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let areas = AreaService::new(SqliteAreaRepository::try_new(&conn)?);
    let entities = EntityService::new(
        SqliteEntityRepository::try_new(&conn)?,
        AreaService::new(SqliteAreaRepository::try_new(&conn)?),
    );

    for area in areas.list_areas()? {
        println!("area\t{}\t{}", area.uuid, areas.label_for(&area)?);
    }
    for facility in entities.list_facilities()? {
        println!(
            "facility\t{}\t{}",
            facility.uuid,
            entities.facility_label(facility.uuid)?
        );
    }
    for contact in entities.list_contacts()? {
        println!(
            "contact\t{}\t{}",
            contact.uuid,
            entities.contact_label(contact.uuid)?
        );
    }
    for role in entities.list_roles()? {
        println!("role\t{}\t{}", role.uuid, entities.role_label(role.uuid)?);
    }
    Ok(())
}
