//! Area hierarchy repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist areas and their parent pointers.
//! - Compute child sets by index lookup on `parent_uuid`.
//! - Delete areas together with their cascade-clear dependents.
//!
//! # Invariants
//! - Child listing is deterministic: insertion order.
//! - `set_parent` re-checks acyclicity inside its own transaction.
//! - Deleting an area never deletes or reparents another area.

use super::relations::{apply_delete_policies, CascadeOutcome, AREA_DEPENDENTS};
use super::{
    ensure_connection_ready, ensure_exists, ensure_reference, parse_optional_uuid, parse_uuid,
    RepoError, RepoResult,
};
use crate::model::area::{Area, AreaId, AreaType};
use crate::model::RecordKind;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const AREA_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    area_type,
    parent_uuid,
    created_at,
    updated_at
FROM areas";

/// Repository interface for the area hierarchy.
pub trait AreaRepository {
    /// Inserts one childless area.
    fn create_area(
        &self,
        name: &str,
        area_type: AreaType,
        parent_uuid: Option<AreaId>,
    ) -> RepoResult<Area>;
    /// Loads one area by id.
    fn get_area(&self, area_uuid: AreaId) -> RepoResult<Option<Area>>;
    /// Lists every area in insertion order.
    fn list_areas(&self) -> RepoResult<Vec<Area>>;
    /// Lists direct children of `parent_uuid`, or root areas for `None`.
    fn list_children(&self, parent_uuid: Option<AreaId>) -> RepoResult<Vec<Area>>;
    /// Replaces name and type of one area.
    fn update_area(&self, area_uuid: AreaId, name: &str, area_type: AreaType) -> RepoResult<()>;
    /// Points `area_uuid` at `new_parent_uuid` (or makes it a root).
    fn set_parent(&self, area_uuid: AreaId, new_parent_uuid: Option<AreaId>) -> RepoResult<()>;
    /// Clears child parents and facility areas, then deletes the area.
    fn delete_area(&self, area_uuid: AreaId) -> RepoResult<CascadeOutcome>;
}

/// SQLite-backed area repository.
pub struct SqliteAreaRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAreaRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "areas",
            &[
                "uuid",
                "name",
                "area_type",
                "parent_uuid",
                "created_at",
                "updated_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl AreaRepository for SqliteAreaRepository<'_> {
    fn create_area(
        &self,
        name: &str,
        area_type: AreaType,
        parent_uuid: Option<AreaId>,
    ) -> RepoResult<Area> {
        let area_uuid = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_reference(&tx, "parent", RecordKind::Area, parent_uuid)?;
        tx.execute(
            "INSERT INTO areas (uuid, name, area_type, parent_uuid)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                area_uuid.to_string(),
                name,
                area_type.as_str(),
                parent_uuid.map(|value| value.to_string()),
            ],
        )?;
        let area = load_required_area(&tx, area_uuid)?;
        tx.commit()?;
        Ok(area)
    }

    fn get_area(&self, area_uuid: AreaId) -> RepoResult<Option<Area>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AREA_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([area_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_area_row(row)?));
        }
        Ok(None)
    }

    fn list_areas(&self) -> RepoResult<Vec<Area>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AREA_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut areas = Vec::new();
        while let Some(row) = rows.next()? {
            areas.push(parse_area_row(row)?);
        }
        Ok(areas)
    }

    fn list_children(&self, parent_uuid: Option<AreaId>) -> RepoResult<Vec<Area>> {
        let mut areas = Vec::new();
        match parent_uuid {
            Some(parent_uuid) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{AREA_SELECT_SQL}
                     WHERE parent_uuid = ?1
                     ORDER BY created_at ASC, rowid ASC;"
                ))?;
                let mut rows = stmt.query([parent_uuid.to_string()])?;
                while let Some(row) = rows.next()? {
                    areas.push(parse_area_row(row)?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "{AREA_SELECT_SQL}
                     WHERE parent_uuid IS NULL
                     ORDER BY created_at ASC, rowid ASC;"
                ))?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    areas.push(parse_area_row(row)?);
                }
            }
        }
        Ok(areas)
    }

    fn update_area(&self, area_uuid: AreaId, name: &str, area_type: AreaType) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE areas
             SET name = ?2,
                 area_type = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![area_uuid.to_string(), name, area_type.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: RecordKind::Area,
                id: area_uuid,
            });
        }
        Ok(())
    }

    fn set_parent(&self, area_uuid: AreaId, new_parent_uuid: Option<AreaId>) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_exists(&tx, RecordKind::Area, area_uuid)?;
        ensure_reference(&tx, "parent", RecordKind::Area, new_parent_uuid)?;

        if let Some(parent_uuid) = new_parent_uuid {
            if is_self_or_ancestor(&tx, area_uuid, parent_uuid)? {
                return Err(RepoError::Conflict(format!(
                    "area {area_uuid} is an ancestor of {parent_uuid}"
                )));
            }
        }

        tx.execute(
            "UPDATE areas
             SET parent_uuid = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                area_uuid.to_string(),
                new_parent_uuid.map(|value| value.to_string()),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_area(&self, area_uuid: AreaId) -> RepoResult<CascadeOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_exists(&tx, RecordKind::Area, area_uuid)?;

        let outcome = apply_delete_policies(&tx, AREA_DEPENDENTS, area_uuid)?;
        tx.execute("DELETE FROM areas WHERE uuid = ?1;", [area_uuid.to_string()])?;

        tx.commit()?;
        Ok(outcome)
    }
}

/// Returns whether the parent chain of `candidate`, itself included,
/// reaches `start`.
fn is_self_or_ancestor(conn: &Connection, start: AreaId, candidate: AreaId) -> RepoResult<bool> {
    // UNION (not UNION ALL) stops on a revisit, so a corrupt cycle cannot
    // make the walk diverge.
    let found: i64 = conn.query_row(
        "WITH RECURSIVE chain(uuid, parent_uuid) AS (
            SELECT uuid, parent_uuid
            FROM areas
            WHERE uuid = ?1
            UNION
            SELECT a.uuid, a.parent_uuid
            FROM areas a
            INNER JOIN chain c ON a.uuid = c.parent_uuid
        )
        SELECT EXISTS(SELECT 1 FROM chain WHERE uuid = ?2);",
        params![candidate.to_string(), start.to_string()],
        |row| row.get(0),
    )?;
    Ok(found == 1)
}

fn load_required_area(conn: &Connection, area_uuid: AreaId) -> RepoResult<Area> {
    let mut stmt = conn.prepare(&format!("{AREA_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([area_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_area_row(row);
    }
    Err(RepoError::NotFound {
        kind: RecordKind::Area,
        id: area_uuid,
    })
}

fn parse_area_row(row: &Row<'_>) -> RepoResult<Area> {
    let uuid_text: String = row.get("uuid")?;
    let type_text: String = row.get("area_type")?;
    let area_type = AreaType::parse("area_type", &type_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid area type `{type_text}` in areas.area_type"))
    })?;

    Ok(Area {
        uuid: parse_uuid(&uuid_text, "areas.uuid")?,
        name: row.get("name")?,
        area_type,
        parent_uuid: parse_optional_uuid(row.get("parent_uuid")?, "areas.parent_uuid")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
