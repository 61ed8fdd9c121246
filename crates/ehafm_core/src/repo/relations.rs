//! Delete policies for cross-record references.
//!
//! # Responsibility
//! - Declare, per referencing column, what happens when the referenced record
//!   is deleted.
//! - Apply those policies inside the caller's delete transaction.
//!
//! # Invariants
//! - Only roles are cascade-deleted; every other reference is cleared.
//! - Policies run before the primary delete so no row ever points at a
//!   deleted record (the schema's plain foreign keys reject that outcome).

use super::RepoResult;
use rusqlite::Connection;
use uuid::Uuid;

/// Fate of a referencing row when its target is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Referencing row survives with the column set to NULL.
    CascadeClear,
    /// Referencing row is deleted.
    CascadeDelete,
}

/// One referencing column and its policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub table: &'static str,
    pub column: &'static str,
    pub policy: DeletePolicy,
}

/// Rows referencing an area: child areas and located facilities.
pub const AREA_DEPENDENTS: &[Relation] = &[
    Relation {
        table: "areas",
        column: "parent_uuid",
        policy: DeletePolicy::CascadeClear,
    },
    Relation {
        table: "facilities",
        column: "area_uuid",
        policy: DeletePolicy::CascadeClear,
    },
];

/// Rows referencing a facility.
pub const FACILITY_DEPENDENTS: &[Relation] = &[Relation {
    table: "roles",
    column: "facility_uuid",
    policy: DeletePolicy::CascadeDelete,
}];

/// Rows referencing a contact.
pub const CONTACT_DEPENDENTS: &[Relation] = &[Relation {
    table: "roles",
    column: "contact_uuid",
    policy: DeletePolicy::CascadeDelete,
}];

/// Number of dependent rows touched by one delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Rows whose reference was cleared.
    pub cleared: usize,
    /// Rows deleted along with the target.
    pub deleted: usize,
}

impl CascadeOutcome {
    fn record(&mut self, policy: DeletePolicy, rows: usize) {
        match policy {
            DeletePolicy::CascadeClear => self.cleared += rows,
            DeletePolicy::CascadeDelete => self.deleted += rows,
        }
    }
}

/// Sets `relation.column` to NULL on every row referencing `target`.
pub fn cascade_clear(conn: &Connection, relation: &Relation, target: Uuid) -> RepoResult<usize> {
    let rows = conn.execute(
        &format!(
            "UPDATE {table}
             SET {column} = NULL,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE {column} = ?1;",
            table = relation.table,
            column = relation.column,
        ),
        [target.to_string()],
    )?;
    Ok(rows)
}

/// Deletes every row whose `relation.column` references `target`.
pub fn cascade_delete(conn: &Connection, relation: &Relation, target: Uuid) -> RepoResult<usize> {
    let rows = conn.execute(
        &format!(
            "DELETE FROM {table} WHERE {column} = ?1;",
            table = relation.table,
            column = relation.column,
        ),
        [target.to_string()],
    )?;
    Ok(rows)
}

/// Applies every policy in `relations` for `target`.
///
/// Must run inside the transaction that deletes `target`.
pub fn apply_delete_policies(
    conn: &Connection,
    relations: &[Relation],
    target: Uuid,
) -> RepoResult<CascadeOutcome> {
    let mut outcome = CascadeOutcome::default();
    for relation in relations {
        let rows = match relation.policy {
            DeletePolicy::CascadeClear => cascade_clear(conn, relation, target)?,
            DeletePolicy::CascadeDelete => cascade_delete(conn, relation, target)?,
        };
        outcome.record(relation.policy, rows);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::{DeletePolicy, AREA_DEPENDENTS, CONTACT_DEPENDENTS, FACILITY_DEPENDENTS};

    #[test]
    fn only_roles_are_cascade_deleted() {
        for relation in AREA_DEPENDENTS
            .iter()
            .chain(FACILITY_DEPENDENTS)
            .chain(CONTACT_DEPENDENTS)
        {
            let expected = if relation.table == "roles" {
                DeletePolicy::CascadeDelete
            } else {
                DeletePolicy::CascadeClear
            };
            assert_eq!(relation.policy, expected, "{}.{}", relation.table, relation.column);
        }
    }
}
