//! Attachment repository: raw document column on facilities and contacts.
//!
//! # Invariants
//! - The stored text is written by the attachment service only, already in
//!   canonical form.
//! - Writing a document never touches any other column except `updated_at`.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::contact::ContactId;
use crate::model::facility::FacilityId;
use crate::model::RecordKind;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

/// Record that owns an attached document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentOwner {
    Facility(FacilityId),
    Contact(ContactId),
}

impl AttachmentOwner {
    pub fn kind(self) -> RecordKind {
        match self {
            Self::Facility(_) => RecordKind::Facility,
            Self::Contact(_) => RecordKind::Contact,
        }
    }

    pub fn id(self) -> Uuid {
        match self {
            Self::Facility(id) | Self::Contact(id) => id,
        }
    }
}

/// Repository interface for attached documents.
pub trait AttachmentRepository {
    /// Reads the stored document text; `Ok(None)` when no document is set.
    fn read_document(&self, owner: AttachmentOwner) -> RepoResult<Option<String>>;
    /// Replaces (or with `None`, removes) the stored document text.
    fn write_document(&self, owner: AttachmentOwner, document: Option<&str>) -> RepoResult<()>;
}

/// SQLite-backed attachment repository.
pub struct SqliteAttachmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttachmentRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "facilities", &["uuid", "document"])?;
        ensure_connection_ready(conn, "contacts", &["uuid", "document"])?;
        Ok(Self { conn })
    }
}

impl AttachmentRepository for SqliteAttachmentRepository<'_> {
    fn read_document(&self, owner: AttachmentOwner) -> RepoResult<Option<String>> {
        let stored: Option<Option<String>> = self
            .conn
            .query_row(
                &format!(
                    "SELECT document FROM {} WHERE uuid = ?1;",
                    owner.kind().table()
                ),
                [owner.id().to_string()],
                |row| row.get(0),
            )
            .optional()?;

        stored.ok_or(RepoError::NotFound {
            kind: owner.kind(),
            id: owner.id(),
        })
    }

    fn write_document(&self, owner: AttachmentOwner, document: Option<&str>) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET document = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                owner.kind().table()
            ),
            params![owner.id().to_string(), document],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: owner.kind(),
                id: owner.id(),
            });
        }
        Ok(())
    }
}
