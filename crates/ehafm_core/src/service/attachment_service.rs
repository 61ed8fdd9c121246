//! Attachment use-case service.
//!
//! # Responsibility
//! - Validate raw document input before it reaches storage.
//! - Store documents in canonical form and hand them back structured.
//!
//! # Invariants
//! - Malformed input never replaces an existing document.
//! - Blank input clears the document.

use crate::error::CoreResult;
use crate::model::document::Document;
use crate::model::validation::{ValidationError, ValidationRule};
use crate::repo::attachment_repo::{AttachmentOwner, AttachmentRepository};
use log::{info, warn};

const DOCUMENT_FIELD: &str = "json";

/// Attachment service facade.
pub struct AttachmentService<R: AttachmentRepository> {
    repo: R,
}

impl<R: AttachmentRepository> AttachmentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates `raw` and stores it on `owner`.
    ///
    /// `None` or blank text removes the document. Invalid JSON fails with a
    /// validation error on field `json` and leaves the stored value as is.
    pub fn set_document(&self, owner: AttachmentOwner, raw: Option<&str>) -> CoreResult<()> {
        let parsed = match raw {
            Some(raw) => Document::parse(DOCUMENT_FIELD, raw).inspect_err(|_| {
                warn!(
                    "event=document_set module=attachment status=rejected owner_kind={} owner_uuid={}",
                    owner.kind(),
                    owner.id()
                );
            })?,
            None => None,
        };
        self.store(owner, parsed.as_ref())
    }

    /// Stores an already-structured document.
    pub fn set_document_value(&self, owner: AttachmentOwner, document: &Document) -> CoreResult<()> {
        self.store(owner, Some(document))
    }

    /// Removes the document from `owner`.
    pub fn clear_document(&self, owner: AttachmentOwner) -> CoreResult<()> {
        self.store(owner, None)
    }

    /// Returns the structured document, or `None` when none is attached.
    pub fn get_document(&self, owner: AttachmentOwner) -> CoreResult<Option<Document>> {
        let Some(stored) = self.repo.read_document(owner)? else {
            return Ok(None);
        };
        let document = Document::parse(DOCUMENT_FIELD, &stored)?
            .ok_or(ValidationError::new(DOCUMENT_FIELD, ValidationRule::MalformedDocument))?;
        Ok(Some(document))
    }

    /// Returns the stored canonical text.
    pub fn get_document_raw(&self, owner: AttachmentOwner) -> CoreResult<Option<String>> {
        Ok(self.repo.read_document(owner)?)
    }

    fn store(&self, owner: AttachmentOwner, document: Option<&Document>) -> CoreResult<()> {
        let canonical = document.map(Document::to_canonical_string);
        self.repo.write_document(owner, canonical.as_deref())?;
        info!(
            "event=document_set module=attachment status=ok owner_kind={} owner_uuid={} has_document={}",
            owner.kind(),
            owner.id(),
            canonical.is_some()
        );
        Ok(())
    }
}
