//! Area hierarchy use-case service.
//!
//! # Responsibility
//! - Validate area input and hierarchy invariants above the repository.
//! - Walk ancestry chains and render area labels.
//!
//! # Invariants
//! - A parent must exist when provided.
//! - Reparenting must not create a cycle.
//! - Deleting an area promotes its direct children to roots.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::label::area_label;
use crate::model::area::{Area, AreaId, AreaType};
use crate::model::validation::{require_text, ValidationError, ValidationRule};
use crate::model::RecordKind;
use crate::repo::area_repo::AreaRepository;
use crate::repo::relations::CascadeOutcome;
use log::{debug, info, warn};
use std::collections::HashSet;

/// Area hierarchy service facade.
pub struct AreaService<R: AreaRepository> {
    repo: R,
    max_ancestry_depth: usize,
}

impl<R: AreaRepository> AreaService<R> {
    /// Creates service with default configuration.
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, &CoreConfig::default())
    }

    /// Creates service using `config` traversal limits.
    pub fn with_config(repo: R, config: &CoreConfig) -> Self {
        Self {
            repo,
            max_ancestry_depth: config.max_ancestry_depth.max(1),
        }
    }

    /// Creates one childless area. Creation is not deduplicated: the same
    /// input twice yields two records.
    pub fn create_area(
        &self,
        name: &str,
        area_type: &str,
        parent_uuid: Option<AreaId>,
    ) -> CoreResult<Area> {
        let name = require_text("name", name)?;
        let area_type = AreaType::parse("area_type", area_type)?;
        let area = self.repo.create_area(&name, area_type, parent_uuid)?;
        info!(
            "event=area_create module=area status=ok area_uuid={} has_parent={}",
            area.uuid,
            parent_uuid.is_some()
        );
        Ok(area)
    }

    /// Loads one area by id.
    pub fn get_area(&self, area_uuid: AreaId) -> CoreResult<Option<Area>> {
        Ok(self.repo.get_area(area_uuid)?)
    }

    /// Lists every area in insertion order.
    pub fn list_areas(&self) -> CoreResult<Vec<Area>> {
        Ok(self.repo.list_areas()?)
    }

    /// Lists direct children of one area.
    pub fn children(&self, area_uuid: AreaId) -> CoreResult<Vec<Area>> {
        self.require_area(area_uuid)?;
        Ok(self.repo.list_children(Some(area_uuid))?)
    }

    /// Lists areas without a parent.
    pub fn roots(&self) -> CoreResult<Vec<Area>> {
        Ok(self.repo.list_children(None)?)
    }

    /// Renames and retypes one area. The parent pointer is left untouched.
    pub fn update_area(&self, area_uuid: AreaId, name: &str, area_type: &str) -> CoreResult<Area> {
        let name = require_text("name", name)?;
        let area_type = AreaType::parse("area_type", area_type)?;
        self.repo.update_area(area_uuid, &name, area_type)?;
        self.require_area(area_uuid)
    }

    /// Moves `area_uuid` under `new_parent_uuid`, or to the root level.
    ///
    /// # Errors
    /// - `NotFound` when the area does not exist.
    /// - `Validation` on field `parent` when the parent does not exist, is the
    ///   area itself, or is one of its descendants.
    /// - `Conflict` when a concurrent move made the change cyclic after the
    ///   check above passed.
    pub fn set_parent(&self, area_uuid: AreaId, new_parent_uuid: Option<AreaId>) -> CoreResult<()> {
        self.require_area(area_uuid)?;

        if let Some(parent_uuid) = new_parent_uuid {
            if parent_uuid == area_uuid || self.would_create_cycle(area_uuid, parent_uuid)? {
                return Err(ValidationError::new(
                    "parent",
                    ValidationRule::CycleDetected {
                        parent: parent_uuid,
                    },
                )
                .into());
            }
        }

        self.repo.set_parent(area_uuid, new_parent_uuid)?;
        info!(
            "event=area_set_parent module=area status=ok area_uuid={} has_parent={}",
            area_uuid,
            new_parent_uuid.is_some()
        );
        Ok(())
    }

    /// Deletes one area, promoting its children to roots and clearing the
    /// area of every facility located in it.
    pub fn delete_area(&self, area_uuid: AreaId) -> CoreResult<CascadeOutcome> {
        let outcome = self.repo.delete_area(area_uuid)?;
        info!(
            "event=area_delete module=area status=ok area_uuid={} cleared={}",
            area_uuid, outcome.cleared
        );
        Ok(outcome)
    }

    /// Returns the ancestors of `area_uuid`, root first.
    ///
    /// The walk stops at the first parentless area, after
    /// `max_ancestry_depth` ancestors, or on a revisit; the last collected
    /// ancestor is then treated as the root.
    pub fn ancestry_chain(&self, area_uuid: AreaId) -> CoreResult<Vec<Area>> {
        let area = self.require_area(area_uuid)?;
        self.ancestors_of(&area)
    }

    /// Renders `"{name} ({type} in {parent} in ...)"` for one area.
    pub fn area_label(&self, area_uuid: AreaId) -> CoreResult<String> {
        let area = self.require_area(area_uuid)?;
        let chain = self.ancestors_of(&area)?;
        Ok(area_label(&area, &chain))
    }

    /// Renders the label of an already-loaded area.
    pub fn label_for(&self, area: &Area) -> CoreResult<String> {
        let chain = self.ancestors_of(area)?;
        Ok(area_label(area, &chain))
    }

    fn ancestors_of(&self, area: &Area) -> CoreResult<Vec<Area>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([area.uuid]);
        let mut cursor = area.parent_uuid;

        while let Some(parent_uuid) = cursor {
            if chain.len() >= self.max_ancestry_depth {
                debug!(
                    "event=area_ancestry module=area status=truncated area_uuid={} depth={}",
                    area.uuid,
                    chain.len()
                );
                break;
            }
            if !visited.insert(parent_uuid) {
                warn!(
                    "event=area_ancestry module=area status=cycle area_uuid={} revisited={}",
                    area.uuid, parent_uuid
                );
                break;
            }
            let Some(parent) = self.repo.get_area(parent_uuid)? else {
                break;
            };
            cursor = parent.parent_uuid;
            chain.push(parent);
        }

        chain.reverse();
        Ok(chain)
    }

    fn would_create_cycle(
        &self,
        area_uuid: AreaId,
        candidate_parent_uuid: AreaId,
    ) -> CoreResult<bool> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent_uuid);
        while let Some(current) = cursor {
            if current == area_uuid || !visited.insert(current) {
                return Ok(true);
            }
            let node = self.repo.get_area(current)?.ok_or(ValidationError::new(
                "parent",
                ValidationRule::UnknownReference { id: current },
            ))?;
            cursor = node.parent_uuid;
        }
        Ok(false)
    }

    fn require_area(&self, area_uuid: AreaId) -> CoreResult<Area> {
        self.repo
            .get_area(area_uuid)?
            .ok_or(CoreError::NotFound {
                kind: RecordKind::Area,
                id: area_uuid,
            })
    }
}
