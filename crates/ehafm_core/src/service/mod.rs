//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Turn repository failures into [`crate::error::CoreError`] kinds.

pub mod area_service;
pub mod attachment_service;
pub mod entity_service;
