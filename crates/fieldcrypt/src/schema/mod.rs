//! Entity types and the field schema registry.
//!
//! # Module invariants
//!
//! - **No crypto dependencies.** This module must not import anything from
//!   `crate::crypto` or `crate::key`.
//! - The registry is fixed at build time; nothing mutates it at runtime.

pub mod entity;
pub mod registry;

pub use entity::{EntityType, UnknownEntityType};
pub use registry::{fields_for, FieldSet};
