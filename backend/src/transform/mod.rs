//! Transformation module.
//!
//! Facility rows to normalized records:
//! - Mapping: source column to property key table
//! - Operations: integer and coordinate coercion
//! - Ids: record identifier generation
//! - Executor: per-row transform
//! - Pipeline: read, transform, validate, report

pub mod executor;
pub mod ids;
pub mod mapping;
pub mod operations;
pub mod pipeline;

pub use executor::*;
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use mapping::{mapping_description, FieldKind, FieldMapping, FIELD_MAPPINGS};
pub use pipeline::*;
