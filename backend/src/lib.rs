//! # Facility Transform - battery-recycling facility table normalization
//!
//! Turns a facility table (one row per site: company, location, status,
//! capacity, technology, coordinates) into records of the form
//! `{ id, properties, geometry }` ready for storage or mapping.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│   Output    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (row→record)│     │ (csv/json)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use facility_transform::{transform_csv, TransformOptions};
//!
//! fn main() {
//!     let result = transform_csv("facilities.csv".as_ref(), TransformOptions::default()).unwrap();
//!     println!("Transformed {} facilities", result.records.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Rows, records, point geometry
//! - [`parser`] - CSV reading with auto-detection
//! - [`transform`] - Mapping, coercion, ids, pipeline
//! - [`output`] - CSV / GeoJSON / JSON writers
//! - [`validation`] - Record schema validation
//! - [`logs`] - Logging helpers

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Reading
pub mod parser;

// Transformation
pub mod transform;

// Writing
pub mod output;

// Validation
pub mod validation;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, OutputError, PipelineError, ValidationError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    FacilityRecord, FacilityRow, GeometryType, PointGeometry, INPUT_COLUMNS, OUTPUT_COLUMNS,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    csv_to_rows,
    parse_csv,
    parse_csv_file_with,
    parse_bytes_auto,
    parse_bytes_with,
    detect_encoding,
    detect_delimiter,
    decode_content,
    ParseResult,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    execute,
    execute_hashmap,
    execute_json,
    transform_row,
    mapping_description,
    CoercionIssue,
    IssueKind,
    TransformResult,
    TransformStats,
    FieldKind,
    FieldMapping,
    FIELD_MAPPINGS,
    IdGenerator,
    RandomIds,
    SequentialIds,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    transform_csv,
    transform_csv_with_ids,
    transform_bytes,
    transform_bytes_with_ids,
    transform_rows,
    transform_rows_with_ids,
    TransformOptions,
    PipelineResult,
    CsvInfo,
};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use output::{
    write_records,
    write_records_to_path,
    write_csv,
    write_geojson,
    write_json,
    feature_collection,
    ensure_parent_dir,
    OutputFormat,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    is_valid,
    validate,
    is_valid_record,
    validate_record,
    validate_records,
    validate_values,
    validate_document,
};
