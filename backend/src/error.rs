//! Error types for the facility transformation pipeline.
//!
//! The row transform itself never fails: numeric and coordinate coercion
//! problems are recorded as [`crate::transform::CoercionIssue`]s. The errors
//! here belong to the shell around it:
//!
//! - [`CsvError`] - reading and decoding the source table
//! - [`OutputError`] - serializing and writing the destination
//! - [`ValidationError`] - structural checks on produced records
//! - [`PipelineError`] - top-level orchestration
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CSV Reading Errors
// =============================================================================

/// Errors while reading the source table.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read the input file.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes could not be decoded with the detected encoding.
    #[error("Failed to decode input as {encoding}")]
    Encoding { encoding: String },

    /// Malformed CSV at a given record.
    #[error("Invalid CSV at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Delimiter is not a single-byte character.
    #[error("Unsupported delimiter '{0}': must be a single ASCII character")]
    Delimiter(char),
}

impl CsvError {
    pub(crate) fn from_csv(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        Self::Parse {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while writing transformed records.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Could not prepare the destination directory.
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the destination file.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error on an arbitrary writer.
    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors from structural record validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The embedded schema itself failed to compile.
    #[error("Invalid record schema: {0}")]
    Schema(String),

    /// One record violated the schema.
    #[error("Record {index} invalid: {}", errors.join("; "))]
    Record { index: usize, errors: Vec<String> },

    /// Input was not a JSON array of records.
    #[error("Expected a JSON array of records")]
    NotAnArray,
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// Returned by [`crate::transform::pipeline::transform_csv`] and friends.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Output error.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON error outside the writers (e.g. reading a records file).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error outside the reader and writers.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV reading.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;
