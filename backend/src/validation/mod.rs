//! JSON Schema validation for facility records.
//!
//! Checks the shape of produced records only: a UUID `id`, a `properties`
//! object restricted to the mapped keys (integer fields may be `null`), and a
//! `geometry` that is either `null` or a two-number `Point`. Business values
//! such as status names are never judged here.
//!
//! The schema is embedded at compile time from
//! `schemas/facility-record.json`.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use facility_transform::validate_record;
//!
//! let record = json!({
//!     "id": "0b5a3f8e-9c1d-4e2f-8a7b-6c5d4e3f2a1b",
//!     "properties": { "company": "Li-Cycle", "jobs": null },
//!     "geometry": { "type": "Point", "coordinates": [-77.61, 43.16] }
//! });
//! assert!(validate_record(&record).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::{ValidationError, ValidationResult};
use crate::models::FacilityRecord;

static RECORD_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/facility-record.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a schema.
///
/// Returns every violation message when invalid.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick true/false check against a schema.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate one serialized record.
pub fn validate_record(data: &Value) -> Result<(), Vec<String>> {
    validate(&RECORD_SCHEMA, data)
}

/// Quick check of one serialized record.
pub fn is_valid_record(data: &Value) -> bool {
    is_valid(&RECORD_SCHEMA, data)
}

/// Validate a batch of records, compiling the schema once.
///
/// Returns `(index, errors)` for each invalid record; an empty vector means
/// every record conforms.
pub fn validate_records(records: &[FacilityRecord]) -> ValidationResult<Vec<(usize, Vec<String>)>> {
    let values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ValidationError::Schema(e.to_string()))?;
    validate_values(&values)
}

/// Validate serialized records, e.g. read back from a JSON file.
pub fn validate_values(values: &[Value]) -> ValidationResult<Vec<(usize, Vec<String>)>> {
    let validator = jsonschema::draft7::new(&RECORD_SCHEMA)
        .map_err(|e| ValidationError::Schema(e.to_string()))?;

    let failures = values
        .iter()
        .enumerate()
        .filter_map(|(i, value)| {
            let errors: Vec<String> = validator.iter_errors(value).map(|e| e.to_string()).collect();
            (!errors.is_empty()).then_some((i, errors))
        })
        .collect();

    Ok(failures)
}

/// Validate a JSON document that should hold an array of records.
pub fn validate_document(document: &Value) -> ValidationResult<Vec<(usize, Vec<String>)>> {
    match document.as_array() {
        Some(values) => validate_values(values),
        None => Err(ValidationError::NotAnArray),
    }
}
