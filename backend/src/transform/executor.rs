//! Row executor
//!
//! Applies the mapping table to facility rows. One row in, one record out,
//! with no state carried between rows apart from the id generator.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::ids::IdGenerator;
use super::mapping::{FieldKind, FIELD_MAPPINGS, LATITUDE_COLUMN, LONGITUDE_COLUMN};
use super::operations::{parse_coordinate, GeometryCoercion, IntegerCoercion};
use crate::models::{FacilityRecord, FacilityRow};

/// Result of executing the transform over a table
#[derive(Debug, Default)]
pub struct TransformResult {
    /// One record per input row, in input order
    pub records: Vec<FacilityRecord>,
    /// Field-level coercion problems, none of which dropped a row
    pub issues: Vec<CoercionIssue>,
}

/// What kind of coercion went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Integer column had text that is not an integer; stored as `null`.
    Integer,
    /// Latitude/longitude text is not a finite number; geometry omitted.
    Coordinate,
    /// Only one of latitude/longitude has text; geometry omitted.
    IncompleteCoordinates,
}

/// A non-fatal coercion problem in one field of one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionIssue {
    pub row: usize,
    pub column: String,
    pub value: String,
    pub kind: IssueKind,
}

/// Counts over a transform run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    pub records: usize,
    pub with_geometry: usize,
    pub integer_issues: usize,
    pub coordinate_issues: usize,
}

impl TransformResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every field coerced cleanly.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn stats(&self) -> TransformStats {
        let integer_issues = self
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::Integer)
            .count();

        TransformStats {
            records: self.records.len(),
            with_geometry: self.records.iter().filter(|r| r.geometry.is_some()).count(),
            integer_issues,
            coordinate_issues: self.issues.len() - integer_issues,
        }
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Transformed: {} records, {} with geometry, {} integer issues, {} coordinate issues",
            stats.records, stats.with_geometry, stats.integer_issues, stats.coordinate_issues
        )
    }
}

/// Transform a single row.
///
/// # Example
/// ```ignore
/// use facility_transform::{transform_row, FacilityRow, RandomIds};
///
/// let row = FacilityRow::new().with("company_name", "Acme").with("jobs", "35");
/// let record = transform_row(&row, &mut RandomIds);
/// assert_eq!(record.properties["jobs"], 35);
/// ```
pub fn transform_row<G: IdGenerator + ?Sized>(row: &FacilityRow, ids: &mut G) -> FacilityRecord {
    let mut issues = Vec::new();
    transform_row_collecting(row, 0, ids, &mut issues)
}

/// Transform every row, in order.
pub fn execute<G: IdGenerator + ?Sized>(rows: &[FacilityRow], ids: &mut G) -> TransformResult {
    let mut result = TransformResult::new();
    result.records.reserve(rows.len());

    for (row_idx, row) in rows.iter().enumerate() {
        let record = transform_row_collecting(row, row_idx, ids, &mut result.issues);
        result.records.push(record);
    }

    result
}

/// Execute on rows provided as HashMaps
pub fn execute_hashmap<G: IdGenerator + ?Sized>(
    rows: &[HashMap<String, String>],
    ids: &mut G,
) -> TransformResult {
    let rows: Vec<FacilityRow> = rows.iter().cloned().map(FacilityRow::from).collect();
    execute(&rows, ids)
}

/// Execute on rows provided as JSON objects.
///
/// A value that is not an object is treated as a row with no columns, so it
/// still yields a record.
pub fn execute_json<G: IdGenerator + ?Sized>(rows: &[Value], ids: &mut G) -> TransformResult {
    let rows: Vec<FacilityRow> = rows
        .iter()
        .map(|v| FacilityRow::from_json(v).unwrap_or_default())
        .collect();
    execute(&rows, ids)
}

fn transform_row_collecting<G: IdGenerator + ?Sized>(
    row: &FacilityRow,
    row_idx: usize,
    ids: &mut G,
    issues: &mut Vec<CoercionIssue>,
) -> FacilityRecord {
    let mut properties = Map::new();

    for mapping in &FIELD_MAPPINGS {
        let raw = row.non_empty(mapping.source);

        match mapping.kind {
            FieldKind::Text => {
                if let Some(text) = raw {
                    properties.insert(mapping.target.to_string(), Value::String(text.to_string()));
                }
            }
            FieldKind::Integer => {
                let coerced = IntegerCoercion::from_text(raw);
                if coerced == IntegerCoercion::Unparsable {
                    issues.push(CoercionIssue {
                        row: row_idx,
                        column: mapping.source.to_string(),
                        value: raw.unwrap_or_default().to_string(),
                        kind: IssueKind::Integer,
                    });
                }
                if let Some(value) = coerced.into_property() {
                    properties.insert(mapping.target.to_string(), value);
                }
            }
        }
    }

    let latitude = row.non_empty(LATITUDE_COLUMN);
    let longitude = row.non_empty(LONGITUDE_COLUMN);
    let geometry = GeometryCoercion::from_text(latitude, longitude);

    match geometry {
        GeometryCoercion::Unparsable => {
            for (column, value) in [(LATITUDE_COLUMN, latitude), (LONGITUDE_COLUMN, longitude)] {
                let value = value.unwrap_or_default();
                if parse_coordinate(value).is_none() {
                    issues.push(CoercionIssue {
                        row: row_idx,
                        column: column.to_string(),
                        value: value.to_string(),
                        kind: IssueKind::Coordinate,
                    });
                }
            }
        }
        GeometryCoercion::Incomplete => {
            let (column, value) = match latitude {
                Some(lat) => (LATITUDE_COLUMN, lat),
                None => (LONGITUDE_COLUMN, longitude.unwrap_or_default()),
            };
            issues.push(CoercionIssue {
                row: row_idx,
                column: column.to_string(),
                value: value.to_string(),
                kind: IssueKind::IncompleteCoordinates,
            });
        }
        GeometryCoercion::Missing | GeometryCoercion::Parsed(_) => {}
    }

    FacilityRecord {
        id: ids.next_id(),
        properties,
        geometry: geometry.into_geometry(),
    }
}
