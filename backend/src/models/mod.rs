//! Domain models for the facility transformation pipeline.
//!
//! - [`FacilityRow`] - One raw source row (column name to raw text)
//! - [`FacilityRecord`] - One normalized output record
//! - [`PointGeometry`] - Longitude-first point attached to a record
//! - [`INPUT_COLUMNS`] / [`OUTPUT_COLUMNS`] - The fixed table headers

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

// =============================================================================
// Table Headers
// =============================================================================

/// Header of the source facility table.
pub const INPUT_COLUMNS: [&str; 16] = [
    "company_name",
    "city",
    "region_name",
    "country_name",
    "status_name",
    "status_effective_date_text",
    "processing_capacity_mt_year",
    "ev_equivalent_per_year",
    "jobs",
    "investment_usd",
    "technology_name",
    "technology_description",
    "address",
    "latitude",
    "longitude",
    "notes",
];

/// Header of the transformed table.
pub const OUTPUT_COLUMNS: [&str; 3] = ["id", "properties", "geometry"];

// =============================================================================
// Facility Row
// =============================================================================

/// A single source row: column name to raw text.
///
/// A column that is missing from the row and a column whose text is empty
/// are treated the same by the transform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityRow {
    values: HashMap<String, String>,
}

impl FacilityRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    /// Raw text for a column, possibly empty.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Raw text for a column, `None` when missing or empty.
    ///
    /// Whitespace-only text is non-empty and returned as-is.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a row from a JSON object.
    ///
    /// Strings are taken verbatim, numbers and booleans are rendered to text,
    /// `null` counts as a missing column. Returns `None` for non-objects.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let values = obj
            .iter()
            .filter_map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((k.clone(), text))
            })
            .collect();
        Some(Self { values })
    }
}

impl From<HashMap<String, String>> for FacilityRow {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FacilityRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// =============================================================================
// Point Geometry
// =============================================================================

/// Geometry type tag. Only points are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
}

/// A GeoJSON-style point, coordinates ordered `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: GeometryType,
    pub coordinates: [f64; 2],
}

impl PointGeometry {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: GeometryType::Point,
            coordinates: [longitude, latitude],
        }
    }
}

// =============================================================================
// Facility Record
// =============================================================================

/// One normalized facility record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    /// Synthetic identifier, unrelated to row content.
    pub id: Uuid,
    /// Non-empty text fields and numeric fields, in mapping order.
    pub properties: Map<String, Value>,
    /// Point location, `None` when coordinates were missing or unparsable.
    pub geometry: Option<PointGeometry>,
}

impl FacilityRecord {
    /// Compact JSON text of the properties object.
    pub fn properties_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.properties)
    }

    /// Compact JSON text of the geometry, `None` when absent.
    pub fn geometry_json(&self) -> serde_json::Result<Option<String>> {
        self.geometry
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
    }

    /// Render as a GeoJSON `Feature`.
    pub fn to_feature(&self) -> Value {
        json!({
            "type": "Feature",
            "id": self.id.to_string(),
            "properties": self.properties,
            "geometry": self.geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_filters_blank_and_missing() {
        let row = FacilityRow::new()
            .with("company_name", "Acme")
            .with("city", "")
            .with("notes", "  ");

        assert_eq!(row.non_empty("company_name"), Some("Acme"));
        assert_eq!(row.non_empty("city"), None);
        assert_eq!(row.non_empty("region_name"), None);
        assert_eq!(row.non_empty("notes"), Some("  "));
        assert_eq!(row.get("city"), Some(""));
    }

    #[test]
    fn test_row_from_json() {
        let row = FacilityRow::from_json(&json!({
            "company_name": "Li-Cycle",
            "jobs": 35,
            "address": null
        }))
        .unwrap();

        assert_eq!(row.get("company_name"), Some("Li-Cycle"));
        assert_eq!(row.get("jobs"), Some("35"));
        assert_eq!(row.get("address"), None);
        assert!(FacilityRow::from_json(&json!(["not", "an", "object"])).is_none());
    }

    #[test]
    fn test_point_serializes_longitude_first() {
        let point = PointGeometry::new(-77.61092, 43.16103);
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json, json!({"type": "Point", "coordinates": [-77.61092, 43.16103]}));
    }

    #[test]
    fn test_record_json_helpers() {
        let mut properties = Map::new();
        properties.insert("company".into(), json!("Acme"));
        properties.insert("jobs".into(), Value::Null);

        let record = FacilityRecord {
            id: Uuid::nil(),
            properties,
            geometry: None,
        };

        assert_eq!(record.properties_json().unwrap(), r#"{"company":"Acme","jobs":null}"#);
        assert_eq!(record.geometry_json().unwrap(), None);

        let feature = record.to_feature();
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"], Value::Null);
        assert_eq!(feature["id"], "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_record_roundtrips_through_serde() {
        let record = FacilityRecord {
            id: Uuid::from_u128(7),
            properties: Map::new(),
            geometry: Some(PointGeometry::new(1.5, 2.5)),
        };
        let text = serde_json::to_string(&record).unwrap();
        let back: FacilityRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }
}
