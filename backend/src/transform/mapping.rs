//! Column mapping table
//!
//! Defines which source column feeds which property key, and how its text is
//! interpreted. The table order is the property order of every record: text
//! fields first, then integer fields.

use serde::Serialize;

/// How a mapped column's text is turned into a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Copied verbatim when non-empty, omitted otherwise.
    Text,
    /// Parsed as an integer when non-empty; `null` when unparsable.
    Integer,
}

/// One source column to property key rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    pub source: &'static str,
    pub target: &'static str,
    pub kind: FieldKind,
}

impl FieldMapping {
    const fn text(source: &'static str, target: &'static str) -> Self {
        Self { source, target, kind: FieldKind::Text }
    }

    const fn integer(source: &'static str, target: &'static str) -> Self {
        Self { source, target, kind: FieldKind::Integer }
    }
}

/// Every mapped column, in property order.
pub static FIELD_MAPPINGS: [FieldMapping; 14] = [
    FieldMapping::text("company_name", "company"),
    FieldMapping::text("city", "city"),
    FieldMapping::text("region_name", "region"),
    FieldMapping::text("country_name", "country"),
    FieldMapping::text("status_name", "status"),
    FieldMapping::text("status_effective_date_text", "status_effective_date"),
    FieldMapping::text("technology_name", "technology"),
    FieldMapping::text("technology_description", "technology_description"),
    FieldMapping::text("address", "address"),
    FieldMapping::text("notes", "notes"),
    FieldMapping::integer("processing_capacity_mt_year", "capacity_mt_year"),
    FieldMapping::integer("ev_equivalent_per_year", "ev_equivalent_per_year"),
    FieldMapping::integer("jobs", "jobs"),
    FieldMapping::integer("investment_usd", "investment_usd"),
];

/// Source column holding the latitude text.
pub const LATITUDE_COLUMN: &str = "latitude";

/// Source column holding the longitude text.
pub const LONGITUDE_COLUMN: &str = "longitude";

/// Mappings of the given kind, in property order.
pub fn fields_of(kind: FieldKind) -> impl Iterator<Item = &'static FieldMapping> {
    FIELD_MAPPINGS.iter().filter(move |m| m.kind == kind)
}

/// Property key for a source column, if the column is mapped.
pub fn target_for(source: &str) -> Option<&'static str> {
    FIELD_MAPPINGS
        .iter()
        .find(|m| m.source == source)
        .map(|m| m.target)
}

/// Human-readable listing of the mapping table.
pub fn mapping_description() -> String {
    let width = FIELD_MAPPINGS
        .iter()
        .map(|m| m.source.len())
        .max()
        .unwrap_or(0);

    let mut out = String::from("Text fields (kept when non-empty):\n");
    for m in fields_of(FieldKind::Text) {
        out.push_str(&format!("  {:width$} -> {}\n", m.source, m.target, width = width));
    }

    out.push_str("\nInteger fields (omitted when empty, null when unparsable):\n");
    for m in fields_of(FieldKind::Integer) {
        out.push_str(&format!("  {:width$} -> {}\n", m.source, m.target, width = width));
    }

    out.push_str(&format!(
        "\nGeometry: {} + {} -> Point [longitude, latitude]\n",
        LATITUDE_COLUMN, LONGITUDE_COLUMN
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::INPUT_COLUMNS;

    #[test]
    fn test_every_input_column_is_accounted_for() {
        for col in INPUT_COLUMNS {
            let mapped = target_for(col).is_some();
            let geo = col == LATITUDE_COLUMN || col == LONGITUDE_COLUMN;
            assert!(mapped ^ geo, "column {col} must be mapped or geometry, not both");
        }
    }

    #[test]
    fn test_renames() {
        assert_eq!(target_for("company_name"), Some("company"));
        assert_eq!(target_for("status_effective_date_text"), Some("status_effective_date"));
        assert_eq!(target_for("processing_capacity_mt_year"), Some("capacity_mt_year"));
        assert_eq!(target_for("latitude"), None);
    }

    #[test]
    fn test_text_fields_precede_integer_fields() {
        assert_eq!(fields_of(FieldKind::Text).count(), 10);
        assert_eq!(fields_of(FieldKind::Integer).count(), 4);

        let first_integer = FIELD_MAPPINGS
            .iter()
            .position(|m| m.kind == FieldKind::Integer)
            .unwrap();
        assert!(FIELD_MAPPINGS[first_integer..]
            .iter()
            .all(|m| m.kind == FieldKind::Integer));
    }

    #[test]
    fn test_description_lists_all_targets() {
        let desc = mapping_description();
        for m in FIELD_MAPPINGS {
            assert!(desc.contains(m.target));
        }
        assert!(desc.contains("Point"));
    }
}
