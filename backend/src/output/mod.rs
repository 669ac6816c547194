//! Writers for transformed facility records.
//!
//! The destination is always chosen by the caller. [`write_records_to_path`]
//! creates the destination's parent directory first; that step is idempotent.
//!
//! Formats:
//! - `csv` - three columns `id,properties,geometry`, JSON in the last two,
//!   empty `geometry` cell when a record has no point
//! - `geojson` - a `FeatureCollection`
//! - `json` - pretty array of records

use serde_json::{json, Value};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::{OutputError, OutputResult};
use crate::models::{FacilityRecord, OUTPUT_COLUMNS};

/// Serialized output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    GeoJson,
    Json,
}

impl OutputFormat {
    /// Guess the format from a file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("geojson") => Self::GeoJson,
            Some("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "geojson" => Ok(Self::GeoJson),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown output format '{}' (expected csv, geojson or json)",
                other
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Csv => "csv",
            Self::GeoJson => "geojson",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// Write records as the three-column table.
pub fn write_csv<W: Write>(writer: W, records: &[FacilityRecord]) -> OutputResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(OUTPUT_COLUMNS)?;

    for record in records {
        let id = record.id.to_string();
        let properties = record.properties_json()?;
        let geometry = record.geometry_json()?.unwrap_or_default();
        csv_writer.write_record([id.as_str(), properties.as_str(), geometry.as_str()])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Build a GeoJSON `FeatureCollection` value.
pub fn feature_collection(records: &[FacilityRecord]) -> Value {
    let features: Vec<Value> = records.iter().map(FacilityRecord::to_feature).collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Write records as a GeoJSON `FeatureCollection`.
pub fn write_geojson<W: Write>(mut writer: W, records: &[FacilityRecord]) -> OutputResult<()> {
    serde_json::to_writer_pretty(&mut writer, &feature_collection(records))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write records as a pretty JSON array.
pub fn write_json<W: Write>(mut writer: W, records: &[FacilityRecord]) -> OutputResult<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write records in the requested format.
pub fn write_records<W: Write>(
    writer: W,
    records: &[FacilityRecord],
    format: OutputFormat,
) -> OutputResult<()> {
    match format {
        OutputFormat::Csv => write_csv(writer, records),
        OutputFormat::GeoJson => write_geojson(writer, records),
        OutputFormat::Json => write_json(writer, records),
    }
}

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> OutputResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Write records to a file, creating its parent directory when missing.
pub fn write_records_to_path(
    path: &Path,
    records: &[FacilityRecord],
    format: OutputFormat,
) -> OutputResult<()> {
    ensure_parent_dir(path)?;

    let file = File::create(path).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    write_records(BufWriter::new(file), records, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PointGeometry;
    use serde_json::Map;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn sample() -> Vec<FacilityRecord> {
        let mut with_point = Map::new();
        with_point.insert("company".into(), json!("Li-Cycle"));
        with_point.insert("address".into(), json!("Ste 350, Rochester, NY 14652"));
        with_point.insert("jobs".into(), json!(35));

        let mut without_point = Map::new();
        without_point.insert("company".into(), json!("Ecobat"));
        without_point.insert("jobs".into(), Value::Null);

        vec![
            FacilityRecord {
                id: Uuid::from_u128(1),
                properties: with_point,
                geometry: Some(PointGeometry::new(-77.610924, 43.16103)),
            },
            FacilityRecord {
                id: Uuid::from_u128(2),
                properties: without_point,
                geometry: None,
            },
        ]
    }

    #[test]
    fn test_csv_layout() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &sample()).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers, OUTPUT_COLUMNS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "00000000-0000-0000-0000-000000000001");

        let properties: Value = serde_json::from_str(&rows[0][1]).unwrap();
        assert_eq!(properties["address"], "Ste 350, Rochester, NY 14652");

        let geometry: Value = serde_json::from_str(&rows[0][2]).unwrap();
        assert_eq!(geometry, json!({"type": "Point", "coordinates": [-77.610924, 43.16103]}));

        assert_eq!(&rows[1][2], "");
        assert_eq!(&rows[1][1], r#"{"company":"Ecobat","jobs":null}"#);
    }

    #[test]
    fn test_feature_collection() {
        let fc = feature_collection(&sample());
        assert_eq!(fc["type"], "FeatureCollection");
        assert_eq!(fc["features"].as_array().unwrap().len(), 2);
        assert_eq!(fc["features"][1]["geometry"], Value::Null);
        assert_eq!(fc["features"][0]["properties"]["jobs"], 35);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut buf = Vec::new();
        write_records(&mut buf, &sample(), OutputFormat::Json).unwrap();
        let back: Vec<FacilityRecord> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_write_to_path_creates_directory_idempotently() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("facilities_transformed.csv");

        write_records_to_path(&path, &sample(), OutputFormat::Csv).unwrap();
        write_records_to_path(&path, &sample(), OutputFormat::Csv).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("id,properties,geometry"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("GeoJSON".parse::<OutputFormat>().unwrap(), OutputFormat::GeoJson);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::from_path(Path::new("out/map.geojson")), OutputFormat::GeoJson);
        assert_eq!(OutputFormat::from_path(Path::new("out/table")), OutputFormat::Csv);
        assert_eq!(OutputFormat::GeoJson.to_string(), "geojson");
    }
}
