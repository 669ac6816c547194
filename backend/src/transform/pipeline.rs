//! High-level pipeline API for facility table transformation.
//!
//! Combines reading, row transformation, structural validation and
//! reporting. Writing stays with the caller (see [`crate::output`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use facility_transform::{transform_csv, write_records_to_path, OutputFormat, TransformOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let result = transform_csv(Path::new("facilities.csv"), TransformOptions::default())?;
//!     write_records_to_path(
//!         Path::new("data/facilities_transformed.csv"),
//!         &result.records,
//!         OutputFormat::Csv,
//!     )?;
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::executor::{execute, CoercionIssue, IssueKind, TransformStats};
use super::ids::{IdGenerator, RandomIds};
use crate::error::PipelineError;
use crate::logs::{
    log_error, log_info, log_info_indent, log_success, log_warning, log_warning_indent,
};
use crate::models::{FacilityRecord, FacilityRow};
use crate::parser::{parse_bytes_with, parse_csv_file_with, ParseResult};
use crate::validation::validate_records;

/// How many individual issues are logged before summarising.
const MAX_LOGGED_ISSUES: usize = 5;

/// Options for the transformation pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Force a delimiter instead of auto-detecting it
    #[serde(default)]
    pub delimiter: Option<char>,

    /// Skip structural validation of produced records
    #[serde(default)]
    pub skip_validation: bool,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// One record per input row, in input order
    pub records: Vec<FacilityRecord>,

    /// Non-fatal coercion problems
    pub issues: Vec<CoercionIssue>,

    /// Counts over the run
    pub stats: TransformStats,

    /// Records failing the structural schema (record index, errors)
    pub validation_errors: Vec<(usize, Vec<String>)>,

    /// Input table metadata
    pub csv_info: CsvInfo,
}

/// Input table information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
    pub missing_columns: Vec<String>,
    pub unknown_columns: Vec<String>,
}

impl CsvInfo {
    fn from_parse(parse_result: &ParseResult) -> Self {
        Self {
            encoding: parse_result.encoding.clone(),
            delimiter: parse_result.delimiter,
            headers: parse_result.headers.clone(),
            row_count: parse_result.rows.len(),
            missing_columns: parse_result
                .missing_columns()
                .into_iter()
                .map(str::to_string)
                .collect(),
            unknown_columns: parse_result
                .unknown_columns()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Transform a facility CSV file.
///
/// Steps:
/// 1. Read the file, detecting encoding and delimiter
/// 2. Transform every row into a record with a random id
/// 3. Validate record structure (unless skipped)
pub fn transform_csv(
    path: &Path,
    options: TransformOptions,
) -> Result<PipelineResult, PipelineError> {
    transform_csv_with_ids(path, options, &mut RandomIds)
}

/// Same as [`transform_csv`] with a caller-supplied id generator.
pub fn transform_csv_with_ids<G: IdGenerator + ?Sized>(
    path: &Path,
    options: TransformOptions,
    ids: &mut G,
) -> Result<PipelineResult, PipelineError> {
    log_info(format!("📖 Reading {}", path.display()));
    let parse_result = parse_csv_file_with(path, options.delimiter)?;
    transform_parsed(parse_result, &options, ids)
}

/// Transform CSV bytes.
pub fn transform_bytes(
    bytes: &[u8],
    options: TransformOptions,
) -> Result<PipelineResult, PipelineError> {
    transform_bytes_with_ids(bytes, options, &mut RandomIds)
}

/// Same as [`transform_bytes`] with a caller-supplied id generator.
pub fn transform_bytes_with_ids<G: IdGenerator + ?Sized>(
    bytes: &[u8],
    options: TransformOptions,
    ids: &mut G,
) -> Result<PipelineResult, PipelineError> {
    log_info("📖 Reading CSV input...");
    let parse_result = parse_bytes_with(bytes, options.delimiter)?;
    transform_parsed(parse_result, &options, ids)
}

/// Transform rows already held in memory.
pub fn transform_rows(
    rows: Vec<FacilityRow>,
    headers: Vec<String>,
    options: TransformOptions,
) -> Result<PipelineResult, PipelineError> {
    transform_rows_with_ids(rows, headers, options, &mut RandomIds)
}

/// Same as [`transform_rows`] with a caller-supplied id generator.
pub fn transform_rows_with_ids<G: IdGenerator + ?Sized>(
    rows: Vec<FacilityRow>,
    headers: Vec<String>,
    options: TransformOptions,
    ids: &mut G,
) -> Result<PipelineResult, PipelineError> {
    let parse_result = ParseResult {
        rows,
        encoding: "utf-8".to_string(),
        delimiter: options.delimiter.unwrap_or(','),
        headers,
    };
    transform_parsed(parse_result, &options, ids)
}

fn transform_parsed<G: IdGenerator + ?Sized>(
    parse_result: ParseResult,
    options: &TransformOptions,
    ids: &mut G,
) -> Result<PipelineResult, PipelineError> {
    let csv_info = CsvInfo::from_parse(&parse_result);
    print_csv_info(&csv_info);

    log_info("⚙️  Transforming rows...");
    let result = execute(&parse_result.rows, ids);
    let stats = result.stats();
    debug!(
        rows = csv_info.row_count,
        records = stats.records,
        summary = %result.summary(),
        "row transform finished"
    );
    print_transform_result(&stats, &result.issues);

    let validation_errors = if options.skip_validation {
        log_info("(validation skipped)");
        Vec::new()
    } else {
        log_info("✔️  Validating records...");
        let errors = validate_records(&result.records)?;
        print_validation_result(result.records.len(), &errors);
        errors
    };

    Ok(PipelineResult {
        records: result.records,
        issues: result.issues,
        stats,
        validation_errors,
        csv_info,
    })
}

fn print_csv_info(info: &CsvInfo) {
    log_success(format!("Encoding: {}", info.encoding));
    log_success(format!("Delimiter: '{}'", format_delimiter(info.delimiter)));
    log_success(format!("Read {} rows", info.row_count));

    if info.row_count == 0 {
        log_warning("Input has no data rows");
    }
    if !info.headers.is_empty() && !info.missing_columns.is_empty() {
        log_warning(format!(
            "{} expected column(s) missing, treated as empty: {}",
            info.missing_columns.len(),
            info.missing_columns.join(", ")
        ));
    }
    if !info.unknown_columns.is_empty() {
        log_info(format!("Ignoring unmapped column(s): {}", info.unknown_columns.join(", ")));
    }
}

fn print_transform_result(stats: &TransformStats, issues: &[CoercionIssue]) {
    log_success(format!(
        "Generated {} records ({} with geometry)",
        stats.records, stats.with_geometry
    ));

    if issues.is_empty() {
        return;
    }

    log_warning(format!(
        "{} field(s) could not be coerced ({} integer, {} coordinate)",
        issues.len(),
        stats.integer_issues,
        stats.coordinate_issues
    ));

    // Group by column so repeated failures read as one line
    let mut by_column: BTreeMap<(&str, IssueKind), Vec<usize>> = BTreeMap::new();
    for issue in issues {
        by_column
            .entry((issue.column.as_str(), issue.kind))
            .or_default()
            .push(issue.row);
    }

    for ((column, kind), rows) in by_column.iter().take(MAX_LOGGED_ISSUES) {
        let sample: Vec<String> = rows.iter().take(5).map(|r| r.to_string()).collect();
        let more = if rows.len() > 5 {
            format!("... +{}", rows.len() - 5)
        } else {
            String::new()
        };
        let outcome = match kind {
            IssueKind::Integer => "stored as null",
            IssueKind::Coordinate => "geometry omitted",
            IssueKind::IncompleteCoordinates => "other coordinate missing, geometry omitted",
        };
        log_warning_indent(
            format!("• {} {} (rows: {}{})", column, outcome, sample.join(", "), more),
            1,
        );
    }

    for issue in issues {
        debug!(row = issue.row, column = %issue.column, value = %issue.value, "coercion issue");
    }
}

fn print_validation_result(total: usize, errors: &[(usize, Vec<String>)]) {
    if errors.is_empty() {
        log_success(format!("All {} records valid", total));
        return;
    }

    log_error(format!("Invalid: {} of {}", errors.len(), total));
    for (i, errs) in errors.iter().take(MAX_LOGGED_ISSUES) {
        log_info_indent(format!("Record {}: {}", i, errs.join(", ")), 1);
    }
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}
