//! Facility Transform CLI - normalize facility tables
//!
//! # Commands
//!
//! ```bash
//! facility-transform transform facilities.csv -o data/facilities_transformed.csv
//! facility-transform transform facilities.csv -f geojson > facilities.geojson
//! facility-transform parse facilities.csv          # Dump raw rows as JSON
//! facility-transform validate records.json         # Check a JSON array of records
//! facility-transform columns                       # Show the column mapping
//! ```
//!
//! `FACILITY_TRANSFORM_OUTPUT` and `FACILITY_TRANSFORM_FORMAT` (also read
//! from `.env`) provide defaults for `--output` and `--format`.

use clap::{ArgAction, Parser, Subcommand};
use facility_transform::logs::{init_logging, log_error, log_info, log_success, log_warning};
use facility_transform::{
    mapping_description, parse_csv_file_with, transform_csv, validate_document, write_records,
    write_records_to_path, OutputFormat, TransformOptions, ValidationError, INPUT_COLUMNS,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "facility-transform")]
#[command(
    about = "Transform battery-recycling facility tables into id/properties/geometry records",
    long_about = None
)]
struct Cli {
    /// Increase log detail (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a facility CSV into records
    Transform {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout); its directory is created if missing
        #[arg(short, long, env = "FACILITY_TRANSFORM_OUTPUT")]
        output: Option<PathBuf>,

        /// Output format: csv, geojson or json (default: from extension, else csv)
        #[arg(short, long, env = "FACILITY_TRANSFORM_FORMAT")]
        format: Option<OutputFormat>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Skip structural validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Parse a CSV file and output its raw rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a JSON array of records against the record schema
    Validate {
        /// Input JSON file
        input: PathBuf,
    },

    /// Show expected input columns and how they map to properties
    Columns,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let result = match cli.command {
        Commands::Transform {
            input,
            output,
            format,
            delimiter,
            no_validate,
        } => cmd_transform(&input, output.as_deref(), format, delimiter, no_validate),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Columns => cmd_columns(),
    };

    if let Err(e) = result {
        log_error(format!("❌ {}", e));
        std::process::exit(1);
    }
}

fn cmd_transform(
    input: &Path,
    output: Option<&Path>,
    format: Option<OutputFormat>,
    delimiter: Option<char>,
    no_validate: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = TransformOptions {
        delimiter,
        skip_validation: no_validate,
    };

    let result = transform_csv(input, options)?;

    let format = format
        .or_else(|| output.map(OutputFormat::from_path))
        .unwrap_or_default();

    match output {
        Some(path) => {
            write_records_to_path(path, &result.records, format)?;
            log_success(format!(
                "💾 {} records written to {} ({})",
                result.records.len(),
                path.display(),
                format
            ));
        }
        None => {
            let stdout = std::io::stdout();
            write_records(stdout.lock(), &result.records, format)?;
        }
    }

    if !result.validation_errors.is_empty() {
        log_warning(format!(
            "{} record(s) failed structural validation",
            result.validation_errors.len()
        ));
    }

    log_info("✨ Done!");
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("📄 Parsing CSV: {}", input.display()));

    let result = parse_csv_file_with(input, delimiter)?;

    log_info(format!("Encoding: {}", result.encoding));
    log_info(format!(
        "Delimiter: '{}'{}",
        format_delimiter(result.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    ));
    log_info(format!("Columns: {}", result.headers.join(", ")));
    log_success(format!("Parsed {} rows", result.rows.len()));

    let json = serde_json::to_string_pretty(&result.rows)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("✔️  Validating: {}", input.display()));

    let content = fs::read_to_string(input)?;
    let document: Value = serde_json::from_str(&content)?;
    let total = document.as_array().map(Vec::len).unwrap_or(0);

    let failures = validate_document(&document)?;

    for (i, errors) in failures.iter().take(5) {
        log_error(format!("Record {} invalid:", i));
        for err in errors.iter().take(3) {
            log_error(format!("   - {}", err));
        }
    }

    log_info(format!(
        "📊 Results: {} valid, {} invalid",
        total - failures.len(),
        failures.len()
    ));

    match failures.into_iter().next() {
        Some((index, errors)) => Err(ValidationError::Record { index, errors }.into()),
        None => Ok(()),
    }
}

fn cmd_columns() -> Result<(), Box<dyn std::error::Error>> {
    println!("Expected input header:\n  {}\n", INPUT_COLUMNS.join(","));
    print!("{}", mapping_description());
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            facility_transform::ensure_parent_dir(p)?;
            fs::write(p, content)?;
            log_success(format!("💾 Output written to: {}", p.display()));
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
