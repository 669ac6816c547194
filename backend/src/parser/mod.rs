//! Facility table reader with encoding and delimiter auto-detection.
//!
//! Turns raw CSV into [`FacilityRow`]s. No mapping logic lives here: every
//! cell is kept as raw text, keyed by its header.
//!
//! Rows are read leniently. A row shorter than the header leaves its
//! trailing columns absent; a longer row has its surplus fields dropped.

use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{FacilityRow, INPUT_COLUMNS};

/// Delimiters considered by [`detect_delimiter`], in tie-break order.
const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed rows, in input order
    pub rows: Vec<FacilityRow>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers as they appear in the input
    pub headers: Vec<String>,
}

impl ParseResult {
    /// Expected facility columns absent from the header.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        INPUT_COLUMNS
            .iter()
            .copied()
            .filter(|col| !self.headers.iter().any(|h| h == col))
            .collect()
    }

    /// Header columns the transform does not read.
    pub fn unknown_columns(&self) -> Vec<&str> {
        self.headers
            .iter()
            .map(String::as_str)
            .filter(|h| !INPUT_COLUMNS.contains(h))
            .collect()
    }
}

/// Encoding used when detection gives no label `encoding_rs` can decode.
const FALLBACK_ENCODING: &str = "windows-1252";

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is always reported as `utf-8`; anything else goes to chardet.
/// Labels `encoding_rs` does not know are reported as `windows-1252`, which
/// decodes every byte.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    let label = match charset.to_lowercase().as_str() {
        "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "" | "ascii" => FALLBACK_ENCODING.to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    };

    if encoding_rs::Encoding::for_label(label.as_bytes()).is_some() {
        label
    } else {
        FALLBACK_ENCODING.to_string()
    }
}

/// Decode bytes to a string using the given encoding label.
///
/// UTF-8 input that is not valid UTF-8 is decoded lossily. Unknown labels
/// decode as `windows-1252`. A known non-UTF-8 encoding that hits malformed
/// sequences is an error.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let label = encoding.to_lowercase();
    if matches!(label.as_str(), "utf-8" | "utf8" | "ascii") {
        let text = match String::from_utf8(bytes.to_vec()) {
            Ok(s) => s,
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        };
        return Ok(strip_bom(text));
    }

    let enc = encoding_rs::Encoding::for_label(label.as_bytes())
        .unwrap_or(encoding_rs::WINDOWS_1252);
    let (decoded, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(CsvError::Encoding {
            encoding: encoding.to_string(),
        });
    }
    Ok(strip_bom(decoded.into_owned()))
}

fn strip_bom(text: String) -> String {
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Defaults to `,` when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &CANDIDATE_DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into rows with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use facility_transform::csv_to_rows;
///
/// let rows = csv_to_rows("company_name,city\nAcme,Reno", ',').unwrap();
/// assert_eq!(rows[0].get("city"), Some("Reno"));
/// ```
pub fn csv_to_rows(csv: &str, delimiter: char) -> CsvResult<Vec<FacilityRow>> {
    parse_csv(csv.as_bytes(), delimiter).map(|(_, rows)| rows)
}

/// Parse CSV from a reader, returning the header and the rows.
pub fn parse_csv<R: Read>(
    reader: R,
    delimiter: char,
) -> CsvResult<(Vec<String>, Vec<FacilityRow>)> {
    if !delimiter.is_ascii() {
        return Err(CsvError::Delimiter(delimiter));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(CsvError::from_csv)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(CsvError::from_csv)?;
        let row: FacilityRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.as_str(), v))
            .collect();
        rows.push(row);
    }

    Ok((headers, rows))
}

/// Parse CSV file, auto-detecting the delimiter unless one is given.
pub fn parse_csv_file_with<P: AsRef<Path>>(
    path: P,
    delimiter: Option<char>,
) -> CsvResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| CsvError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_bytes_with(&bytes, delimiter)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    parse_bytes_with(bytes, None)
}

/// Parse CSV bytes, auto-detecting the delimiter unless one is given.
pub fn parse_bytes_with(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    let (headers, rows) = parse_csv(content.as_bytes(), delimiter)?;

    Ok(ParseResult {
        rows,
        encoding,
        delimiter,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "company_name,city\nLi-Cycle,Rochester\nEcobat,Casa Grande";
        let rows = csv_to_rows(csv, ',').unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("company_name"), Some("Li-Cycle"));
        assert_eq!(rows[1].get("city"), Some("Casa Grande"));
    }

    #[test]
    fn test_quoted_fields_keep_embedded_delimiters() {
        let csv = "company_name,address\n\"Li-Cycle\",\"Ste 350, Rochester, NY 14652\"";
        let rows = csv_to_rows(csv, ',').unwrap();

        assert_eq!(rows[0].get("address"), Some("Ste 350, Rochester, NY 14652"));
    }

    #[test]
    fn test_short_row_leaves_columns_absent() {
        let csv = "a,b,c\n1,2";
        let rows = csv_to_rows(csv, ',').unwrap();

        assert_eq!(rows[0].get("b"), Some("2"));
        assert_eq!(rows[0].get("c"), None);
    }

    #[test]
    fn test_long_row_drops_surplus_fields() {
        let csv = "a,b\n1,2,3,4";
        let rows = csv_to_rows(csv, ',').unwrap();

        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0].get("b"), Some("2"));
    }

    #[test]
    fn test_empty_values_are_kept_as_empty_text() {
        let csv = "a,b,c\n1,,3";
        let rows = csv_to_rows(csv, ',').unwrap();

        assert_eq!(rows[0].get("b"), Some(""));
        assert_eq!(rows[0].non_empty("b"), None);
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        let result = parse_bytes_auto(b"").unwrap();
        assert!(result.rows.is_empty());
        assert!(result.headers.is_empty());
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let rows = csv_to_rows("company_name,city\n", ',').unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse_semicolon() {
        let csv = "company_name;jobs\nAcme;35";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.rows[0].get("jobs"), Some("35"));
    }

    #[test]
    fn test_explicit_delimiter_overrides_detection() {
        let csv = "company_name|notes\nAcme|a;b;c;d";
        let result = parse_bytes_with(csv.as_bytes(), Some('|')).unwrap();

        assert_eq!(result.delimiter, '|');
        assert_eq!(result.rows[0].get("notes"), Some("a;b;c;d"));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let err = csv_to_rows("a§b", '§').unwrap_err();
        assert!(matches!(err, CsvError::Delimiter('§')));
    }

    #[test]
    fn test_bom_is_stripped() {
        let bytes = "\u{feff}company_name,city\nAcme,Reno".as_bytes();
        let result = parse_bytes_auto(bytes).unwrap();

        assert_eq!(result.headers[0], "company_name");
        assert_eq!(result.rows[0].get("company_name"), Some("Acme"));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    fn latin1(text: &str) -> Vec<u8> {
        text.chars().map(|c| c as u32 as u8).collect()
    }

    #[test]
    fn test_auto_detects_latin1() {
        let text = "company_name,city,region_name,notes\n\
                    Société Générale de Récupération,Montréal,Québec,Procédé hydrométallurgique à température élevée\n\
                    Récupération Élémentaire,Trois-Rivières,Québec,Opérationnelle depuis l'été dernier\n";
        let bytes = latin1(text);
        assert!(std::str::from_utf8(&bytes).is_err());

        let encoding = detect_encoding(&bytes);
        assert!(
            encoding == "iso-8859-1" || encoding == "windows-1252",
            "unexpected encoding {encoding}"
        );

        let result = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].get("city"), Some("Montréal"));
        assert_eq!(result.rows[1].get("city"), Some("Trois-Rivières"));
        assert!(!result.rows[0].get("notes").unwrap().contains('\u{fffd}'));
    }

    #[test]
    fn test_auto_detects_cp1252_punctuation() {
        // U+0093, U+0094 and U+0096 become the bytes 0x93, 0x94 and 0x96: curly
        // quotes and an en dash in Windows-1252
        let bytes = latin1(
            "company_name,technology_name,notes\n\
             Société Générale,Hydro,Procédé breveté \u{93}Hydro-to-Cathode\u{94} à basse température\n\
             Récupération Québec,Pyro,Capacité élevée \u{96} coût réduit\n",
        );

        let result = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(
            result.rows[0].get("notes"),
            Some("Procédé breveté \u{201c}Hydro-to-Cathode\u{201d} à basse température")
        );
        assert_eq!(
            result.rows[1].get("notes"),
            Some("Capacité élevée \u{2013} coût réduit")
        );
    }

    #[test]
    fn test_unknown_label_decodes_as_windows_1252() {
        let bytes = latin1("Montréal \u{93}QC\u{94}");
        let decoded = decode_content(&bytes, "x-unknown").unwrap();
        assert_eq!(decoded, "Montréal \u{201c}QC\u{201d}");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let csv = "company_name,city\n\nAcme,Reno\n\n\nEcobat,Casa Grande\n";
        let rows = csv_to_rows(csv, ',').unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("company_name"), Some("Ecobat"));
    }

    #[test]
    fn test_quoted_fields_with_quotes_and_newlines() {
        let csv = "company_name,notes\n\
                   \"Acme \"\"East\"\"\",\"First line\nsecond, line\"\n\
                   Ecobat,plain\n";
        let rows = csv_to_rows(csv, ',').unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("company_name"), Some("Acme \"East\""));
        assert_eq!(rows[0].get("notes"), Some("First line\nsecond, line"));
        assert_eq!(rows[1].get("notes"), Some("plain"));
    }

    #[test]
    fn test_missing_and_unknown_columns() {
        let csv = "company_name,city,extra\nAcme,Reno,x";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        let missing = result.missing_columns();
        assert_eq!(missing.len(), INPUT_COLUMNS.len() - 2);
        assert!(missing.contains(&"latitude"));
        assert_eq!(result.unknown_columns(), vec!["extra"]);
    }
}
