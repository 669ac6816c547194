//! Coercion operations
//!
//! Turn raw cell text into integer properties and point geometry. Neither
//! coercion can fail the row: the outcome enums carry the unparsable case so
//! the executor can apply the null/absent policy and record a diagnostic.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};
use std::str::FromStr;

use crate::models::PointGeometry;

/// Optional sign, ASCII digits, single underscores allowed between digits.
static INTEGER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+(?:_[0-9]+)*$").expect("valid integer pattern"));

/// Decimal number whose digit runs may be grouped by single underscores.
static GROUPED_FLOAT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let digits = r"[0-9]+(?:_[0-9]+)*";
    let pattern = format!(
        r"^[+-]?(?:{d}(?:\.(?:{d})?)?|\.{d})(?:[eE][+-]?{d})?$",
        d = digits
    );
    Regex::new(&pattern).expect("valid float pattern")
});

/// Outcome of coercing an integer column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegerCoercion {
    /// Column missing or empty: the property is omitted.
    Empty,
    /// Parsed value, of any magnitude.
    Parsed(Number),
    /// Non-empty text that is not an integer: the property is set to `null`.
    Unparsable,
}

impl IntegerCoercion {
    pub fn from_text(raw: Option<&str>) -> Self {
        match raw.filter(|s| !s.is_empty()) {
            None => Self::Empty,
            Some(text) => parse_integer(text).map_or(Self::Unparsable, Self::Parsed),
        }
    }

    /// Property value to store, `None` meaning "omit the key".
    pub fn into_property(self) -> Option<Value> {
        match self {
            Self::Empty => None,
            Self::Parsed(n) => Some(Value::Number(n)),
            Self::Unparsable => Some(Value::Null),
        }
    }
}

/// Outcome of building a point from the latitude and longitude columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryCoercion {
    /// Both columns empty or missing.
    Missing,
    /// Exactly one of the two columns has text.
    Incomplete,
    /// Both present but at least one is not a finite number.
    Unparsable,
    Parsed(PointGeometry),
}

impl GeometryCoercion {
    pub fn from_text(latitude: Option<&str>, longitude: Option<&str>) -> Self {
        let latitude = latitude.filter(|s| !s.is_empty());
        let longitude = longitude.filter(|s| !s.is_empty());

        match (latitude, longitude) {
            (None, None) => Self::Missing,
            (Some(_), None) | (None, Some(_)) => Self::Incomplete,
            (Some(lat), Some(lon)) => match (parse_coordinate(lat), parse_coordinate(lon)) {
                (Some(lat), Some(lon)) => Self::Parsed(PointGeometry::new(lon, lat)),
                _ => Self::Unparsable,
            },
        }
    }

    pub fn into_geometry(self) -> Option<PointGeometry> {
        match self {
            Self::Parsed(point) => Some(point),
            _ => None,
        }
    }
}

/// Parse integer text into a JSON number.
///
/// Surrounding whitespace is ignored. There is no range limit: digits beyond
/// 64 bits are kept exactly.
pub fn parse_integer(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if !INTEGER_PATTERN.is_match(trimmed) {
        return None;
    }

    let (negative, unsigned) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    // JSON numbers allow neither a `+` sign nor leading zeros
    let digits: String = unsigned.chars().filter(|c| *c != '_').collect();
    let digits = match digits.trim_start_matches('0') {
        "" => "0",
        significant => significant,
    };

    let canonical = if negative && digits != "0" {
        format!("-{}", digits)
    } else {
        digits.to_string()
    };
    Number::from_str(&canonical).ok()
}

/// Parse a coordinate. Non-finite values (NaN, infinities) are `None`.
///
/// Digits may be grouped by single underscores, as in `1_0.5`.
pub fn parse_coordinate(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let value = if trimmed.contains('_') {
        if !GROUPED_FLOAT_PATTERN.is_match(trimmed) {
            return None;
        }
        trimmed.replace('_', "").parse::<f64>().ok()?
    } else {
        trimmed.parse::<f64>().ok()?
    };
    Some(value).filter(|v| v.is_finite())
}
