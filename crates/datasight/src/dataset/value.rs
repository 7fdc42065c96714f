//! Cell values and scalar parsing.
//!
//! Every cell in a dataset is a tagged variant so downstream analyzers operate
//! on a typed view instead of re-parsing raw strings at every call site.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Shape pre-screen compiled once on first use; cheap rejection before the
// per-format parse attempts.
static DATE_SHAPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap(),     // ISO date
        Regex::new(r"^\d{4}/\d{2}/\d{2}").unwrap(),     // Alt ISO
        Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}").unwrap(), // US date
        Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}").unwrap(), // Day or month first
        Regex::new(r"^\d{4}-\d{2}$").unwrap(),          // Month period
    ]
});

/// A single cell value from an uploaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing value.
    Null,
    /// Numeric value (JSON numbers, or text that parsed as a number upstream).
    Number(f64),
    /// Text value.
    Text(String),
}

impl CellValue {
    /// Build a cell from a raw JSON scalar. NA-like strings become `Null`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) if f.is_finite() => CellValue::Number(f),
                _ => CellValue::Null,
            },
            serde_json::Value::Bool(b) => CellValue::Text(b.to_string()),
            serde_json::Value::String(s) => CellValue::from_text(s),
            other => CellValue::Text(other.to_string()),
        }
    }

    /// Build a cell from raw text (CSV path). NA-like strings become `Null`.
    pub fn from_text(text: &str) -> Self {
        if is_null_text(text) {
            CellValue::Null
        } else {
            CellValue::Text(text.to_string())
        }
    }

    /// Returns true if the cell is missing.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the cell, parsing formatted text if necessary.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s),
            CellValue::Null => None,
        }
    }

    /// Date view of the cell.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Text(s) => parse_date(s),
            _ => None,
        }
    }

    /// Text view of the cell, formatting numbers on demand.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Null => None,
        }
    }
}

/// Check if a raw string represents a missing value.
pub fn is_null_text(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
        || trimmed == "."
        || trimmed == "-"
}

/// Parse a number from text after stripping common formatting
/// (currency symbols, thousands separators, percent signs).
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut cleaned = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        match ch {
            '$' | '€' | '£' | ',' | '%' => continue,
            c if c.is_whitespace() => continue,
            c => cleaned.push(c),
        }
    }

    // Accounting negatives: (123.45)
    let cleaned = if cleaned.starts_with('(') && cleaned.ends_with(')') {
        format!("-{}", &cleaned[1..cleaned.len() - 1])
    } else {
        cleaned
    };

    cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Date formats tried in order. `%Y-%m` is handled separately below.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%m-%d-%Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a date from text under common formats (ISO, US, month-only).
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !DATE_SHAPES.iter().any(|re| re.is_match(trimmed)) {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    // Month-only periods like "2024-01" anchor to the first of the month.
    if trimmed.len() == 7 && trimmed.as_bytes()[4] == b'-' {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d") {
            return Some(date);
        }
    }

    None
}

/// Monthly bucket key for a date ("YYYY-MM").
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Format a number without a trailing `.0` for whole values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
