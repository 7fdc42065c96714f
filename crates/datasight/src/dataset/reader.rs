//! CSV/TSV reader with delimiter detection.
//!
//! Ingestion plumbing for the CLI entry points. The analytics engine itself
//! only sees the resulting [`Dataset`].

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{DatasightError, Result};

use super::table::Dataset;
use super::value::CellValue;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
        }
    }
}

/// Reads delimited files into datasets.
pub struct CsvReader {
    config: ReaderConfig,
}

impl CsvReader {
    /// Create a reader with default configuration.
    pub fn new() -> Self {
        Self {
            config: ReaderConfig::default(),
        }
    }

    /// Create a reader with custom configuration.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a file into a dataset.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let mut file = File::open(path.as_ref())?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        self.read_bytes(&contents)
    }

    /// Read raw bytes into a dataset.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Dataset> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .flexible(true)
            .from_reader(bytes);

        let columns: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if columns.is_empty() {
            return Err(DatasightError::EmptyData("No columns found".to_string()));
        }

        let expected_cols = columns.len();
        let mut rows = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            let mut row: Vec<CellValue> =
                record.iter().map(CellValue::from_text).collect();

            // Pad short rows, truncate long ones
            while row.len() < expected_cols {
                row.push(CellValue::Null);
            }
            row.truncate(expected_cols);

            rows.push(row);
        }

        if rows.is_empty() {
            return Err(DatasightError::EmptyData("No data rows found".to_string()));
        }

        Ok(Dataset::new(columns, rows))
    }
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(DatasightError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_read_csv() {
        let reader = CsvReader::new();
        let data = b"region,revenue\nNY,100\nLA,NA";
        let ds = reader.read_bytes(data).unwrap();

        assert_eq!(ds.columns, vec!["region", "revenue"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.get(0, 1), Some(&CellValue::Text("100".to_string())));
        // NA becomes Null at the boundary
        assert_eq!(ds.get(1, 1), Some(&CellValue::Null));
    }

    #[test]
    fn test_read_ragged_rows() {
        let reader = CsvReader::new();
        let data = b"a,b,c\n1,2\n4,5,6,7";
        let ds = reader.read_bytes(data).unwrap();

        assert_eq!(ds.column_count(), 3);
        assert_eq!(ds.get(0, 2), Some(&CellValue::Null));
        assert_eq!(ds.rows[1].len(), 3);
    }

    #[test]
    fn test_empty_file() {
        let reader = CsvReader::new();
        assert!(reader.read_bytes(b"").is_err());
    }
}
