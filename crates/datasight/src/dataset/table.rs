//! In-memory tabular dataset.

use indexmap::IndexSet;
use sha2::{Digest, Sha256};

use crate::error::{DatasightError, Result};

use super::value::CellValue;

/// A rectangular dataset: ordered columns, rows of typed cells.
///
/// Supplied fresh on every request; the analytics engine never mutates it and
/// keeps no state between calls.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Column names in original order.
    pub columns: Vec<String>,
    /// Row data (row-major order). Every row has `columns.len()` cells.
    pub rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Create a dataset from pre-shaped columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    /// Build a dataset from JSON row objects (the upload/storage format).
    ///
    /// Column order is the order keys first appear across rows; missing keys
    /// become `Null` so the result is always rectangular.
    pub fn from_records(records: &[serde_json::Map<String, serde_json::Value>]) -> Result<Self> {
        let mut columns: IndexSet<String> = IndexSet::new();
        for record in records {
            for key in record.keys() {
                columns.insert(key.clone());
            }
        }

        if columns.is_empty() {
            return Err(DatasightError::Computation(
                "rows contain no columns to analyze".to_string(),
            ));
        }

        let columns: Vec<String> = columns.into_iter().collect();
        let rows: Vec<Vec<CellValue>> = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| {
                        record
                            .get(col)
                            .map(CellValue::from_json)
                            .unwrap_or(CellValue::Null)
                    })
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows
            .iter()
            .map(move |row| row.get(index).unwrap_or(&CellValue::Null))
    }

    /// A specific cell.
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Numeric view of a column: one entry per row, `None` where the cell
    /// is missing or does not parse as a number.
    pub fn numeric_column(&self, index: usize) -> Vec<Option<f64>> {
        self.column_values(index).map(|c| c.as_number()).collect()
    }

    /// A copy capped to the first `max_rows` rows (sampling bound for
    /// AI-facing computations).
    pub fn sample(&self, max_rows: usize) -> Dataset {
        if self.rows.len() <= max_rows {
            return self.clone();
        }
        Dataset {
            columns: self.columns.clone(),
            rows: self.rows[..max_rows].to_vec(),
        }
    }

    /// Content fingerprint over columns and rows, used as a cache key.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for col in &self.columns {
            hasher.update(col.as_bytes());
            hasher.update([0u8]);
        }
        for row in &self.rows {
            // serde_json gives a stable canonical form for each cell
            if let Ok(encoded) = serde_json::to_vec(row) {
                hasher.update(&encoded);
            }
        }
        format!("sha256:{:x}", hasher.finalize())
    }
}
