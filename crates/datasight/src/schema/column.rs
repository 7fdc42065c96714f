//! Column and table schema definitions.

use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// Inferred schema for a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Zero-based position in the table.
    pub position: usize,
    /// Inferred data type.
    pub inferred_type: ColumnType,
    /// Number of non-null cells.
    pub non_null_count: usize,
    /// Number of null/missing cells.
    pub null_count: usize,
    /// Number of distinct non-null values.
    pub unique_count: usize,
    /// Fraction of non-null values that parsed as numbers.
    pub numeric_parse_rate: f64,
    /// Fraction of non-null values that parsed as dates.
    pub date_parse_rate: f64,
}

impl ColumnSchema {
    /// Missing percentage over all cells in the column.
    pub fn missing_pct(&self) -> f64 {
        let total = self.non_null_count + self.null_count;
        if total == 0 {
            0.0
        } else {
            (self.null_count as f64 / total as f64) * 100.0
        }
    }
}

/// Schema for an entire table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    /// Schemas for each column, in table order.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Create a table schema with the given columns.
    pub fn with_columns(columns: Vec<ColumnSchema>) -> Self {
        Self { columns }
    }

    /// Get a column by name.
    pub fn get(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns of a specific type, in table order.
    pub fn columns_of_type(&self, ty: ColumnType) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter().filter(move |c| c.inferred_type == ty)
    }

    /// Names of numeric columns, in table order.
    pub fn numeric_columns(&self) -> Vec<&ColumnSchema> {
        self.columns_of_type(ColumnType::Numeric).collect()
    }

    /// Names of date-like columns, in table order.
    pub fn date_columns(&self) -> Vec<&ColumnSchema> {
        self.columns_of_type(ColumnType::Date).collect()
    }

    /// Names of categorical columns, in table order.
    pub fn categorical_columns(&self) -> Vec<&ColumnSchema> {
        self.columns_of_type(ColumnType::Categorical).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_pct() {
        let col = ColumnSchema {
            name: "x".to_string(),
            position: 0,
            inferred_type: ColumnType::Numeric,
            non_null_count: 3,
            null_count: 1,
            unique_count: 3,
            numeric_parse_rate: 1.0,
            date_parse_rate: 0.0,
        };
        assert_eq!(col.missing_pct(), 25.0);
    }
}
