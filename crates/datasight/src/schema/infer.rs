//! Column type inference from raw cell values.

use std::collections::HashSet;

use crate::dataset::{CellValue, Dataset};

use super::column::{ColumnSchema, TableSchema};
use super::types::ColumnType;

/// Column-name tokens that hint at a date column.
pub const DATE_NAME_TOKENS: &[&str] = &["date", "time", "month", "year", "day", "period"];

/// Thresholds for type classification.
///
/// The numeric/date tie-break is a heuristic, not a confirmed behavior, so the
/// thresholds are plain configuration rather than hard-wired constants.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Minimum fraction of non-null values parsing as numbers.
    pub numeric_threshold: f64,
    /// Minimum fraction of non-null values parsing as dates.
    pub date_threshold: f64,
    /// Relaxed date threshold when the column name carries a date token.
    pub date_name_hint_threshold: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            numeric_threshold: 0.8,
            date_threshold: 0.7,
            date_name_hint_threshold: 0.5,
        }
    }
}

/// Classifies each column as numeric, date-like, or categorical.
pub struct SchemaInferencer {
    config: InferenceConfig,
}

impl SchemaInferencer {
    /// Create an inferencer with default thresholds.
    pub fn new() -> Self {
        Self {
            config: InferenceConfig::default(),
        }
    }

    /// Create an inferencer with custom thresholds.
    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Infer a schema for every column of the dataset.
    pub fn infer(&self, dataset: &Dataset) -> TableSchema {
        let columns = dataset
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| self.infer_column(dataset, idx, name))
            .collect();
        TableSchema::with_columns(columns)
    }

    /// Infer the schema for a single column.
    pub fn infer_column(&self, dataset: &Dataset, index: usize, name: &str) -> ColumnSchema {
        let mut non_null_count = 0usize;
        let mut null_count = 0usize;
        let mut numeric_hits = 0usize;
        let mut date_hits = 0usize;
        let mut distinct: HashSet<String> = HashSet::new();

        for cell in dataset.column_values(index) {
            match cell {
                CellValue::Null => null_count += 1,
                other => {
                    non_null_count += 1;
                    if other.as_number().is_some() {
                        numeric_hits += 1;
                    }
                    if other.as_date().is_some() {
                        date_hits += 1;
                    }
                    if let Some(text) = other.as_text() {
                        distinct.insert(text);
                    }
                }
            }
        }

        let (numeric_rate, date_rate) = if non_null_count == 0 {
            (0.0, 0.0)
        } else {
            (
                numeric_hits as f64 / non_null_count as f64,
                date_hits as f64 / non_null_count as f64,
            )
        };

        let inferred_type = self.classify(name, non_null_count, numeric_rate, date_rate);

        ColumnSchema {
            name: name.to_string(),
            position: index,
            inferred_type,
            non_null_count,
            null_count,
            unique_count: distinct.len(),
            numeric_parse_rate: numeric_rate,
            date_parse_rate: date_rate,
        }
    }

    /// Apply thresholds and the numeric/date tie-break.
    fn classify(
        &self,
        name: &str,
        non_null_count: usize,
        numeric_rate: f64,
        date_rate: f64,
    ) -> ColumnType {
        // All-null columns are categorical with zero cardinality
        if non_null_count == 0 {
            return ColumnType::Categorical;
        }

        let name_hints_date = has_date_name_hint(name);
        let date_threshold = if name_hints_date {
            self.config.date_name_hint_threshold
        } else {
            self.config.date_threshold
        };

        let is_numeric = numeric_rate >= self.config.numeric_threshold;
        let is_date = date_rate >= date_threshold;

        match (is_numeric, is_date) {
            (true, true) => {
                // Tie-break: date only wins with a name hint or a better parse rate
                if name_hints_date || date_rate > numeric_rate {
                    ColumnType::Date
                } else {
                    ColumnType::Numeric
                }
            }
            (true, false) => ColumnType::Numeric,
            (false, true) => ColumnType::Date,
            (false, false) => ColumnType::Categorical,
        }
    }
}

impl Default for SchemaInferencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Check whether a column name carries a date token.
pub fn has_date_name_hint(name: &str) -> bool {
    let lower = name.to_lowercase();
    DATE_NAME_TOKENS.iter().any(|token| lower.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: Vec<&str>, rows: Vec<Vec<&str>>) -> Dataset {
        Dataset::new(
            columns.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(CellValue::from_text).collect())
                .collect(),
        )
    }

    #[test]
    fn test_infer_numeric_column() {
        let ds = dataset(
            vec!["revenue"],
            vec![vec!["100"], vec!["$1,250.50"], vec!["300"]],
        );
        let schema = SchemaInferencer::new().infer(&ds);
        assert_eq!(schema.columns[0].inferred_type, ColumnType::Numeric);
    }

    #[test]
    fn test_infer_date_column() {
        let ds = dataset(
            vec!["order_date"],
            vec![vec!["2024-01-01"], vec!["2024-02-01"], vec!["2024-03-01"]],
        );
        let schema = SchemaInferencer::new().infer(&ds);
        assert_eq!(schema.columns[0].inferred_type, ColumnType::Date);
    }

    #[test]
    fn test_infer_categorical_column() {
        let ds = dataset(vec!["region"], vec![vec!["NY"], vec!["LA"], vec!["NY"]]);
        let schema = SchemaInferencer::new().infer(&ds);
        assert_eq!(schema.columns[0].inferred_type, ColumnType::Categorical);
        assert_eq!(schema.columns[0].unique_count, 2);
    }

    #[test]
    fn test_all_null_column_is_categorical() {
        let ds = dataset(vec!["empty"], vec![vec![""], vec!["NA"], vec!["null"]]);
        let schema = SchemaInferencer::new().infer(&ds);

        assert_eq!(schema.columns[0].inferred_type, ColumnType::Categorical);
        assert_eq!(schema.columns[0].unique_count, 0);
        assert_eq!(schema.columns[0].null_count, 3);
    }

    #[test]
    fn test_tolerates_sparse_noise() {
        // 4 of 5 parse as numbers: still numeric at the 0.8 threshold
        let ds = dataset(
            vec!["amount"],
            vec![vec!["1"], vec!["2"], vec!["3"], vec!["4"], vec!["oops"]],
        );
        let schema = SchemaInferencer::new().infer(&ds);
        assert_eq!(schema.columns[0].inferred_type, ColumnType::Numeric);
    }

    #[test]
    fn test_month_period_with_name_hint_is_date() {
        // "2024-01" parses as both a number-less date and not a number;
        // the name hint lowers the date threshold
        let ds = dataset(vec!["month"], vec![vec!["2024-01"], vec!["2024-02"]]);
        let schema = SchemaInferencer::new().infer(&ds);
        assert_eq!(schema.columns[0].inferred_type, ColumnType::Date);
    }

    #[test]
    fn test_tie_break_prefers_numeric_without_name_hint() {
        // Plain integers never parse as dates under the supported formats,
        // so craft a column where both rates clear their thresholds.
        let config = InferenceConfig {
            numeric_threshold: 0.0,
            date_threshold: 0.0,
            date_name_hint_threshold: 0.0,
        };
        let inferencer = SchemaInferencer::with_config(config);
        let ds = dataset(vec!["code"], vec![vec!["1200"], vec!["1300"]]);
        let schema = inferencer.infer(&ds);
        assert_eq!(schema.columns[0].inferred_type, ColumnType::Numeric);
    }
}
