//! Data quality diagnostics: completeness, duplicates, category variants.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::{CellValue, Dataset};
use crate::schema::TableSchema;
use crate::stats::round2;

/// Missing-percentage threshold for flagging a column.
const HIGH_MISSING_PCT: f64 = 20.0;

/// Maximum high-missing columns reported.
const MAX_HIGH_MISSING: usize = 8;

/// Maximum raw example values per category cluster.
const MAX_CLUSTER_EXAMPLES: usize = 4;

/// A column with an elevated missing-value rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighMissingColumn {
    pub column: String,
    pub missing_count: usize,
    pub missing_pct: f64,
}

/// Distinct raw spellings of one canonical categorical value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCluster {
    /// Column the variants appear in.
    pub column: String,
    /// Canonical (lowercased, whitespace-collapsed) form.
    pub canonical: String,
    /// Number of distinct raw spellings.
    pub variant_count: usize,
    /// Rows affected across all variants.
    pub row_count: usize,
    /// Sample raw spellings.
    pub examples: Vec<String>,
}

/// Dataset-level quality summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualitySummary {
    pub rows_analyzed: usize,
    pub columns_analyzed: usize,
    pub duplicate_rows: usize,
    pub duplicate_pct: f64,
    pub completeness_pct: f64,
    pub high_missing_columns: Vec<HighMissingColumn>,
    pub inconsistent_categories: Vec<CategoryCluster>,
}

impl DataQualitySummary {
    /// Summary for an empty dataset.
    pub fn empty() -> Self {
        Self {
            rows_analyzed: 0,
            columns_analyzed: 0,
            duplicate_rows: 0,
            duplicate_pct: 0.0,
            completeness_pct: 0.0,
            high_missing_columns: Vec::new(),
            inconsistent_categories: Vec::new(),
        }
    }
}

/// Build the full quality summary for a dataset.
pub fn analyze_quality(dataset: &Dataset, schema: &TableSchema) -> DataQualitySummary {
    let row_count = dataset.row_count();
    let column_count = dataset.column_count();
    if row_count == 0 || column_count == 0 {
        return DataQualitySummary::empty();
    }

    let total_cells = row_count * column_count;
    let total_missing: usize = schema.columns.iter().map(|c| c.null_count).sum();
    let completeness_pct =
        round2((total_cells - total_missing) as f64 / total_cells as f64 * 100.0);

    let duplicate_rows = count_duplicate_rows(dataset);
    let duplicate_pct = round2((duplicate_rows as f64 / row_count as f64 * 100.0).min(100.0));

    DataQualitySummary {
        rows_analyzed: row_count,
        columns_analyzed: column_count,
        duplicate_rows,
        duplicate_pct,
        completeness_pct,
        high_missing_columns: high_missing_columns(schema),
        inconsistent_categories: inconsistent_categories(dataset, schema),
    }
}

/// Count rows that are exact duplicates of an earlier row.
/// No normalization is applied: duplicates are exact-value matches.
fn count_duplicate_rows(dataset: &Dataset) -> usize {
    let mut seen: HashSet<String> = HashSet::with_capacity(dataset.row_count());
    let mut duplicates = 0usize;

    for row in &dataset.rows {
        // serde_json gives a stable canonical key per row
        let key = serde_json::to_string(row).unwrap_or_default();
        if !seen.insert(key) {
            duplicates += 1;
        }
    }

    duplicates
}

/// Columns whose missing rate exceeds the threshold, worst first.
fn high_missing_columns(schema: &TableSchema) -> Vec<HighMissingColumn> {
    let mut flagged: Vec<HighMissingColumn> = schema
        .columns
        .iter()
        .filter_map(|col| {
            let missing_pct = round2(col.missing_pct());
            if missing_pct >= HIGH_MISSING_PCT {
                Some(HighMissingColumn {
                    column: col.name.clone(),
                    missing_count: col.null_count,
                    missing_pct,
                })
            } else {
                None
            }
        })
        .collect();

    flagged.sort_by(|a, b| {
        b.missing_pct
            .partial_cmp(&a.missing_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    flagged.truncate(MAX_HIGH_MISSING);
    flagged
}

/// Canonical form for clustering: trim, lowercase, collapse whitespace.
fn canonicalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Find categorical values that normalize identically but differ in raw
/// casing/spacing.
fn inconsistent_categories(dataset: &Dataset, schema: &TableSchema) -> Vec<CategoryCluster> {
    let mut clusters = Vec::new();

    for col in schema.categorical_columns() {
        // canonical -> (raw spelling -> count)
        let mut groups: IndexMap<String, IndexMap<String, usize>> = IndexMap::new();

        for cell in dataset.column_values(col.position) {
            let CellValue::Text(raw) = cell else { continue };
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }

            groups
                .entry(canonicalize(trimmed))
                .or_default()
                .entry(raw.clone())
                .and_modify(|c| *c += 1)
                .or_insert(1);
        }

        for (canonical, variants) in groups {
            if variants.len() < 2 {
                continue;
            }
            let row_count = variants.values().sum();
            let examples = variants
                .keys()
                .take(MAX_CLUSTER_EXAMPLES)
                .cloned()
                .collect();

            clusters.push(CategoryCluster {
                column: col.name.clone(),
                canonical,
                variant_count: variants.len(),
                row_count,
                examples,
            });
        }
    }

    clusters.sort_by(|a, b| b.row_count.cmp(&a.row_count));
    clusters
}
