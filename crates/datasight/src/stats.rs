//! Descriptive statistics for numeric and categorical columns.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::schema::TableSchema;

/// Round to 2 decimal places (API-facing percentages and money amounts).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 4 decimal places (correlations, per-unit ratios).
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Normalize a raw value into a display label. Null-ish values become
/// "Unknown"; long labels are truncated.
pub fn clean_label(value: Option<String>) -> String {
    match value {
        None => "Unknown".to_string(),
        Some(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return "Unknown".to_string();
            }
            trimmed.chars().take(120).collect()
        }
    }
}

/// Min/max/avg for a numeric column. All fields are null when the column
/// has zero non-null values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

/// Compute `{min, max, avg}` for every numeric column, keyed in table order.
pub fn basic_stats(dataset: &Dataset, schema: &TableSchema) -> IndexMap<String, BasicStats> {
    let mut stats = IndexMap::new();

    for col in schema.numeric_columns() {
        let values: Vec<f64> = dataset
            .numeric_column(col.position)
            .into_iter()
            .flatten()
            .collect();

        let entry = if values.is_empty() {
            BasicStats {
                min: None,
                max: None,
                avg: None,
            }
        } else {
            let sum: f64 = values.iter().sum();
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            BasicStats {
                min: Some(min),
                max: Some(max),
                avg: Some(sum / values.len() as f64),
            }
        };

        stats.insert(col.name.clone(), entry);
    }

    stats
}

/// Distribution profile for a numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericProfile {
    pub column: String,
    pub count: usize,
    pub missing_pct: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub mean: f64,
    pub q3: f64,
    pub max: f64,
    pub std_dev: f64,
    pub outlier_count: usize,
    pub outlier_pct: f64,
}

/// Maximum numeric profiles reported per response.
const MAX_NUMERIC_PROFILES: usize = 12;

/// Build distribution profiles for numeric columns (IQR outlier counts,
/// exact quantiles). Columns with no parseable values are skipped.
pub fn numeric_profiles(dataset: &Dataset, schema: &TableSchema) -> Vec<NumericProfile> {
    let row_count = dataset.row_count().max(1);
    let mut profiles = Vec::new();

    for col in schema.numeric_columns() {
        let mut values: Vec<f64> = dataset
            .numeric_column(col.position)
            .into_iter()
            .flatten()
            .collect();
        if values.is_empty() {
            continue;
        }

        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = values.len();
        let q1 = percentile(&values, 25.0);
        let median = percentile(&values, 50.0);
        let q3 = percentile(&values, 75.0);
        let iqr = q3 - q1;

        let (mean, std_dev) = mean_and_std(&values);

        let outlier_count = if iqr > 0.0 {
            let lower = q1 - 1.5 * iqr;
            let upper = q3 + 1.5 * iqr;
            values.iter().filter(|&&v| v < lower || v > upper).count()
        } else {
            0
        };

        profiles.push(NumericProfile {
            column: col.name.clone(),
            count,
            missing_pct: round2((1.0 - count as f64 / row_count as f64) * 100.0),
            min: values[0],
            q1,
            median,
            mean,
            q3,
            max: values[count - 1],
            std_dev,
            outlier_count,
            outlier_pct: round2(outlier_count as f64 / count as f64 * 100.0),
        });

        if profiles.len() >= MAX_NUMERIC_PROFILES {
            break;
        }
    }

    profiles
}

/// A frequent value within a categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopValue {
    pub label: String,
    pub count: usize,
    pub pct: f64,
}

/// Cardinality and frequency profile for a categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalProfile {
    pub column: String,
    pub unique_count: usize,
    pub missing_pct: f64,
    pub top_values: Vec<TopValue>,
}

const MAX_CATEGORICAL_PROFILES: usize = 8;
const MAX_TOP_VALUES: usize = 5;

/// Build frequency profiles for categorical columns.
pub fn categorical_profiles(dataset: &Dataset, schema: &TableSchema) -> Vec<CategoricalProfile> {
    let row_count = dataset.row_count().max(1);
    let mut profiles = Vec::new();

    for col in schema.categorical_columns() {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        let mut non_null = 0usize;

        for cell in dataset.column_values(col.position) {
            if let Some(text) = cell.as_text() {
                non_null += 1;
                *counts.entry(text).or_insert(0) += 1;
            }
        }

        if non_null == 0 {
            continue;
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let top_values = ranked
            .into_iter()
            .take(MAX_TOP_VALUES)
            .map(|(label, count)| TopValue {
                label: clean_label(Some(label)),
                count,
                pct: round2(count as f64 / row_count as f64 * 100.0),
            })
            .collect();

        profiles.push(CategoricalProfile {
            column: col.name.clone(),
            unique_count: col.unique_count,
            missing_pct: round2((1.0 - non_null as f64 / row_count as f64) * 100.0),
            top_values,
        });

        if profiles.len() >= MAX_CATEGORICAL_PROFILES {
            break;
        }
    }

    profiles
}

/// Exact percentile over a pre-sorted slice (linear interpolation).
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = rank - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Welford's single-pass mean and sample standard deviation.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let mut count = 0usize;
    let mut mean = 0.0f64;
    let mut m2 = 0.0f64;

    for &value in values {
        count += 1;
        let delta = value - mean;
        mean += delta / count as f64;
        m2 += delta * (value - mean);
    }

    let std_dev = if count > 1 {
        (m2 / (count - 1) as f64).sqrt()
    } else {
        0.0
    };

    (mean, std_dev)
}
