//! Pairwise correlations and segment-level aggregates.

use serde::{Deserialize, Serialize};

use crate::dataset::{CellValue, Dataset};
use crate::schema::TableSchema;
use crate::stats::{clean_label, round2, round4};

/// Minimum paired observations for a correlation to be reported.
const MIN_CORRELATION_PAIRS: usize = 3;

/// Maximum correlations reported, strongest first.
const MAX_CORRELATIONS: usize = 8;

/// Maximum categorical columns considered for segment insights.
const MAX_SEGMENT_COLUMNS: usize = 4;

/// Maximum distinct values for a column to be segmented on.
const MAX_SEGMENT_CARDINALITY: usize = 50;

/// Maximum segment insights returned.
const MAX_SEGMENT_INSIGHTS: usize = 3;

/// Top segments kept per insight.
const MAX_TOP_SEGMENTS: usize = 5;

/// A notable linear relationship between two numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationInsight {
    pub column_x: String,
    pub column_y: String,
    /// Pearson coefficient rounded to 4 decimal places.
    pub correlation: f64,
    /// "strong" at |r| >= 0.7, "moderate" at 0.4, "weak" below.
    pub strength: String,
    pub direction: String,
}

/// One segment's aggregate for a metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRow {
    pub segment: String,
    pub sum: f64,
    pub mean: f64,
    pub count: usize,
    /// Share of the metric's grand total, in percent.
    pub share_pct: f64,
}

/// A categorical column broken down by a metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentInsight {
    pub segment_column: String,
    pub metric_column: String,
    pub top_segments: Vec<SegmentRow>,
}

/// Compute pairwise Pearson correlations across numeric columns and keep
/// the strongest. Zero-variance columns and pairs with too few overlapping
/// rows are excluded.
pub fn top_correlations(dataset: &Dataset, schema: &TableSchema) -> Vec<CorrelationInsight> {
    let numeric = schema.numeric_columns();
    if numeric.len() < 2 {
        return Vec::new();
    }

    let columns: Vec<(&str, Vec<Option<f64>>)> = numeric
        .iter()
        .map(|c| (c.name.as_str(), dataset.numeric_column(c.position)))
        .collect();

    let mut insights = Vec::new();
    for i in 0..columns.len() {
        for j in (i + 1)..columns.len() {
            let (name_x, values_x) = &columns[i];
            let (name_y, values_y) = &columns[j];

            let Some(r) = pearson(values_x, values_y) else {
                continue;
            };

            let r = round4(r);
            insights.push(CorrelationInsight {
                column_x: name_x.to_string(),
                column_y: name_y.to_string(),
                correlation: r,
                strength: strength_label(r).to_string(),
                direction: if r >= 0.0 { "positive" } else { "negative" }.to_string(),
            });
        }
    }

    insights.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    insights.truncate(MAX_CORRELATIONS);
    insights
}

/// Pearson coefficient over paired non-null rows. Returns `None` when the
/// overlap is too small or either side has zero variance.
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < MIN_CORRELATION_PAIRS {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

fn strength_label(r: f64) -> &'static str {
    let abs = r.abs();
    if abs >= 0.7 {
        "strong"
    } else if abs >= 0.4 {
        "moderate"
    } else {
        "weak"
    }
}

/// Break a metric down by low-cardinality categorical columns, keeping the
/// top segments by total.
pub fn segment_insights(
    dataset: &Dataset,
    schema: &TableSchema,
    metric: &str,
) -> Vec<SegmentInsight> {
    let Some(metric_pos) = dataset.column_position(metric) else {
        return Vec::new();
    };
    let metric_values = dataset.numeric_column(metric_pos);

    let mut insights = Vec::new();
    for col in schema
        .categorical_columns()
        .into_iter()
        .filter(|c| c.unique_count >= 2 && c.unique_count <= MAX_SEGMENT_CARDINALITY)
        .take(MAX_SEGMENT_COLUMNS)
    {
        if let Some(insight) = segment_one(dataset, col.position, &col.name, metric, &metric_values)
        {
            insights.push(insight);
        }
        if insights.len() >= MAX_SEGMENT_INSIGHTS {
            break;
        }
    }

    insights
}

fn segment_one(
    dataset: &Dataset,
    segment_pos: usize,
    segment_column: &str,
    metric: &str,
    metric_values: &[Option<f64>],
) -> Option<SegmentInsight> {
    // label -> (sum, count), in first-seen order for deterministic ties
    let mut groups: indexmap::IndexMap<String, (f64, usize)> = indexmap::IndexMap::new();

    for (row_idx, value) in metric_values.iter().enumerate() {
        let Some(value) = value else { continue };
        let label = match dataset.get(row_idx, segment_pos) {
            Some(CellValue::Null) | None => clean_label(None),
            Some(cell) => clean_label(cell.as_text()),
        };
        let entry = groups.entry(label).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    if groups.len() < 2 {
        return None;
    }

    let grand_total: f64 = groups.values().map(|(sum, _)| sum).sum();
    // Guard against a zero total so shares stay finite
    let share_base = if grand_total == 0.0 { 1.0 } else { grand_total };

    let mut rows: Vec<SegmentRow> = groups
        .into_iter()
        .map(|(segment, (sum, count))| SegmentRow {
            segment,
            sum: round2(sum),
            mean: round2(sum / count as f64),
            count,
            share_pct: round2(sum / share_base * 100.0),
        })
        .collect();

    rows.sort_by(|a, b| b.sum.partial_cmp(&a.sum).unwrap_or(std::cmp::Ordering::Equal));
    rows.truncate(MAX_TOP_SEGMENTS);

    Some(SegmentInsight {
        segment_column: segment_column.to_string(),
        metric_column: metric.to_string(),
        top_segments: rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaInferencer;

    fn dataset(columns: Vec<&str>, rows: Vec<Vec<&str>>) -> (Dataset, TableSchema) {
        let ds = Dataset::new(
            columns.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(CellValue::from_text).collect())
                .collect(),
        );
        let schema = SchemaInferencer::new().infer(&ds);
        (ds, schema)
    }

    #[test]
    fn test_perfect_positive_correlation() {
        let (ds, schema) = dataset(
            vec!["x", "y"],
            vec![vec!["1", "2"], vec!["2", "4"], vec!["3", "6"]],
        );
        let insights = top_correlations(&ds, &schema);

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].correlation, 1.0);
        assert_eq!(insights[0].strength, "strong");
        assert_eq!(insights[0].direction, "positive");
    }

    #[test]
    fn test_negative_correlation_direction() {
        let (ds, schema) = dataset(
            vec!["x", "y"],
            vec![vec!["1", "9"], vec!["2", "5"], vec!["3", "1"]],
        );
        let insights = top_correlations(&ds, &schema);
        assert_eq!(insights[0].direction, "negative");
    }

    #[test]
    fn test_zero_variance_excluded() {
        let (ds, schema) = dataset(
            vec!["x", "constant"],
            vec![vec!["1", "5"], vec!["2", "5"], vec!["3", "5"]],
        );
        assert!(top_correlations(&ds, &schema).is_empty());
    }

    #[test]
    fn test_too_few_pairs_excluded() {
        let (ds, schema) = dataset(vec!["x", "y"], vec![vec!["1", "2"], vec!["2", "4"]]);
        assert!(top_correlations(&ds, &schema).is_empty());
    }

    #[test]
    fn test_segment_insight_ranks_by_sum() {
        let (ds, schema) = dataset(
            vec!["region", "revenue"],
            vec![
                vec!["NY", "100"],
                vec!["LA", "300"],
                vec!["NY", "50"],
                vec!["SF", "200"],
            ],
        );
        let insights = segment_insights(&ds, &schema, "revenue");

        assert_eq!(insights.len(), 1);
        let top = &insights[0].top_segments;
        assert_eq!(top[0].segment, "LA");
        assert_eq!(top[0].sum, 300.0);
        assert_eq!(top[0].share_pct, 46.15);
        assert_eq!(top[1].segment, "SF");
        assert_eq!(top[2].segment, "NY");
        assert_eq!(top[2].count, 2);
        assert_eq!(top[2].mean, 75.0);
    }

    #[test]
    fn test_segment_null_labels_become_unknown() {
        let (ds, schema) = dataset(
            vec!["region", "revenue"],
            vec![vec!["NY", "100"], vec!["", "40"], vec!["LA", "10"]],
        );
        let insights = segment_insights(&ds, &schema, "revenue");
        assert!(insights[0]
            .top_segments
            .iter()
            .any(|s| s.segment == "Unknown"));
    }

    #[test]
    fn test_segment_shares_guard_zero_total() {
        let (ds, schema) = dataset(
            vec!["region", "delta"],
            vec![vec!["NY", "50"], vec!["LA", "-50"], vec!["NY", "0"]],
        );
        let insights = segment_insights(&ds, &schema, "delta");
        for row in &insights[0].top_segments {
            assert!(row.share_pct.is_finite());
        }
    }
}
