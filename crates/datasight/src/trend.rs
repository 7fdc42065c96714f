//! Time-series trend detection over monthly buckets.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::{month_key, Dataset};
use crate::roles::RoleAssignment;
use crate::schema::TableSchema;
use crate::stats::round2;

/// Minimum paired date/metric rows for a trend.
const MIN_TREND_ROWS: usize = 3;

/// Minimum distinct periods for a trend.
const MIN_TREND_PERIODS: usize = 2;

/// Chart points kept (most recent periods).
const MAX_TREND_POINTS: usize = 12;

/// One monthly data point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Period key, "YYYY-MM".
    pub period: String,
    pub value: f64,
}

/// Month-over-month movement of a metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendInsight {
    pub date_column: String,
    pub metric_column: String,
    pub latest_value: f64,
    pub previous_value: f64,
    /// Percent change from previous to latest period. Null when the
    /// previous period total is zero.
    pub growth_pct: Option<f64>,
    /// "up", "down", or "flat".
    pub direction: String,
    pub points: Vec<TrendPoint>,
}

/// One period of the revenue/cost/profit series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnlPoint {
    pub period: String,
    pub revenue: Option<f64>,
    pub cost: Option<f64>,
    pub profit: Option<f64>,
}

/// Compact trend payload for chart rendering and narrative answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedTrend {
    pub date_column: String,
    pub growth_metric: String,
    pub growth_pct: Option<f64>,
    pub points: Vec<PnlPoint>,
}

/// Detect the monthly trend of the growth metric against the assigned date
/// column. Returns `None` when the dataset lacks enough dated rows or
/// spans fewer than two periods.
pub fn detect_trend(
    dataset: &Dataset,
    schema: &TableSchema,
    roles: &RoleAssignment,
) -> Option<TrendInsight> {
    let date_column = roles.date.as_deref()?;
    let metric_column = roles.growth_metric(schema)?;

    let totals = monthly_totals(dataset, date_column, metric_column)?;
    if totals.len() < MIN_TREND_PERIODS {
        return None;
    }

    let points: Vec<TrendPoint> = totals
        .iter()
        .rev()
        .take(MAX_TREND_POINTS)
        .rev()
        .map(|(period, value)| TrendPoint {
            period: period.clone(),
            value: round2(*value),
        })
        .collect();

    let latest = points[points.len() - 1].value;
    let previous = points[points.len() - 2].value;
    let growth_pct = if previous == 0.0 {
        None
    } else {
        Some(round2((latest - previous) / previous.abs() * 100.0))
    };

    // Zero growth still counts as holding, not declining
    let direction = match growth_pct {
        Some(g) if g >= 0.0 => "up",
        Some(_) => "down",
        None => {
            if latest > previous {
                "up"
            } else if latest < previous {
                "down"
            } else {
                "flat"
            }
        }
    };

    Some(TrendInsight {
        date_column: date_column.to_string(),
        metric_column: metric_column.to_string(),
        latest_value: latest,
        previous_value: previous,
        growth_pct,
        direction: direction.to_string(),
        points,
    })
}

/// Build the per-period revenue/cost/profit series. Present whenever a
/// trend is; metric series without an assigned column stay null.
pub fn simplified_trend(
    dataset: &Dataset,
    roles: &RoleAssignment,
    trend: &TrendInsight,
) -> SimplifiedTrend {
    let revenue = roles
        .revenue
        .as_deref()
        .and_then(|col| monthly_totals(dataset, &trend.date_column, col));
    let cost = roles
        .cost
        .as_deref()
        .and_then(|col| monthly_totals(dataset, &trend.date_column, col));
    let profit = roles
        .profit
        .as_deref()
        .and_then(|col| monthly_totals(dataset, &trend.date_column, col));

    let points = trend
        .points
        .iter()
        .map(|p| {
            let lookup = |series: &Option<IndexMap<String, f64>>| {
                series
                    .as_ref()
                    .and_then(|m| m.get(&p.period))
                    .map(|v| round2(*v))
            };
            let revenue_val = lookup(&revenue);
            let cost_val = lookup(&cost);
            // Derive profit when no direct column exists but both sides do
            let profit_val = lookup(&profit).or_else(|| match (revenue_val, cost_val) {
                (Some(r), Some(c)) => Some(round2(r - c)),
                _ => None,
            });
            PnlPoint {
                period: p.period.clone(),
                revenue: revenue_val,
                cost: cost_val,
                profit: profit_val,
            }
        })
        .collect();

    SimplifiedTrend {
        date_column: trend.date_column.clone(),
        growth_metric: trend.metric_column.clone(),
        growth_pct: trend.growth_pct,
        points,
    }
}

/// Sum a metric into monthly buckets keyed "YYYY-MM", sorted by period.
/// Returns `None` below the minimum row count.
fn monthly_totals(
    dataset: &Dataset,
    date_column: &str,
    metric_column: &str,
) -> Option<IndexMap<String, f64>> {
    let date_pos = dataset.column_position(date_column)?;
    let metric_pos = dataset.column_position(metric_column)?;
    let metric_values = dataset.numeric_column(metric_pos);

    let mut totals: IndexMap<String, f64> = IndexMap::new();
    let mut paired_rows = 0usize;

    for (row_idx, cell) in dataset.column_values(date_pos).enumerate() {
        let Some(date) = cell.as_date() else { continue };
        let Some(value) = metric_values.get(row_idx).copied().flatten() else {
            continue;
        };
        paired_rows += 1;
        *totals.entry(month_key(date)).or_insert(0.0) += value;
    }

    if paired_rows < MIN_TREND_ROWS {
        return None;
    }

    totals.sort_keys();
    Some(totals)
}
