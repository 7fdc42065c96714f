//! Key-driver extraction and rule-based alerting.

use serde::{Deserialize, Serialize};

use crate::business::{BusinessSummary, ProfitLossBreakdown};
use crate::correlate::CorrelationInsight;
use crate::quality::DataQualitySummary;
use crate::trend::TrendInsight;

/// Minimum absolute correlation for a driver candidate.
const MIN_DRIVER_CORRELATION: f64 = 0.5;

/// Month-over-month drop (percent) that raises a critical alert.
const CRITICAL_DROP_PCT: f64 = -20.0;

/// Duplicate-rate threshold (percent) that raises a warning.
const DUPLICATE_WARN_PCT: f64 = 5.0;

/// Completeness threshold (percent) below which a warning is raised.
const COMPLETENESS_WARN_PCT: f64 = 80.0;

/// A factor identified as moving the primary KPI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDriver {
    /// The driving column or segment label.
    pub driver: String,
    /// The metric being driven.
    pub metric: String,
    /// Human-readable impact statement.
    pub impact: String,
    /// "positive" or "negative".
    pub direction: String,
    /// Where the driver came from: "correlation" or "segment_pnl".
    pub source: String,
}

/// Drivers grouped by the direction of their effect on the KPI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyDrivers {
    pub positive_drivers: Vec<KeyDriver>,
    pub negative_drivers: Vec<KeyDriver>,
}

/// A surfaced issue with a suggested action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightAlert {
    /// "critical", "warning", or "info".
    pub severity: String,
    pub title: String,
    pub description: String,
    pub action: String,
}

/// Derive key drivers of the primary KPI from correlations and the segment
/// P&L, de-duplicated by driver label and grouped by direction.
pub fn key_drivers(
    primary_kpi: Option<&str>,
    correlations: &[CorrelationInsight],
    breakdown: Option<&ProfitLossBreakdown>,
) -> KeyDrivers {
    let mut drivers: Vec<KeyDriver> = Vec::new();

    if let Some(kpi) = primary_kpi {
        for corr in correlations {
            let other = if corr.column_x == kpi {
                Some(corr.column_y.as_str())
            } else if corr.column_y == kpi {
                Some(corr.column_x.as_str())
            } else {
                None
            };
            let Some(other) = other else { continue };
            if corr.correlation.abs() < MIN_DRIVER_CORRELATION {
                continue;
            }

            drivers.push(KeyDriver {
                driver: other.to_string(),
                metric: kpi.to_string(),
                impact: format!(
                    "{other} shows a {} {} correlation ({:.4}) with {kpi}.",
                    corr.strength, corr.direction, corr.correlation
                ),
                direction: corr.direction.clone(),
                source: "correlation".to_string(),
            });
        }
    }

    if let Some(breakdown) = breakdown {
        for row in breakdown
            .top_profit_segments
            .iter()
            .chain(&breakdown.top_loss_segments)
        {
            let direction = if row.profit >= 0.0 {
                "positive"
            } else {
                "negative"
            };
            let verb = if row.profit >= 0.0 {
                "contributes"
            } else {
                "drags"
            };
            drivers.push(KeyDriver {
                driver: row.segment.clone(),
                metric: "profit".to_string(),
                impact: format!(
                    "{} segment \"{}\" {verb} {:.2} in profit.",
                    breakdown.segment_column, row.segment, row.profit
                ),
                direction: direction.to_string(),
                source: "segment_pnl".to_string(),
            });
        }
    }

    // De-duplicate by driver label, keeping the first (correlations first)
    let mut seen = std::collections::HashSet::new();
    drivers.retain(|d| seen.insert(d.driver.clone()));

    let (positive_drivers, negative_drivers) = drivers
        .into_iter()
        .partition(|d| d.direction == "positive");
    KeyDrivers {
        positive_drivers,
        negative_drivers,
    }
}

/// Evaluate the alert rules. Each rule contributes at most one alert.
pub fn build_alerts(
    business: &BusinessSummary,
    trend: Option<&TrendInsight>,
    quality: &DataQualitySummary,
) -> Vec<InsightAlert> {
    let mut alerts = Vec::new();

    if let Some(margin) = business.profit_margin_pct {
        if margin < 0.0 {
            alerts.push(InsightAlert {
                severity: "critical".to_string(),
                title: "Negative profit margin".to_string(),
                description: format!(
                    "The overall profit margin is {margin:.2}%: costs exceed revenue."
                ),
                action: "Review the largest loss-making segments and their cost structure."
                    .to_string(),
            });
        }
    }

    if let Some(trend) = trend {
        if let Some(growth) = trend.growth_pct {
            if growth <= CRITICAL_DROP_PCT {
                alerts.push(InsightAlert {
                    severity: "critical".to_string(),
                    title: format!("Sharp drop in {}", trend.metric_column),
                    description: format!(
                        "{} fell {:.2}% from the previous period ({} to {}).",
                        trend.metric_column,
                        growth.abs(),
                        trend.previous_value,
                        trend.latest_value
                    ),
                    action: "Investigate what changed in the most recent period.".to_string(),
                });
            }
        }
    }

    if quality.duplicate_pct > DUPLICATE_WARN_PCT {
        alerts.push(InsightAlert {
            severity: "warning".to_string(),
            title: "High duplicate rate".to_string(),
            description: format!(
                "{} rows ({:.2}%) are exact duplicates of earlier rows.",
                quality.duplicate_rows, quality.duplicate_pct
            ),
            action: "De-duplicate the upload; totals and averages may be inflated.".to_string(),
        });
    }

    if quality.completeness_pct > 0.0 && quality.completeness_pct < COMPLETENESS_WARN_PCT {
        alerts.push(InsightAlert {
            severity: "warning".to_string(),
            title: "Low data completeness".to_string(),
            description: format!(
                "Only {:.2}% of cells are populated.",
                quality.completeness_pct
            ),
            action: "Fill or drop sparse columns before relying on aggregates.".to_string(),
        });
    }

    if !quality.high_missing_columns.is_empty() {
        let names: Vec<&str> = quality
            .high_missing_columns
            .iter()
            .map(|c| c.column.as_str())
            .collect();
        alerts.push(InsightAlert {
            severity: "warning".to_string(),
            title: "Columns with heavy missing data".to_string(),
            description: format!(
                "{} column(s) exceed the missing-data threshold: {}.",
                names.len(),
                names.join(", ")
            ),
            action: "Check the export pipeline for these columns.".to_string(),
        });
    }

    alerts
}
