//! The analytics engine: one deterministic pass over a dataset producing
//! the full insight payload.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::business::{business_summary, profit_loss_breakdown, BusinessSummary, ProfitLossBreakdown};
use crate::correlate::{segment_insights, top_correlations, CorrelationInsight, SegmentInsight};
use crate::dataset::Dataset;
use crate::drivers::{build_alerts, key_drivers, InsightAlert, KeyDrivers};
use crate::quality::{analyze_quality, DataQualitySummary};
use crate::roles::RoleAssignment;
use crate::schema::{SchemaInferencer, TableSchema};
use crate::stats::{
    basic_stats, categorical_profiles, numeric_profiles, round4, BasicStats, CategoricalProfile,
    NumericProfile,
};
use crate::trend::{detect_trend, simplified_trend, SimplifiedTrend, TrendInsight};

/// Maximum recommendations returned.
const MAX_RECOMMENDATIONS: usize = 6;

/// Engine tunables. Defaults match the service configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Row cap applied before analysis; uploads beyond this are truncated.
    pub max_analysis_rows: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_analysis_rows: 2500,
        }
    }
}

/// Headline KPI figures derived from column roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kpis {
    pub revenue_column: Option<String>,
    pub total_revenue: Option<f64>,
    pub quantity_column: Option<String>,
    pub total_quantity: Option<f64>,
    /// Revenue divided by quantity, when both are present and quantity is
    /// non-zero.
    pub avg_value_per_unit: Option<f64>,
}

/// The complete analysis payload for one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystInsights {
    pub row_count: usize,
    pub column_count: usize,
    pub schema: TableSchema,
    pub roles: RoleAssignment,
    pub column_stats: IndexMap<String, BasicStats>,
    pub numeric_profiles: Vec<NumericProfile>,
    pub categorical_profiles: Vec<CategoricalProfile>,
    pub data_quality: DataQualitySummary,
    pub top_correlations: Vec<CorrelationInsight>,
    pub segments: Vec<SegmentInsight>,
    pub trend: Option<TrendInsight>,
    pub simplified_trend: Option<SimplifiedTrend>,
    pub business_summary: BusinessSummary,
    pub profit_loss_breakdown: Option<ProfitLossBreakdown>,
    pub key_drivers: KeyDrivers,
    pub alerts: Vec<InsightAlert>,
    pub kpis: Kpis,
    pub executive_summary: String,
    pub recommendations: Vec<String>,
}

impl AnalystInsights {
    /// The empty-state payload for a dataset with no rows.
    pub fn empty() -> Self {
        Self {
            row_count: 0,
            column_count: 0,
            schema: TableSchema::with_columns(Vec::new()),
            roles: RoleAssignment::default(),
            column_stats: IndexMap::new(),
            numeric_profiles: Vec::new(),
            categorical_profiles: Vec::new(),
            data_quality: DataQualitySummary::empty(),
            top_correlations: Vec::new(),
            segments: Vec::new(),
            trend: None,
            simplified_trend: None,
            business_summary: BusinessSummary {
                profit_available: false,
                revenue_column: None,
                cost_column: None,
                profit_column: None,
                total_revenue: None,
                total_cost: None,
                total_profit: None,
                profit_margin_pct: None,
                profit_rows: 0,
                loss_rows: 0,
                neutral_rows: 0,
                message: "No rows to analyze.".to_string(),
            },
            profit_loss_breakdown: None,
            key_drivers: KeyDrivers::default(),
            alerts: Vec::new(),
            kpis: Kpis {
                revenue_column: None,
                total_revenue: None,
                quantity_column: None,
                total_quantity: None,
                avg_value_per_unit: None,
            },
            executive_summary: "The dataset is empty; upload rows to generate insights."
                .to_string(),
            recommendations: vec!["Upload a dataset with at least one row of data.".to_string()],
        }
    }
}

/// Stateless analytics engine. The same dataset always produces the same
/// payload byte for byte.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: EngineConfig,
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run the full analysis pass.
    pub fn analyze(&self, dataset: &Dataset) -> AnalystInsights {
        if dataset.row_count() == 0 || dataset.column_count() == 0 {
            return AnalystInsights::empty();
        }

        let dataset = dataset.sample(self.config.max_analysis_rows);
        let schema = SchemaInferencer::new().infer(&dataset);
        // Roles are assigned once so every section reports the same columns
        let roles = RoleAssignment::assign(&schema);

        let column_stats = basic_stats(&dataset, &schema);
        let numeric_profiles = numeric_profiles(&dataset, &schema);
        let categorical_profiles = categorical_profiles(&dataset, &schema);
        let data_quality = analyze_quality(&dataset, &schema);
        let top_correlations = top_correlations(&dataset, &schema);

        let segments = roles
            .growth_metric(&schema)
            .map(|metric| segment_insights(&dataset, &schema, metric))
            .unwrap_or_default();

        let trend = detect_trend(&dataset, &schema, &roles);
        let simplified = trend
            .as_ref()
            .map(|t| simplified_trend(&dataset, &roles, t));

        let business = business_summary(&dataset, &roles);
        let breakdown = profit_loss_breakdown(&dataset, &roles);

        let drivers = key_drivers(
            roles.primary_kpi(&schema),
            &top_correlations,
            breakdown.as_ref(),
        );
        let alerts = build_alerts(&business, trend.as_ref(), &data_quality);
        let kpis = build_kpis(&roles, &dataset);

        let executive_summary =
            executive_summary(&dataset, &business, trend.as_ref(), &segments);
        let recommendations =
            recommendations(&data_quality, &business, trend.as_ref(), breakdown.as_ref());

        AnalystInsights {
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            schema,
            roles,
            column_stats,
            numeric_profiles,
            categorical_profiles,
            data_quality,
            top_correlations,
            segments,
            trend,
            simplified_trend: simplified,
            business_summary: business,
            profit_loss_breakdown: breakdown,
            key_drivers: drivers,
            alerts,
            kpis,
            executive_summary,
            recommendations,
        }
    }
}

fn build_kpis(roles: &RoleAssignment, dataset: &Dataset) -> Kpis {
    let total = |column: &Option<String>| -> Option<f64> {
        let name = column.as_deref()?;
        // Stats carry avg; totals need the raw sum
        let pos = dataset.column_position(name)?;
        let values: Vec<f64> = dataset
            .numeric_column(pos)
            .into_iter()
            .flatten()
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(crate::stats::round2(values.iter().sum()))
        }
    };

    let total_revenue = total(&roles.revenue);
    let total_quantity = total(&roles.quantity);
    let avg_value_per_unit = match (total_revenue, total_quantity) {
        (Some(revenue), Some(quantity)) if quantity != 0.0 => Some(round4(revenue / quantity)),
        _ => None,
    };

    Kpis {
        revenue_column: roles.revenue.clone(),
        total_revenue,
        quantity_column: roles.quantity.clone(),
        total_quantity,
        avg_value_per_unit,
    }
}

fn executive_summary(
    dataset: &Dataset,
    business: &BusinessSummary,
    trend: Option<&TrendInsight>,
    segments: &[SegmentInsight],
) -> String {
    let mut parts = vec![format!(
        "Analyzed {} rows across {} columns.",
        dataset.row_count(),
        dataset.column_count()
    )];

    if business.profit_available {
        parts.push(business.message.clone());
    }

    if let Some(trend) = trend {
        match trend.growth_pct {
            Some(growth) => parts.push(format!(
                "{} moved {:.2}% month over month ({}).",
                trend.metric_column, growth, trend.direction
            )),
            None => parts.push(format!(
                "{} changed direction but the previous period total was zero, so the \
                 growth rate is undefined.",
                trend.metric_column
            )),
        }
    }

    if let Some(top) = segments.first().and_then(|s| s.top_segments.first()) {
        let insight = &segments[0];
        parts.push(format!(
            "\"{}\" leads {} with {:.2} of {} ({:.2}% of the total).",
            top.segment, insight.segment_column, top.sum, insight.metric_column, top.share_pct
        ));
    }

    parts.join(" ")
}

fn recommendations(
    quality: &DataQualitySummary,
    business: &BusinessSummary,
    trend: Option<&TrendInsight>,
    breakdown: Option<&ProfitLossBreakdown>,
) -> Vec<String> {
    let mut recs = Vec::new();

    if quality.duplicate_rows > 0 {
        recs.push(format!(
            "Remove {} duplicate rows to avoid inflating totals.",
            quality.duplicate_rows
        ));
    }

    for col in &quality.high_missing_columns {
        recs.push(format!(
            "Column '{}' is {:.2}% empty; fill it or exclude it from analysis.",
            col.column, col.missing_pct
        ));
        if recs.len() >= MAX_RECOMMENDATIONS {
            return recs;
        }
    }

    if !quality.inconsistent_categories.is_empty() {
        let cluster = &quality.inconsistent_categories[0];
        recs.push(format!(
            "Standardize category spellings in '{}' (e.g. {}).",
            cluster.column,
            cluster.examples.join(" / ")
        ));
    }

    if let Some(breakdown) = breakdown {
        if let Some(worst) = breakdown.top_loss_segments.first() {
            recs.push(format!(
                "Investigate the '{}' segment: it lost {:.2} in this dataset.",
                worst.segment,
                worst.profit.abs()
            ));
        }
    }

    if let Some(trend) = trend {
        if let Some(growth) = trend.growth_pct {
            if growth < 0.0 {
                recs.push(format!(
                    "{} declined {:.2}% in the latest period; compare against the prior \
                     period's activity.",
                    trend.metric_column,
                    growth.abs()
                ));
            }
        }
    }

    if recs.is_empty() {
        let subject = if business.profit_available {
            "margins and segment mix"
        } else {
            "key metrics"
        };
        recs.push(format!(
            "No pressing issues detected. Keep monitoring {subject} as new data arrives."
        ));
    }

    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}
