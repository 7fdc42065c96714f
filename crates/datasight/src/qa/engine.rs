//! Deterministic natural-language Q&A over analysis results.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::dataset::Dataset;
use crate::insights::{AnalystInsights, AnalyticsEngine};
use crate::llm::{EnrichmentFacts, NarrativeEnricher};

use super::intent::{classify_intent, QueryIntent};

/// Chart data attached to an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPayload {
    /// The field of each point used for the x axis.
    pub x_key: String,
    /// The fields of each point plotted as series.
    pub series: Vec<String>,
    /// One object per point, keyed by `x_key` and the series names.
    pub points: Vec<serde_json::Value>,
}

/// A complete answer to a natural-language question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystAnswer {
    /// The classified intent.
    pub intent: QueryIntent,
    /// The answer text. Enriched phrasing when an enricher is configured
    /// and succeeds, the deterministic text otherwise.
    pub answer: String,
    /// How the answer was computed, always deterministic.
    pub explanation: String,
    /// Optional chart for the answer.
    pub chart: Option<ChartPayload>,
    /// Suggested next steps.
    pub recommended_actions: Vec<String>,
}

/// Answers questions by routing intents to sections of a full analysis.
///
/// Numbers always come from the analytics engine. The optional enricher
/// only rewords prose and can never change or remove figures: when it
/// fails, the deterministic text is returned unchanged.
pub struct QaEngine {
    engine: AnalyticsEngine,
    enricher: Option<Box<dyn NarrativeEnricher>>,
}

impl QaEngine {
    /// Create a Q&A engine with no enricher.
    pub fn new() -> Self {
        Self {
            engine: AnalyticsEngine::new(),
            enricher: None,
        }
    }

    /// Attach a narrative enricher.
    pub fn with_enricher(mut self, enricher: Box<dyn NarrativeEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Answer a question about a dataset.
    pub fn answer(&self, dataset: &Dataset, prompt: &str) -> AnalystAnswer {
        let intent = classify_intent(prompt);
        let insights = self.engine.analyze(dataset);

        let mut answer = match intent {
            QueryIntent::ProfitDrop => answer_profit_drop(&insights),
            QueryIntent::SegmentLosses => answer_segment_losses(&insights),
            QueryIntent::TopSegments => answer_top_segments(&insights),
            QueryIntent::Trend => answer_trend(&insights),
            QueryIntent::DataQuality => answer_data_quality(&insights),
            QueryIntent::Summary => answer_summary(&insights),
        };
        answer.intent = intent;

        if let Some(enricher) = &self.enricher {
            let facts = EnrichmentFacts::new(prompt, answer.answer.clone())
                .with_facts(answer.recommended_actions.clone());
            match enricher.enrich(&facts) {
                Ok(narrative) if !narrative.trim().is_empty() => {
                    answer.answer = narrative;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(
                        enricher = enricher.name(),
                        error = %err,
                        "enrichment failed, returning deterministic answer"
                    );
                }
            }
        }

        answer
    }

    /// Questions worth asking, tailored to the dataset's shape.
    pub fn recommended_questions(&self, dataset: &Dataset) -> Vec<String> {
        let insights = self.engine.analyze(dataset);
        let mut questions = Vec::new();

        if insights.business_summary.profit_available {
            questions.push("Why did profit change in the latest period?".to_string());
            if insights.roles.segment.is_some() {
                questions.push("Which segments are losing money?".to_string());
            }
        }
        if let Some(metric) = insights
            .trend
            .as_ref()
            .map(|t| t.metric_column.clone())
        {
            questions.push(format!("How is {metric} trending month over month?"));
        }
        if !insights.segments.is_empty() {
            let col = insights.segments[0].segment_column.clone();
            questions.push(format!("What are the top {col} segments?"));
        }
        questions.push("How clean is this dataset?".to_string());
        questions.push("Give me a summary of this dataset.".to_string());

        questions
    }
}

impl Default for QaEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn no_chart(intent: QueryIntent, answer: String, explanation: &str) -> AnalystAnswer {
    AnalystAnswer {
        intent,
        answer,
        explanation: explanation.to_string(),
        chart: None,
        recommended_actions: Vec::new(),
    }
}

fn answer_profit_drop(insights: &AnalystInsights) -> AnalystAnswer {
    let business = &insights.business_summary;
    if !business.profit_available {
        return no_chart(
            QueryIntent::ProfitDrop,
            business.message.clone(),
            "No profit column was found and no revenue/cost pair exists to derive one.",
        );
    }

    let mut parts = vec![business.message.clone()];
    let mut chart = None;

    if let Some(simplified) = &insights.simplified_trend {
        let profit_points: Vec<(&str, f64)> = simplified
            .points
            .iter()
            .filter_map(|p| Some((p.period.as_str(), p.profit?)))
            .collect();

        if profit_points.len() >= 2 {
            let (latest_period, latest) = profit_points[profit_points.len() - 1];
            let (previous_period, previous) = profit_points[profit_points.len() - 2];
            let movement = if latest < previous { "fell" } else { "rose" };
            parts.push(format!(
                "Profit {movement} from {previous:.2} in {previous_period} to {latest:.2} \
                 in {latest_period}."
            ));
            chart = Some(pnl_chart(simplified));
        }
    }

    if let Some(breakdown) = &insights.profit_loss_breakdown {
        if let Some(worst) = breakdown.top_loss_segments.first() {
            parts.push(format!(
                "The biggest drag is the \"{}\" {} segment at {:.2}.",
                worst.segment, breakdown.segment_column, worst.profit
            ));
        }
    }

    let actions = insights
        .key_drivers
        .negative_drivers
        .iter()
        .map(|d| d.impact.clone())
        .take(3)
        .collect();

    AnalystAnswer {
        intent: QueryIntent::ProfitDrop,
        answer: parts.join(" "),
        explanation: "Compared monthly profit totals and ranked segment-level losses."
            .to_string(),
        chart,
        recommended_actions: actions,
    }
}

fn answer_segment_losses(insights: &AnalystInsights) -> AnalystAnswer {
    let Some(breakdown) = &insights.profit_loss_breakdown else {
        return no_chart(
            QueryIntent::SegmentLosses,
            "Losses by segment need both a profit measure and a segment column; this \
             dataset is missing one of them."
                .to_string(),
            "Profit/loss breakdown was unavailable for this dataset.",
        );
    };

    if breakdown.top_loss_segments.is_empty() {
        return no_chart(
            QueryIntent::SegmentLosses,
            breakdown.message.clone(),
            "Per-segment profit totals were computed; none are negative.",
        );
    }

    let losers: Vec<String> = breakdown
        .top_loss_segments
        .iter()
        .map(|s| format!("\"{}\" ({:.2})", s.segment, s.profit))
        .collect();
    let answer = format!(
        "{} Worst first: {}.",
        breakdown.message,
        losers.join(", ")
    );

    let points = breakdown
        .top_loss_segments
        .iter()
        .map(|s| json!({ "segment": s.segment, "profit": s.profit }))
        .collect();

    AnalystAnswer {
        intent: QueryIntent::SegmentLosses,
        answer,
        explanation: format!(
            "Summed profit per \"{}\" value and kept the negative totals.",
            breakdown.segment_column
        ),
        chart: Some(ChartPayload {
            x_key: "segment".to_string(),
            series: vec!["profit".to_string()],
            points,
        }),
        recommended_actions: vec![format!(
            "Review pricing and costs for the \"{}\" segments listed above.",
            breakdown.segment_column
        )],
    }
}

fn answer_top_segments(insights: &AnalystInsights) -> AnalystAnswer {
    let Some(insight) = insights.segments.first() else {
        return no_chart(
            QueryIntent::TopSegments,
            "No categorical column with a bounded number of groups was found to segment by."
                .to_string(),
            "Segment analysis requires a categorical column with 2 to 50 distinct values.",
        );
    };

    let listed: Vec<String> = insight
        .top_segments
        .iter()
        .map(|s| format!("\"{}\" ({:.2}, {:.2}%)", s.segment, s.sum, s.share_pct))
        .collect();
    let answer = format!(
        "Top {} by total {}: {}.",
        insight.segment_column,
        insight.metric_column,
        listed.join(", ")
    );

    let points = insight
        .top_segments
        .iter()
        .map(|s| json!({ "segment": s.segment, "value": s.sum }))
        .collect();

    AnalystAnswer {
        intent: QueryIntent::TopSegments,
        answer,
        explanation: format!(
            "Summed {} per \"{}\" value and ranked by total.",
            insight.metric_column, insight.segment_column
        ),
        chart: Some(ChartPayload {
            x_key: "segment".to_string(),
            series: vec!["value".to_string()],
            points,
        }),
        recommended_actions: Vec::new(),
    }
}

fn answer_trend(insights: &AnalystInsights) -> AnalystAnswer {
    let Some(trend) = &insights.trend else {
        return no_chart(
            QueryIntent::Trend,
            "No trend could be computed: the dataset needs a date column and at least \
             two months of paired metric values."
                .to_string(),
            "Trend detection requires 3 or more dated rows spanning 2 or more months.",
        );
    };

    let growth_text = match trend.growth_pct {
        Some(growth) => format!("{growth:.2}%"),
        None => "undefined (previous period total was zero)".to_string(),
    };
    let answer = format!(
        "{} is trending {} with month-over-month growth of {}. Latest period total: \
         {:.2}, previous: {:.2}.",
        trend.metric_column, trend.direction, growth_text, trend.latest_value,
        trend.previous_value
    );

    let chart = insights
        .simplified_trend
        .as_ref()
        .map(pnl_chart)
        .unwrap_or_else(|| ChartPayload {
            x_key: "period".to_string(),
            series: vec!["value".to_string()],
            points: trend
                .points
                .iter()
                .map(|p| json!({ "period": p.period, "value": p.value }))
                .collect(),
        });

    AnalystAnswer {
        intent: QueryIntent::Trend,
        answer,
        explanation: format!(
            "Bucketed {} by month of \"{}\" and compared the two most recent periods.",
            trend.metric_column, trend.date_column
        ),
        chart: Some(chart),
        recommended_actions: Vec::new(),
    }
}

fn answer_data_quality(insights: &AnalystInsights) -> AnalystAnswer {
    let quality = &insights.data_quality;
    let mut parts = vec![format!(
        "{:.2}% of cells are populated across {} rows and {} columns. {} rows \
         ({:.2}%) are exact duplicates.",
        quality.completeness_pct,
        quality.rows_analyzed,
        quality.columns_analyzed,
        quality.duplicate_rows,
        quality.duplicate_pct
    )];

    if !quality.high_missing_columns.is_empty() {
        let names: Vec<&str> = quality
            .high_missing_columns
            .iter()
            .map(|c| c.column.as_str())
            .collect();
        parts.push(format!(
            "Columns with heavy missing data: {}.",
            names.join(", ")
        ));
    }
    if !quality.inconsistent_categories.is_empty() {
        let cluster = &quality.inconsistent_categories[0];
        parts.push(format!(
            "Category spellings are inconsistent in \"{}\" (e.g. {}).",
            cluster.column,
            cluster.examples.join(" / ")
        ));
    }

    AnalystAnswer {
        intent: QueryIntent::DataQuality,
        answer: parts.join(" "),
        explanation: "Measured completeness, exact-duplicate rows, per-column missing \
                      rates, and category spelling variants."
            .to_string(),
        chart: None,
        recommended_actions: insights
            .recommendations
            .iter()
            .filter(|r| {
                r.contains("duplicate") || r.contains("empty") || r.contains("spellings")
            })
            .cloned()
            .collect(),
    }
}

fn answer_summary(insights: &AnalystInsights) -> AnalystAnswer {
    AnalystAnswer {
        intent: QueryIntent::Summary,
        answer: insights.executive_summary.clone(),
        explanation: "Combined row counts, profitability, trend, and leading-segment \
                      facts from the full analysis."
            .to_string(),
        chart: None,
        recommended_actions: insights.recommendations.clone(),
    }
}

fn pnl_chart(simplified: &crate::trend::SimplifiedTrend) -> ChartPayload {
    let mut series = Vec::new();
    if simplified.points.iter().any(|p| p.revenue.is_some()) {
        series.push("revenue".to_string());
    }
    if simplified.points.iter().any(|p| p.cost.is_some()) {
        series.push("cost".to_string());
    }
    if simplified.points.iter().any(|p| p.profit.is_some()) {
        series.push("profit".to_string());
    }

    let points = simplified
        .points
        .iter()
        .map(|p| {
            json!({
                "period": p.period,
                "revenue": p.revenue,
                "cost": p.cost,
                "profit": p.profit,
            })
        })
        .collect();

    ChartPayload {
        x_key: "period".to_string(),
        series,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::CellValue;
    use crate::llm::MockEnricher;

    fn sales_dataset() -> Dataset {
        let rows = vec![
            vec!["2024-01-05", "NY", "100", "60"],
            vec!["2024-01-20", "LA", "200", "150"],
            vec!["2024-02-10", "NY", "300", "210"],
            vec!["2024-02-15", "LA", "100", "180"],
        ];
        Dataset::new(
            vec![
                "order_date".to_string(),
                "region".to_string(),
                "revenue".to_string(),
                "cost".to_string(),
            ],
            rows.into_iter()
                .map(|r| r.into_iter().map(CellValue::from_text).collect())
                .collect(),
        )
    }

    #[test]
    fn test_losses_answer_names_segments() {
        let qa = QaEngine::new();
        let answer = qa.answer(&sales_dataset(), "Which regions are losing money?");

        assert_eq!(answer.intent, QueryIntent::SegmentLosses);
        assert!(answer.answer.contains("LA"));
        assert!(answer.chart.is_some());
    }

    #[test]
    fn test_trend_answer_has_chart() {
        let qa = QaEngine::new();
        let answer = qa.answer(&sales_dataset(), "How is revenue trending?");

        assert_eq!(answer.intent, QueryIntent::Trend);
        let chart = answer.chart.unwrap();
        assert_eq!(chart.x_key, "period");
        assert_eq!(chart.points.len(), 2);
    }

    #[test]
    fn test_trend_answer_without_dates() {
        let ds = Dataset::new(
            vec!["revenue".to_string()],
            vec![
                vec![CellValue::Number(1.0)],
                vec![CellValue::Number(2.0)],
            ],
        );
        let qa = QaEngine::new();
        let answer = qa.answer(&ds, "Show me the trend");

        assert!(answer.chart.is_none());
        assert!(answer.answer.contains("No trend"));
    }

    #[test]
    fn test_answers_are_deterministic() {
        let qa = QaEngine::new();
        let ds = sales_dataset();
        let a = serde_json::to_string(&qa.answer(&ds, "summary please")).unwrap();
        let b = serde_json::to_string(&qa.answer(&ds, "summary please")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_enricher_rewords_answer() {
        let qa = QaEngine::new().with_enricher(Box::new(MockEnricher::new()));
        let answer = qa.answer(&sales_dataset(), "give me a summary");
        assert!(answer.answer.starts_with("[enriched]"));
    }

    #[test]
    fn test_enricher_failure_falls_back() {
        let qa = QaEngine::new().with_enricher(Box::new(MockEnricher::failing()));
        let plain = QaEngine::new().answer(&sales_dataset(), "give me a summary");
        let enriched = qa.answer(&sales_dataset(), "give me a summary");
        assert_eq!(plain.answer, enriched.answer);
    }

    #[test]
    fn test_recommended_questions_shape_aware() {
        let qa = QaEngine::new();
        let questions = qa.recommended_questions(&sales_dataset());

        assert!(questions.iter().any(|q| q.contains("profit")));
        assert!(questions.iter().any(|q| q.contains("losing")));
        assert!(questions.iter().any(|q| q.contains("trending")));
        assert!(questions.iter().any(|q| q.contains("clean")));
    }
}
