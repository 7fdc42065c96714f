//! Profit & loss summaries built from assigned column roles.

use serde::{Deserialize, Serialize};

use crate::dataset::{CellValue, Dataset};
use crate::roles::RoleAssignment;
use crate::stats::{clean_label, round2};

/// Top segments kept on each side of the P&L breakdown.
const MAX_PNL_SEGMENTS: usize = 5;

/// Dataset-level P&L summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSummary {
    /// Whether profit could be computed at all.
    pub profit_available: bool,
    pub revenue_column: Option<String>,
    pub cost_column: Option<String>,
    pub profit_column: Option<String>,
    pub total_revenue: Option<f64>,
    pub total_cost: Option<f64>,
    pub total_profit: Option<f64>,
    /// Profit as a percent of revenue. Null when revenue is absent or zero.
    pub profit_margin_pct: Option<f64>,
    pub profit_rows: usize,
    pub loss_rows: usize,
    pub neutral_rows: usize,
    pub message: String,
}

/// One segment's P&L line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentPnl {
    pub segment: String,
    pub revenue: Option<f64>,
    pub cost: Option<f64>,
    pub profit: f64,
    pub margin_pct: Option<f64>,
    /// "profit", "loss", or "break_even".
    pub outcome: String,
}

/// Per-segment profit and loss, split into winners and losers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitLossBreakdown {
    pub segment_column: String,
    pub rows: Vec<SegmentPnl>,
    pub top_profit_segments: Vec<SegmentPnl>,
    pub top_loss_segments: Vec<SegmentPnl>,
    pub message: String,
}

/// Per-row profit values plus the columns they came from.
struct ProfitSeries {
    values: Vec<Option<f64>>,
    revenue: Vec<Option<f64>>,
    cost: Vec<Option<f64>>,
}

/// Build the dataset-level P&L summary. A direct profit column wins over
/// a derived revenue-minus-cost series.
pub fn business_summary(dataset: &Dataset, roles: &RoleAssignment) -> BusinessSummary {
    let Some(series) = profit_series(dataset, roles) else {
        return BusinessSummary {
            profit_available: false,
            revenue_column: roles.revenue.clone(),
            cost_column: roles.cost.clone(),
            profit_column: roles.profit.clone(),
            total_revenue: column_total(dataset, roles.revenue.as_deref()),
            total_cost: column_total(dataset, roles.cost.as_deref()),
            total_profit: None,
            profit_margin_pct: None,
            profit_rows: 0,
            loss_rows: 0,
            neutral_rows: 0,
            message: "Profitability could not be computed: no profit column was found and \
                      the dataset lacks a revenue/cost pair to derive one."
                .to_string(),
        };
    };

    let mut profit_rows = 0usize;
    let mut loss_rows = 0usize;
    let mut neutral_rows = 0usize;
    let mut total_profit = 0.0f64;

    for value in series.values.iter().flatten() {
        total_profit += value;
        if *value > 0.0 {
            profit_rows += 1;
        } else if *value < 0.0 {
            loss_rows += 1;
        } else {
            neutral_rows += 1;
        }
    }

    let total_revenue = sum_present(&series.revenue);
    let total_cost = sum_present(&series.cost);
    let total_profit = round2(total_profit);

    let profit_margin_pct = match total_revenue {
        Some(revenue) if revenue > 0.0 => Some(round2(total_profit / revenue * 100.0)),
        _ => None,
    };

    let message = if total_profit > 0.0 {
        format!(
            "The business is profitable overall with a total profit of {total_profit:.2}."
        )
    } else if total_profit < 0.0 {
        format!(
            "The business is losing money overall with a total loss of {:.2}.",
            total_profit.abs()
        )
    } else {
        "The business is breaking even overall.".to_string()
    };

    BusinessSummary {
        profit_available: true,
        revenue_column: roles.revenue.clone(),
        cost_column: roles.cost.clone(),
        profit_column: roles.profit.clone(),
        total_revenue,
        total_cost,
        total_profit: Some(total_profit),
        profit_margin_pct,
        profit_rows,
        loss_rows,
        neutral_rows,
        message,
    }
}

/// Break profit down by the assigned segment column. Requires a profit
/// series and a segment column.
pub fn profit_loss_breakdown(
    dataset: &Dataset,
    roles: &RoleAssignment,
) -> Option<ProfitLossBreakdown> {
    let segment_column = roles.segment.as_deref()?;
    let segment_pos = dataset.column_position(segment_column)?;
    let series = profit_series(dataset, roles)?;

    // label -> (profit, revenue sum + presence, cost sum + presence)
    struct Acc {
        profit: f64,
        revenue: f64,
        has_revenue: bool,
        cost: f64,
        has_cost: bool,
    }
    let mut groups: indexmap::IndexMap<String, Acc> = indexmap::IndexMap::new();

    for (row_idx, value) in series.values.iter().enumerate() {
        let Some(profit) = value else { continue };
        let label = match dataset.get(row_idx, segment_pos) {
            Some(CellValue::Null) | None => clean_label(None),
            Some(cell) => clean_label(cell.as_text()),
        };
        let acc = groups.entry(label).or_insert(Acc {
            profit: 0.0,
            revenue: 0.0,
            has_revenue: false,
            cost: 0.0,
            has_cost: false,
        });
        acc.profit += profit;
        if let Some(r) = series.revenue.get(row_idx).copied().flatten() {
            acc.revenue += r;
            acc.has_revenue = true;
        }
        if let Some(c) = series.cost.get(row_idx).copied().flatten() {
            acc.cost += c;
            acc.has_cost = true;
        }
    }

    if groups.is_empty() {
        return None;
    }

    let mut rows: Vec<SegmentPnl> = groups
        .into_iter()
        .map(|(segment, acc)| {
            let profit = round2(acc.profit);
            let revenue = acc.has_revenue.then(|| round2(acc.revenue));
            let margin_pct = match revenue {
                Some(r) if r > 0.0 => Some(round2(profit / r * 100.0)),
                _ => None,
            };
            SegmentPnl {
                segment,
                revenue,
                cost: acc.has_cost.then(|| round2(acc.cost)),
                profit,
                margin_pct,
                outcome: if profit > 0.0 {
                    "profit"
                } else if profit < 0.0 {
                    "loss"
                } else {
                    "break_even"
                }
                .to_string(),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.profit
            .partial_cmp(&a.profit)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let top_profit_segments: Vec<SegmentPnl> = rows
        .iter()
        .filter(|r| r.profit > 0.0)
        .take(MAX_PNL_SEGMENTS)
        .cloned()
        .collect();
    let mut top_loss_segments: Vec<SegmentPnl> = rows
        .iter()
        .filter(|r| r.profit < 0.0)
        .cloned()
        .collect();
    top_loss_segments.sort_by(|a, b| {
        a.profit
            .partial_cmp(&b.profit)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let loss_count = top_loss_segments.len();
    top_loss_segments.truncate(MAX_PNL_SEGMENTS);

    let message = if loss_count == 0 {
        format!("Every {segment_column} segment is profitable or breaking even.")
    } else {
        format!(
            "{loss_count} of {} {segment_column} segments are losing money.",
            rows.len()
        )
    };

    Some(ProfitLossBreakdown {
        segment_column: segment_column.to_string(),
        rows,
        top_profit_segments,
        top_loss_segments,
        message,
    })
}

/// Per-row profit series. Direct profit column wins; otherwise derived
/// from revenue minus cost where both sides are present.
fn profit_series(dataset: &Dataset, roles: &RoleAssignment) -> Option<ProfitSeries> {
    let revenue = roles
        .revenue
        .as_deref()
        .and_then(|c| dataset.column_position(c))
        .map(|p| dataset.numeric_column(p))
        .unwrap_or_else(|| vec![None; dataset.row_count()]);
    let cost = roles
        .cost
        .as_deref()
        .and_then(|c| dataset.column_position(c))
        .map(|p| dataset.numeric_column(p))
        .unwrap_or_else(|| vec![None; dataset.row_count()]);

    if let Some(profit_pos) = roles
        .profit
        .as_deref()
        .and_then(|c| dataset.column_position(c))
    {
        return Some(ProfitSeries {
            values: dataset.numeric_column(profit_pos),
            revenue,
            cost,
        });
    }

    if roles.revenue.is_none() || roles.cost.is_none() {
        return None;
    }

    let values = revenue
        .iter()
        .zip(&cost)
        .map(|(r, c)| match (r, c) {
            (Some(r), Some(c)) => Some(r - c),
            _ => None,
        })
        .collect();

    Some(ProfitSeries {
        values,
        revenue,
        cost,
    })
}

fn sum_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().copied().flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(round2(present.iter().sum()))
    }
}

fn column_total(dataset: &Dataset, column: Option<&str>) -> Option<f64> {
    let pos = dataset.column_position(column?)?;
    sum_present(&dataset.numeric_column(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaInferencer;

    fn setup(columns: Vec<&str>, rows: Vec<Vec<&str>>) -> (Dataset, RoleAssignment) {
        let ds = Dataset::new(
            columns.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(CellValue::from_text).collect())
                .collect(),
        );
        let schema = SchemaInferencer::new().infer(&ds);
        let roles = RoleAssignment::assign(&schema);
        (ds, roles)
    }

    #[test]
    fn test_summary_from_revenue_and_cost() {
        let (ds, roles) = setup(
            vec!["revenue", "cost"],
            vec![vec!["100", "70"], vec!["200", "140"]],
        );
        let summary = business_summary(&ds, &roles);

        assert!(summary.profit_available);
        assert_eq!(summary.total_revenue, Some(300.0));
        assert_eq!(summary.total_cost, Some(210.0));
        assert_eq!(summary.total_profit, Some(90.0));
        assert_eq!(summary.profit_margin_pct, Some(30.0));
        assert_eq!(summary.profit_rows, 2);
        assert_eq!(summary.loss_rows, 0);
    }

    #[test]
    fn test_summary_prefers_direct_profit_column() {
        let (ds, roles) = setup(
            vec!["revenue", "cost", "profit"],
            vec![vec!["100", "70", "25"], vec!["200", "140", "55"]],
        );
        let summary = business_summary(&ds, &roles);

        assert_eq!(summary.profit_column.as_deref(), Some("profit"));
        assert_eq!(summary.total_profit, Some(80.0));
    }

    #[test]
    fn test_summary_unavailable_without_cost() {
        let (ds, roles) = setup(vec!["revenue"], vec![vec!["100"], vec!["200"]]);
        let summary = business_summary(&ds, &roles);

        assert!(!summary.profit_available);
        assert_eq!(summary.total_revenue, Some(300.0));
        assert_eq!(summary.total_profit, None);
        assert_eq!(summary.profit_margin_pct, None);
    }

    #[test]
    fn test_row_classification() {
        let (ds, roles) = setup(
            vec!["revenue", "cost"],
            vec![
                vec!["100", "70"],
                vec!["50", "80"],
                vec!["60", "60"],
            ],
        );
        let summary = business_summary(&ds, &roles);

        assert_eq!(summary.profit_rows, 1);
        assert_eq!(summary.loss_rows, 1);
        assert_eq!(summary.neutral_rows, 1);
    }

    #[test]
    fn test_margin_null_when_revenue_zero() {
        let (ds, roles) = setup(
            vec!["revenue", "cost"],
            vec![vec!["50", "10"], vec!["-50", "20"]],
        );
        let summary = business_summary(&ds, &roles);
        assert_eq!(summary.profit_margin_pct, None);
    }

    #[test]
    fn test_breakdown_splits_winners_and_losers() {
        let (ds, roles) = setup(
            vec!["region", "revenue", "cost"],
            vec![
                vec!["NY", "100", "60"],
                vec!["NY", "100", "70"],
                vec!["LA", "50", "90"],
                vec!["SF", "80", "80"],
            ],
        );
        let breakdown = profit_loss_breakdown(&ds, &roles).unwrap();

        assert_eq!(breakdown.segment_column, "region");
        assert_eq!(breakdown.top_profit_segments.len(), 1);
        assert_eq!(breakdown.top_profit_segments[0].segment, "NY");
        assert_eq!(breakdown.top_profit_segments[0].profit, 70.0);
        assert_eq!(breakdown.top_loss_segments.len(), 1);
        assert_eq!(breakdown.top_loss_segments[0].segment, "LA");
        assert_eq!(breakdown.top_loss_segments[0].profit, -40.0);

        let sf = breakdown
            .rows
            .iter()
            .find(|r| r.segment == "SF")
            .unwrap();
        assert_eq!(sf.outcome, "break_even");
    }

    #[test]
    fn test_breakdown_margin_per_segment() {
        let (ds, roles) = setup(
            vec!["region", "revenue", "cost"],
            vec![vec!["NY", "200", "150"], vec!["LA", "100", "90"]],
        );
        let breakdown = profit_loss_breakdown(&ds, &roles).unwrap();

        let ny = breakdown.rows.iter().find(|r| r.segment == "NY").unwrap();
        assert_eq!(ny.margin_pct, Some(25.0));
    }

    #[test]
    fn test_breakdown_none_without_segment() {
        let (ds, roles) = setup(
            vec!["revenue", "cost"],
            vec![vec!["100", "60"], vec!["50", "90"]],
        );
        assert!(profit_loss_breakdown(&ds, &roles).is_none());
    }
}
