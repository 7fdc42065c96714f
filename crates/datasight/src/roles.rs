//! Heuristic column-role assignment.
//!
//! Roles map a business meaning (revenue, cost, profit, segment, date) to a
//! concrete column, chosen once per computation so every consumer of one
//! response reports the same columns. The matching policy is a prioritized
//! rule list over name substrings, kept as plain data so it is testable on
//! its own.

use serde::{Deserialize, Serialize};

use crate::schema::{ColumnRole, ColumnType, TableSchema};

/// A name-substring rule mapping matched columns to a role.
#[derive(Debug, Clone)]
pub struct RoleRule {
    /// The role this rule assigns.
    pub role: ColumnRole,
    /// Substrings matched against the lowercased column name, in priority order.
    pub tokens: &'static [&'static str],
    /// Required column type for a match.
    pub required_type: ColumnType,
}

/// The default rule list, in priority order. First match per role wins.
pub fn default_rules() -> Vec<RoleRule> {
    vec![
        RoleRule {
            role: ColumnRole::Profit,
            tokens: &["profit", "margin", "net"],
            required_type: ColumnType::Numeric,
        },
        RoleRule {
            role: ColumnRole::Revenue,
            tokens: &["revenue", "sales", "income", "turnover", "gmv", "amount"],
            required_type: ColumnType::Numeric,
        },
        RoleRule {
            role: ColumnRole::Cost,
            tokens: &["cost", "expense", "spend", "cogs"],
            required_type: ColumnType::Numeric,
        },
        RoleRule {
            role: ColumnRole::Quantity,
            tokens: &["quantity", "qty", "units", "orders", "volume"],
            required_type: ColumnType::Numeric,
        },
    ]
}

/// Name tokens that make a categorical column a preferred segment.
pub const SEGMENT_NAME_TOKENS: &[&str] = &[
    "segment", "region", "category", "product", "channel", "department", "market", "country",
    "city",
];

/// Maximum distinct values for a column to qualify as a segment.
pub const SEGMENT_MAX_CARDINALITY: usize = 50;

/// Role assignments for one computation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub revenue: Option<String>,
    pub cost: Option<String>,
    pub profit: Option<String>,
    pub quantity: Option<String>,
    pub date: Option<String>,
    pub segment: Option<String>,
}

impl RoleAssignment {
    /// Assign roles for a schema using the default rules.
    pub fn assign(schema: &TableSchema) -> Self {
        Self::assign_with_rules(schema, &default_rules())
    }

    /// Assign roles using an explicit rule list.
    pub fn assign_with_rules(schema: &TableSchema, rules: &[RoleRule]) -> Self {
        let mut assignment = RoleAssignment::default();

        for rule in rules {
            let matched = schema
                .columns
                .iter()
                .filter(|c| c.inferred_type == rule.required_type)
                .find(|c| {
                    let lower = c.name.to_lowercase();
                    rule.tokens.iter().any(|token| lower.contains(token))
                })
                .map(|c| c.name.clone());

            let slot = match rule.role {
                ColumnRole::Revenue => &mut assignment.revenue,
                ColumnRole::Cost => &mut assignment.cost,
                ColumnRole::Profit => &mut assignment.profit,
                ColumnRole::Quantity => &mut assignment.quantity,
                ColumnRole::Date => &mut assignment.date,
                ColumnRole::Segment => &mut assignment.segment,
            };
            if slot.is_none() {
                *slot = matched;
            }
        }

        assignment.date = pick_date_column(schema);
        assignment.segment = pick_segment_column(schema);
        assignment
    }

    /// The metric used for trend growth: revenue role, else first numeric.
    pub fn growth_metric<'a>(&'a self, schema: &'a TableSchema) -> Option<&'a str> {
        if let Some(ref revenue) = self.revenue {
            return Some(revenue.as_str());
        }
        schema.numeric_columns().first().map(|c| c.name.as_str())
    }

    /// The primary KPI column for driver analysis: profit, else revenue,
    /// else first numeric.
    pub fn primary_kpi<'a>(&'a self, schema: &'a TableSchema) -> Option<&'a str> {
        if let Some(ref profit) = self.profit {
            return Some(profit.as_str());
        }
        self.growth_metric(schema)
    }
}

/// Date column: the date-typed column with the most non-null values,
/// preferring name-hinted columns; ties resolve to table order.
fn pick_date_column(schema: &TableSchema) -> Option<String> {
    let dates = schema.date_columns();
    if dates.is_empty() {
        return None;
    }

    let hinted = dates
        .iter()
        .filter(|c| crate::schema::has_date_name_hint(&c.name))
        .max_by_key(|c| c.non_null_count);
    if let Some(col) = hinted {
        return Some(col.name.clone());
    }

    dates
        .iter()
        .max_by_key(|c| c.non_null_count)
        .map(|c| c.name.clone())
}

/// Segment column: bounded-cardinality categorical, preferring name-hinted
/// columns, else the first qualifying column in table order.
fn pick_segment_column(schema: &TableSchema) -> Option<String> {
    let candidates: Vec<_> = schema
        .categorical_columns()
        .into_iter()
        .filter(|c| c.unique_count >= 2 && c.unique_count <= SEGMENT_MAX_CARDINALITY)
        .collect();

    let hinted = candidates.iter().find(|c| {
        let lower = c.name.to_lowercase();
        SEGMENT_NAME_TOKENS.iter().any(|token| lower.contains(token))
    });

    hinted
        .or_else(|| candidates.first())
        .map(|c| c.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{CellValue, Dataset};
    use crate::schema::SchemaInferencer;

    fn schema_for(columns: Vec<&str>, rows: Vec<Vec<&str>>) -> TableSchema {
        let ds = Dataset::new(
            columns.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(CellValue::from_text).collect())
                .collect(),
        );
        SchemaInferencer::new().infer(&ds)
    }

    #[test]
    fn test_assigns_revenue_cost_profit() {
        let schema = schema_for(
            vec!["total_sales", "unit_cost", "net_profit", "region"],
            vec![
                vec!["100", "60", "40", "NY"],
                vec!["200", "150", "50", "LA"],
            ],
        );
        let roles = RoleAssignment::assign(&schema);

        assert_eq!(roles.revenue.as_deref(), Some("total_sales"));
        assert_eq!(roles.cost.as_deref(), Some("unit_cost"));
        assert_eq!(roles.profit.as_deref(), Some("net_profit"));
        assert_eq!(roles.segment.as_deref(), Some("region"));
    }

    #[test]
    fn test_first_match_wins() {
        let schema = schema_for(
            vec!["gross_revenue", "sales_total"],
            vec![vec!["1", "2"], vec!["3", "4"]],
        );
        let roles = RoleAssignment::assign(&schema);
        assert_eq!(roles.revenue.as_deref(), Some("gross_revenue"));
    }

    #[test]
    fn test_roles_may_stay_unassigned() {
        let schema = schema_for(vec!["a", "b"], vec![vec!["1", "2"], vec!["3", "4"]]);
        let roles = RoleAssignment::assign(&schema);

        assert!(roles.revenue.is_none());
        assert!(roles.cost.is_none());
        assert!(roles.profit.is_none());
    }

    #[test]
    fn test_segment_requires_at_least_two_groups() {
        let schema = schema_for(
            vec!["status"],
            vec![vec!["active"], vec!["active"], vec!["active"]],
        );
        let roles = RoleAssignment::assign(&schema);
        assert!(roles.segment.is_none());
    }

    #[test]
    fn test_growth_metric_falls_back_to_first_numeric() {
        let schema = schema_for(vec!["score"], vec![vec!["1"], vec!["2"]]);
        let roles = RoleAssignment::assign(&schema);
        assert_eq!(roles.growth_metric(&schema), Some("score"));
    }

    #[test]
    fn test_profit_role_not_matched_to_text_column() {
        let schema = schema_for(
            vec!["profit_notes"],
            vec![vec!["good"], vec!["bad"], vec!["good"]],
        );
        let roles = RoleAssignment::assign(&schema);
        assert!(roles.profit.is_none());
    }
}
