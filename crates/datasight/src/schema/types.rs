//! Core type definitions for schema representation.

use serde::{Deserialize, Serialize};

/// Inferred data type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Numeric values (after stripping currency/thousands formatting).
    Numeric,
    /// Date-like values.
    Date,
    /// Categorical or free text values.
    Categorical,
}

impl ColumnType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Numeric)
    }

    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Date)
    }
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::Categorical
    }
}

/// Logical role a column plays in business analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Revenue-like amounts (sales, income, gmv).
    Revenue,
    /// Cost-like amounts (expenses, cogs).
    Cost,
    /// Pre-computed profit or margin.
    Profit,
    /// Volume-like counts (quantity, units, orders).
    Quantity,
    /// Date column used for trend bucketing.
    Date,
    /// Categorical column used for breakdown analysis.
    Segment,
}
