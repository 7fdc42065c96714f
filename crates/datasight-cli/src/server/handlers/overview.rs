//! Overview metrics handler.

use axum::{extract::State, Json};
use serde_json::json;

use datasight::dataset::Dataset;
use datasight::TableSchema;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Rows included in the overview chart preview.
const CHART_PREVIEW_ROWS: usize = 10;

/// Column-name tokens preferred for the chart label axis, in priority order.
const LABEL_TOKENS: &[&str] = &["name", "date", "product", "month", "category"];

/// GET /overview/metrics - dataset shape, per-column stats, a chart
/// preview, and the full analyst payload.
///
/// Responses are cached briefly so dashboard polling does not recompute
/// the analysis on every request.
pub async fn get_metrics(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Some(cached) = state.cached_overview() {
        return Ok(Json(cached));
    }

    let dataset = state.dataset.clone();
    let engine = state.engine.clone();
    let dataset_id = state.dataset_id.to_string();
    let last_updated = state.loaded_at.to_rfc3339();

    // Analysis is CPU-bound; keep it off the async workers
    let payload = tokio::task::spawn_blocking(move || {
        let insights = engine.analyze(&dataset);
        let numeric_columns: Vec<&str> = insights
            .schema
            .numeric_columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        let chart_data = chart_preview(&dataset, &insights.schema);
        json!({
            "dataset_id": dataset_id,
            "total_rows": insights.row_count,
            "total_columns": insights.column_count,
            "numeric_columns": numeric_columns,
            "basic_stats": &insights.column_stats,
            "chart_data": chart_data,
            "last_updated": last_updated,
            "analyst_insights": insights,
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))?;

    state.store_overview(payload.clone());
    Ok(Json(payload))
}

/// First rows of the dataset shaped for a simple chart: a `name` label
/// field plus every numeric column. Empty when there is nothing numeric
/// to plot.
fn chart_preview(dataset: &Dataset, schema: &TableSchema) -> Vec<serde_json::Value> {
    let numeric = schema.numeric_columns();
    if numeric.is_empty() {
        return Vec::new();
    }
    let label_pos = pick_label_column(schema);

    dataset
        .rows
        .iter()
        .take(CHART_PREVIEW_ROWS)
        .enumerate()
        .map(|(row_idx, row)| {
            let mut point = serde_json::Map::new();
            let name = label_pos
                .and_then(|pos| row.get(pos))
                .and_then(|cell| cell.as_text())
                .unwrap_or_else(|| row_idx.to_string());
            point.insert("name".to_string(), json!(name));

            for col in &numeric {
                let value = row.get(col.position).and_then(|cell| cell.as_number());
                point.insert(col.name.clone(), json!(value));
            }
            serde_json::Value::Object(point)
        })
        .collect()
}

/// Label column: first name-token match among non-numeric columns, else
/// the first categorical column. With no candidate, rows are labelled by
/// their index.
fn pick_label_column(schema: &TableSchema) -> Option<usize> {
    for token in LABEL_TOKENS {
        if let Some(col) = schema
            .columns
            .iter()
            .find(|c| !c.inferred_type.is_numeric() && c.name.to_lowercase().contains(token))
        {
            return Some(col.position);
        }
    }

    schema.categorical_columns().first().map(|c| c.position)
}
