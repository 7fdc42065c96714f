//! End-to-end tests: CSV in, full insight payload out.

use std::io::Write;

use datasight::dataset::CellValue;
use datasight::{AnalyticsEngine, CsvReader, Dataset, QaEngine, QueryIntent};

fn write_csv(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn csv_to_full_payload() {
    let file = write_csv(
        "order_date,region,revenue,cost\n\
         2024-01-05,NY,100,70\n\
         2024-01-20,LA,200,140\n\
         2024-02-10,NY,300,210\n",
    );
    let dataset = CsvReader::new().read_file(file.path()).unwrap();
    let insights = AnalyticsEngine::new().analyze(&dataset);

    let summary = &insights.business_summary;
    assert!(summary.profit_available);
    assert_eq!(summary.total_revenue, Some(600.0));
    assert_eq!(summary.total_cost, Some(420.0));
    assert_eq!(summary.total_profit, Some(180.0));
    assert_eq!(summary.profit_margin_pct, Some(30.0));
}

#[test]
fn missing_cost_disables_profit() {
    let file = write_csv(
        "order_date,region,revenue\n\
         2024-01-05,NY,100\n\
         2024-02-10,LA,300\n",
    );
    let dataset = CsvReader::new().read_file(file.path()).unwrap();
    let insights = AnalyticsEngine::new().analyze(&dataset);

    let summary = &insights.business_summary;
    assert!(!summary.profit_available);
    assert_eq!(summary.total_revenue, Some(400.0));
    assert_eq!(summary.total_profit, None);
    assert!(insights.profit_loss_breakdown.is_none());
}

#[test]
fn monthly_trend_growth() {
    let file = write_csv(
        "order_date,revenue\n\
         2024-01-05,100\n\
         2024-01-18,100\n\
         2024-02-03,150\n\
         2024-02-22,150\n",
    );
    let dataset = CsvReader::new().read_file(file.path()).unwrap();
    let insights = AnalyticsEngine::new().analyze(&dataset);

    let trend = insights.trend.expect("trend should be detected");
    assert_eq!(trend.metric_column, "revenue");
    assert_eq!(trend.growth_pct, Some(50.0));
    assert_eq!(trend.direction, "up");
    assert_eq!(trend.points.len(), 2);
}

#[test]
fn category_variants_are_clustered() {
    let file = write_csv(
        "state,revenue\n\
         NY,10\n\
         ny,20\n\
         New York,30\n\
         LA,40\n",
    );
    let dataset = CsvReader::new().read_file(file.path()).unwrap();
    let insights = AnalyticsEngine::new().analyze(&dataset);

    let clusters = &insights.data_quality.inconsistent_categories;
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].column, "state");
    assert_eq!(clusters[0].canonical, "ny");
    assert_eq!(clusters[0].variant_count, 2);
}

#[test]
fn semicolon_delimiter_detected() {
    let file = write_csv(
        "region;revenue\n\
         NY;100\n\
         LA;200\n",
    );
    let dataset = CsvReader::new().read_file(file.path()).unwrap();

    assert_eq!(dataset.columns, vec!["region", "revenue"]);
    assert_eq!(dataset.row_count(), 2);
}

#[test]
fn qa_profit_drop_end_to_end() {
    let file = write_csv(
        "order_date,region,revenue,cost\n\
         2024-01-05,NY,200,100\n\
         2024-01-20,LA,200,110\n\
         2024-02-10,NY,150,140\n\
         2024-02-15,LA,120,130\n",
    );
    let dataset = CsvReader::new().read_file(file.path()).unwrap();
    let answer = QaEngine::new().answer(&dataset, "Why did profit drop?");

    assert_eq!(answer.intent, QueryIntent::ProfitDrop);
    assert!(answer.answer.contains("fell"));
    assert!(answer.chart.is_some());
}

#[test]
fn analysis_from_json_records() {
    let records: Vec<serde_json::Map<String, serde_json::Value>> = vec![
        serde_json::from_value(serde_json::json!({"revenue": 100, "cost": 60})).unwrap(),
        serde_json::from_value(serde_json::json!({"revenue": "$1,400", "cost": 900})).unwrap(),
    ];
    let dataset = Dataset::from_records(&records).unwrap();
    let insights = AnalyticsEngine::new().analyze(&dataset);

    // Currency-formatted text still counts toward the revenue total
    assert_eq!(insights.business_summary.total_revenue, Some(1500.0));
}

#[test]
fn null_heavy_dataset_does_not_panic() {
    let rows = vec![
        vec![CellValue::Null, CellValue::Null],
        vec![CellValue::Null, CellValue::Number(1.0)],
        vec![CellValue::Null, CellValue::Null],
    ];
    let dataset = Dataset::new(vec!["a".to_string(), "b".to_string()], rows);
    let insights = AnalyticsEngine::new().analyze(&dataset);

    assert_eq!(insights.row_count, 3);
    assert!(!insights
        .data_quality
        .high_missing_columns
        .is_empty());
}
