//! Analyze command - run the full analysis and print the report.

use std::path::PathBuf;

use colored::Colorize;
use datasight::{AnalyticsEngine, CsvReader};

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    println!(
        "{} {}",
        "Analyzing".cyan().bold(),
        file.display().to_string().white()
    );

    let dataset = CsvReader::new().read_file(&file)?;
    let insights = AnalyticsEngine::new().analyze(&dataset);

    if let Some(path) = output {
        std::fs::write(&path, serde_json::to_vec_pretty(&insights)?)?;
        println!(
            "{} {}",
            "Saved to".green().bold(),
            path.display().to_string().white()
        );
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    if verbose {
        println!();
        println!("{}", "Schema:".yellow().bold());
        for col in &insights.schema.columns {
            println!(
                "  {:24} {:12} {} distinct, {} missing",
                col.name,
                format!("{:?}", col.inferred_type),
                col.unique_count,
                col.null_count
            );
        }
    }

    println!();
    println!("{}", "Summary".yellow().bold());
    println!("  {}", insights.executive_summary);

    let summary = &insights.business_summary;
    if summary.profit_available {
        println!();
        println!("{}", "Profit & Loss".yellow().bold());
        if let Some(revenue) = summary.total_revenue {
            println!("  Revenue: {}", format!("{revenue:.2}").white().bold());
        }
        if let Some(cost) = summary.total_cost {
            println!("  Cost:    {}", format!("{cost:.2}").white().bold());
        }
        if let Some(profit) = summary.total_profit {
            let formatted = format!("{profit:.2}");
            let colored_profit = if profit >= 0.0 {
                formatted.green().bold()
            } else {
                formatted.red().bold()
            };
            println!("  Profit:  {}", colored_profit);
        }
        if let Some(margin) = summary.profit_margin_pct {
            println!("  Margin:  {margin:.2}%");
        }
    }

    if !insights.alerts.is_empty() {
        println!();
        println!("{}", "Alerts".yellow().bold());
        for alert in &insights.alerts {
            let severity = match alert.severity.as_str() {
                "critical" => alert.severity.red().bold(),
                "warning" => alert.severity.yellow().bold(),
                _ => alert.severity.blue().bold(),
            };
            println!("  [{severity}] {}: {}", alert.title, alert.description);
        }
    }

    println!();
    println!("{}", "Recommendations".yellow().bold());
    for rec in &insights.recommendations {
        println!("  - {rec}");
    }

    let quality = &insights.data_quality;
    println!();
    println!(
        "Data completeness: {}",
        format!("{:.0}%", quality.completeness_pct).white().bold()
    );
    if quality.duplicate_rows == 0 && quality.high_missing_columns.is_empty() {
        println!("{}", "No data quality issues found".green());
    }

    Ok(())
}
