//! Ask command - answer a question about a data file.

use std::path::PathBuf;

use colored::Colorize;
use datasight::{CsvReader, QaEngine};

use crate::cli::EnricherChoice;

pub fn run(
    file: PathBuf,
    question: String,
    enricher: EnricherChoice,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let dataset = CsvReader::new().read_file(&file)?;

    let mut qa = QaEngine::new();
    if let Some(enricher) = super::build_enricher(enricher)? {
        qa = qa.with_enricher(enricher);
    }

    let answer = qa.answer(&dataset, &question);

    println!("{} {}", "Q:".cyan().bold(), question.white());
    println!();
    println!("{}", answer.answer);
    println!();
    println!("{} {}", "How:".yellow().bold(), answer.explanation);

    if !answer.recommended_actions.is_empty() {
        println!();
        println!("{}", "Next steps".yellow().bold());
        for action in &answer.recommended_actions {
            println!("  - {action}");
        }
    }

    Ok(())
}
