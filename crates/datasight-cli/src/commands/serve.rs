//! Serve command - expose the analytics API over HTTP.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use datasight::{CsvReader, QaEngine, RateLimiter, SlidingWindowLimiter, UnlimitedLimiter};

use crate::cli::EnricherChoice;
use crate::server::{run_server, AppState};

/// Window for the AI-endpoint rate limiter.
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

pub fn run(
    file: PathBuf,
    port: u16,
    enricher: EnricherChoice,
    rate_limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let dataset = CsvReader::new().read_file(&file)?;
    println!(
        "{} {} ({} rows, {} columns)",
        "Loaded".cyan().bold(),
        file.display().to_string().white(),
        dataset.row_count(),
        dataset.column_count()
    );

    let mut qa = QaEngine::new();
    if let Some(enricher) = super::build_enricher(enricher)? {
        qa = qa.with_enricher(enricher);
    }

    let limiter: Arc<dyn RateLimiter> = if rate_limit == 0 {
        Arc::new(UnlimitedLimiter)
    } else {
        Arc::new(SlidingWindowLimiter::new(rate_limit, RATE_LIMIT_WINDOW))
    };
    let state = AppState::new(dataset, qa, limiter);
    println!(
        "{} {}",
        "Dataset id".cyan().bold(),
        state.dataset_id.to_string().white()
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_server(state, port))
}
