//! CLI command implementations.

pub mod analyze;
pub mod ask;
pub mod serve;

use crate::cli::EnricherChoice;
use datasight::{MockEnricher, NarrativeEnricher, OpenAiEnricher};

/// Build the configured enricher, if any.
pub fn build_enricher(
    choice: EnricherChoice,
) -> Result<Option<Box<dyn NarrativeEnricher>>, Box<dyn std::error::Error>> {
    match choice {
        EnricherChoice::None => Ok(None),
        EnricherChoice::OpenAi => Ok(Some(Box::new(OpenAiEnricher::from_env()?))),
        EnricherChoice::Mock => Ok(Some(Box::new(MockEnricher::new()))),
    }
}
