//! Mock enricher for testing.

use crate::error::{DatasightError, Result};

use super::provider::{EnricherConfig, EnrichmentFacts, NarrativeEnricher};

/// Mock enricher that returns predictable narratives for testing.
pub struct MockEnricher {
    config: EnricherConfig,
    fail: bool,
}

impl MockEnricher {
    /// Create a new mock enricher.
    pub fn new() -> Self {
        Self {
            config: EnricherConfig::default(),
            fail: false,
        }
    }

    /// Create a mock that fails every call, for exercising the fallback path.
    pub fn failing() -> Self {
        Self {
            config: EnricherConfig::default(),
            fail: true,
        }
    }
}

impl Default for MockEnricher {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrativeEnricher for MockEnricher {
    fn enrich(&self, facts: &EnrichmentFacts) -> Result<String> {
        if self.fail {
            return Err(DatasightError::Enrichment(
                "mock enricher configured to fail".to_string(),
            ));
        }

        Ok(format!(
            "[enriched] {} (based on {} supporting facts)",
            facts.answer,
            facts.supporting_facts.len()
        ))
    }

    fn config(&self) -> &EnricherConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}
