//! Narrative enricher trait and types.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The deterministic facts handed to an enricher. The enricher may reword
/// them; it never supplies numbers of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentFacts {
    /// The user's question, verbatim.
    pub question: String,

    /// The computed answer text to be reworded.
    pub answer: String,

    /// Supporting facts as short statements, in display order.
    #[serde(default)]
    pub supporting_facts: Vec<String>,
}

impl EnrichmentFacts {
    /// Create facts for a question/answer pair.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            supporting_facts: Vec::new(),
        }
    }

    /// Add supporting facts.
    pub fn with_facts(mut self, facts: Vec<String>) -> Self {
        self.supporting_facts = facts;
        self
    }
}

/// Configuration for narrative enrichers.
#[derive(Debug, Clone)]
pub struct EnricherConfig {
    /// Model to use (e.g., "gpt-4o-mini").
    pub model: String,

    /// Maximum tokens in the reworded response.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0).
    pub temperature: f64,

    /// Request timeout in seconds. Kept short: a slow enricher must not
    /// hold up the deterministic answer.
    pub timeout_secs: u64,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 512,
            temperature: 0.2,
            timeout_secs: 4,
        }
    }
}

/// Trait for narrative enrichers.
///
/// Implementations must be thread-safe (Send + Sync) so one enricher can be
/// shared across concurrent queries. Enrichment is strictly optional: any
/// error falls back to the deterministic answer.
pub trait NarrativeEnricher: Send + Sync {
    /// Reword a deterministic answer as a short narrative.
    ///
    /// # Arguments
    /// * `facts` - The question, computed answer, and supporting facts
    ///
    /// # Returns
    /// The reworded narrative text
    fn enrich(&self, facts: &EnrichmentFacts) -> Result<String>;

    /// Get the configuration for this enricher.
    fn config(&self) -> &EnricherConfig;

    /// Get the name of this enricher (for logging/debugging).
    fn name(&self) -> &str;
}
