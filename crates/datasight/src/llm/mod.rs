//! Optional LLM narrative enrichment.
//!
//! Every number in an answer comes from the deterministic engine; an
//! enricher only rewords the prose. The Q&A layer works fully without one,
//! and any enrichment failure falls back to the computed answer.

mod mock;
mod openai;
mod provider;

pub use mock::MockEnricher;
pub use openai::{is_placeholder_key, OpenAiEnricher};
pub use provider::{EnricherConfig, EnrichmentFacts, NarrativeEnricher};
