//! Natural-language Q&A over datasets.
//!
//! Questions route through a fixed intent table to sections of the full
//! analysis, so the same question over the same data always yields the
//! same answer. An optional enricher rewords prose only.

mod engine;
mod intent;

pub use engine::{AnalystAnswer, ChartPayload, QaEngine};
pub use intent::{classify_intent, QueryIntent};
