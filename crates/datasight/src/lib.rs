//! Datasight: deterministic business analytics for uploaded tabular data.
//!
//! Datasight takes a spreadsheet-shaped dataset and computes schema, data
//! quality, correlations, trends, and a profit & loss view, plus a
//! natural-language Q&A layer over those results.
//!
//! # Core Principles
//!
//! - **Deterministic**: the same dataset always produces the same payload
//! - **Stateless**: every analysis starts from the raw rows; nothing is
//!   carried between calls
//! - **Facts before prose**: an optional LLM enricher may reword answers
//!   but never supplies numbers
//!
//! # Example
//!
//! ```no_run
//! use datasight::{AnalyticsEngine, CsvReader};
//!
//! let dataset = CsvReader::new().read_file("sales.csv").unwrap();
//! let insights = AnalyticsEngine::new().analyze(&dataset);
//!
//! println!("{}", insights.executive_summary);
//! for rec in &insights.recommendations {
//!     println!("- {rec}");
//! }
//! ```

pub mod business;
pub mod correlate;
pub mod dataset;
pub mod drivers;
pub mod error;
pub mod insights;
pub mod llm;
pub mod qa;
pub mod quality;
pub mod ratelimit;
pub mod roles;
pub mod schema;
pub mod stats;
pub mod trend;

pub use business::{BusinessSummary, ProfitLossBreakdown, SegmentPnl};
pub use dataset::{CellValue, CsvReader, Dataset, ReaderConfig};
pub use error::{DatasightError, Result};
pub use insights::{AnalystInsights, AnalyticsEngine, EngineConfig, Kpis};
pub use llm::{MockEnricher, NarrativeEnricher, OpenAiEnricher};
pub use qa::{AnalystAnswer, QaEngine, QueryIntent};
pub use ratelimit::{RateLimiter, SlidingWindowLimiter, UnlimitedLimiter};
pub use schema::{ColumnSchema, ColumnType, SchemaInferencer, TableSchema};
