//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Datasight: deterministic business analytics for tabular data
#[derive(Parser)]
#[command(name = "datasight")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a data file and print the insight report
    Analyze {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write the full payload as JSON to this path instead of printing
        /// the report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output the payload as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Ask a question about a data file
    Ask {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// The question to ask
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Narrative enricher to use
        #[arg(long, default_value = "none")]
        enricher: EnricherChoice,
    },

    /// Serve the analytics API over HTTP
    Serve {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Port for the API server
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Narrative enricher to use for /ai/query
        #[arg(long, default_value = "none")]
        enricher: EnricherChoice,

        /// Requests allowed per minute on AI endpoints (0 disables limiting)
        #[arg(long, default_value = "20")]
        rate_limit: usize,
    },
}

/// Narrative enricher choice for Q&A answers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnricherChoice {
    /// No enricher - deterministic answers only
    #[default]
    None,
    /// OpenAI GPT API (requires OPENAI_API_KEY)
    OpenAi,
    /// Mock enricher for testing
    Mock,
}

impl std::str::FromStr for EnricherChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(EnricherChoice::None),
            "openai" | "gpt" => Ok(EnricherChoice::OpenAi),
            "mock" | "test" => Ok(EnricherChoice::Mock),
            _ => Err(format!(
                "Unknown enricher: {}. Use: none, openai, or mock.",
                s
            )),
        }
    }
}

impl std::fmt::Display for EnricherChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnricherChoice::None => write!(f, "none"),
            EnricherChoice::OpenAi => write!(f, "openai"),
            EnricherChoice::Mock => write!(f, "mock"),
        }
    }
}
