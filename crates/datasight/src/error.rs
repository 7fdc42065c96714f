//! Error types for the Datasight library.

use thiserror::Error;

/// Main error type for Datasight operations.
#[derive(Debug, Error)]
pub enum DatasightError {
    /// Empty dataset or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Input rows that cannot be shaped into a rectangular dataset.
    #[error("Computation error: {0}")]
    Computation(String),

    /// Request rejected before computation started.
    #[error("Rate limit exceeded; retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error (bad API key, malformed settings).
    #[error("Configuration error: {0}")]
    Config(String),

    /// External enrichment call failed or timed out. Always recoverable:
    /// callers fall back to the deterministic answer.
    #[error("Enrichment failed: {0}")]
    Enrichment(String),
}

/// Result type alias for Datasight operations.
pub type Result<T> = std::result::Result<T, DatasightError>;
