//! Error types for the analysis pipeline
//!
//! Errors are split by how far they propagate: [`AnalysisError`] aborts a whole
//! run, while [`FetchError`] and [`MetricsError`] only remove one symbol from
//! the report.

use thiserror::Error;

/// Fatal and configuration errors. Returned to the caller; no report is produced.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No symbols were requested
    #[error("Symbol list cannot be empty")]
    EmptySymbols,

    /// Start date is not strictly before end date
    #[error("Invalid date range: start {start} must be before end {end}")]
    InvalidDateRange { start: String, end: String },

    /// A date string could not be parsed as YYYY-MM-DD
    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    /// The benchmark series could not be retrieved; no metric is meaningful without it
    #[error("Benchmark {symbol} unavailable: {source}")]
    BenchmarkUnavailable {
        symbol: String,
        #[source]
        source: FetchError,
    },

    /// The run was cancelled before the benchmark was fetched
    #[error("Analysis run cancelled")]
    Cancelled,

    /// Analyzer configuration is unusable (zero workers, non-finite rate, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Per-symbol acquisition failures. Recorded in the run, never fatal for siblings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The data source reported an error (network, HTTP status, I/O)
    #[error("Data source error: {0}")]
    Source(String),

    /// The data source has no history for this symbol
    #[error("Symbol not found: {0}")]
    NotFound(String),

    /// The source answered but returned no observations in the window
    #[error("No price data in requested window")]
    Empty,

    /// The source answered with data that cannot form a valid price series
    #[error("Malformed price data: {0}")]
    Malformed(String),

    /// The fetch did not complete within the configured timeout
    #[error("Fetch timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The run was cancelled before this fetch started
    #[error("Fetch cancelled before start")]
    Cancelled,
}

impl From<SeriesError> for FetchError {
    fn from(error: SeriesError) -> Self {
        FetchError::Malformed(error.to_string())
    }
}

/// Per-symbol metric derivation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    /// Symbol and benchmark returns share no dates
    #[error("Symbol and benchmark returns share no common dates")]
    EmptyAlignment,

    /// Sample statistics need at least two aligned returns
    #[error("Need at least 2 aligned returns, got {0}")]
    InsufficientData(usize),

    /// Volatility is zero, Sharpe ratio is undefined
    #[error("Volatility is zero; Sharpe ratio undefined")]
    ZeroVolatility,

    /// Benchmark return variance is zero, beta is undefined
    #[error("Benchmark return variance is zero; beta undefined")]
    ZeroBenchmarkVariance,

    /// A derived value was NaN or infinite
    #[error("Non-finite value computed for {field}")]
    NonFinite { field: &'static str },
}

/// Invariant violations when building a price series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("Price on {date} is not positive: {value}")]
    NonPositivePrice { date: chrono::NaiveDate, value: f64 },

    #[error("Price on {date} is not finite")]
    NonFinitePrice { date: chrono::NaiveDate },

    #[error("Dates must be strictly increasing: {previous} followed by {next}")]
    UnorderedDates {
        previous: chrono::NaiveDate,
        next: chrono::NaiveDate,
    },
}

/// Result alias for run-level operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
