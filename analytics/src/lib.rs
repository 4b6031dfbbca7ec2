//! # stockmetrics-analytics - Risk/Return Analysis Library
//!
//! Fetches daily closing prices for a set of symbols and a benchmark index,
//! then derives annualized risk/return metrics for each symbol:
//! - Annualized mean return and volatility (252 trading days)
//! - Sharpe ratio against a configurable risk-free rate
//! - Maximum drawdown of the cumulative return path
//! - Beta relative to the benchmark
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stockmetrics_analytics::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = StockAnalyzer::with_defaults(Arc::new(CsvPriceSource::new("data")));
//!     let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];
//!     let output = analyzer
//!         .analyze(&symbols, DateRange::parse("2024-01-01", "2025-01-01")?)
//!         .await?;
//!     println!("{}", output.report.render_table());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;
pub mod services;
pub mod utils;

// Public API for easy library usage
pub mod api;

// Prelude for convenient imports
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use stockmetrics_analytics::prelude::*;
    //! ```

    pub use crate::api::{AnalysisBuilder, AnalysisOutput, AnalyzerConfig, StockAnalyzer};
    pub use crate::error::{AnalysisError, FetchError, MetricsError};
    pub use crate::models::{DateRange, PricePoint, PriceSeries, StockMetrics};
    pub use crate::services::{
        CancelFlag, CsvPriceSource, InMemoryPriceSource, PerformanceChartData, PriceSource, Report,
    };
}

// Re-export some commonly used utilities
pub use utils::{init_logger, Logger, Timer};
