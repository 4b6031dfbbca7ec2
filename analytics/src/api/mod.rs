//! High-level API for easy library usage
//!
//! Wraps acquisition, metric derivation and report assembly behind one call.

pub mod analyzer;
pub mod builder;

pub use analyzer::{AnalysisOutput, AnalyzerConfig, StockAnalyzer};
pub use builder::AnalysisBuilder;
