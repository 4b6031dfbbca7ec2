//! Builder pattern for configuring stock analysis operations

use std::sync::Arc;
use std::time::Duration;

use crate::api::analyzer::{AnalyzerConfig, StockAnalyzer};
use crate::error::Result;
use crate::services::{CancelFlag, PriceSource};

/// Builder for configuring a [`StockAnalyzer`]
///
/// Provides a fluent interface for setting up analysis parameters.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use stockmetrics_analytics::api::AnalysisBuilder;
/// use stockmetrics_analytics::services::InMemoryPriceSource;
///
/// let analyzer = AnalysisBuilder::new(Arc::new(InMemoryPriceSource::new()))
///     .with_benchmark("^IXIC")
///     .with_risk_free_rate(0.045)
///     .with_max_workers(3)
///     .with_fetch_timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// assert_eq!(analyzer.config().benchmark_symbol, "^IXIC");
/// ```
pub struct AnalysisBuilder {
    source: Arc<dyn PriceSource>,
    config: AnalyzerConfig,
    cancel: Option<CancelFlag>,
}

impl AnalysisBuilder {
    /// Create a new analysis builder with default settings
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            config: AnalyzerConfig::default(),
            cancel: None,
        }
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the benchmark symbol used for beta
    pub fn with_benchmark(mut self, symbol: impl Into<String>) -> Self {
        self.config.benchmark_symbol = symbol.into();
        self
    }

    /// Set the annual risk-free rate used for Sharpe ratio
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.config.risk_free_rate = rate;
        self
    }

    /// Set how many fetches may run at once
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.config.max_workers = workers;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = timeout;
        self
    }

    /// Share a cancellation flag with the caller, e.g. a Ctrl-C handler
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Build a StockAnalyzer with the configured settings
    pub fn build(self) -> Result<StockAnalyzer> {
        self.config.validate()?;
        let analyzer = StockAnalyzer::new(self.source, self.config);
        Ok(match self.cancel {
            Some(cancel) => analyzer.with_cancel_flag(cancel),
            None => analyzer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::services::InMemoryPriceSource;

    fn source() -> Arc<dyn PriceSource> {
        Arc::new(InMemoryPriceSource::new())
    }

    #[test]
    fn test_defaults() {
        let analyzer = AnalysisBuilder::new(source()).build().unwrap();
        let config = analyzer.config();
        assert_eq!(config.benchmark_symbol, "^GSPC");
        assert_eq!(config.risk_free_rate, 0.02);
        assert_eq!(config.max_workers, 5);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let zero_workers = AnalysisBuilder::new(source()).with_max_workers(0).build();
        assert!(matches!(zero_workers, Err(AnalysisError::InvalidConfig(_))));

        let nan_rate = AnalysisBuilder::new(source())
            .with_risk_free_rate(f64::NAN)
            .build();
        assert!(matches!(nan_rate, Err(AnalysisError::InvalidConfig(_))));

        let blank = AnalysisBuilder::new(source()).with_benchmark("  ").build();
        assert!(matches!(blank, Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_shared_cancel_flag() {
        let cancel = CancelFlag::new();
        let analyzer = AnalysisBuilder::new(source())
            .with_cancel_flag(cancel.clone())
            .build()
            .unwrap();

        cancel.cancel();
        assert!(analyzer.cancel_flag().is_cancelled());
    }
}
