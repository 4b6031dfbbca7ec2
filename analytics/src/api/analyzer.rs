//! High-level stock analyzer for easy library usage

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, Instrument};

use crate::error::{AnalysisError, Result};
use crate::models::DateRange;
use crate::services::{
    AcquisitionConfig, CancelFlag, DataAcquisition, MetricsEngine, PerformanceChartData,
    PriceSource, Report, ReportAssembler, DEFAULT_BENCHMARK, DEFAULT_FETCH_TIMEOUT,
    DEFAULT_MAX_WORKERS, DEFAULT_RISK_FREE_RATE,
};
use crate::utils::{log_metrics, Timer};

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub benchmark_symbol: String,
    /// Annual risk-free rate as a fraction
    pub risk_free_rate: f64,
    pub max_workers: usize,
    pub fetch_timeout: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            benchmark_symbol: DEFAULT_BENCHMARK.to_string(),
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            max_workers: DEFAULT_MAX_WORKERS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.benchmark_symbol.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "benchmark symbol must not be empty".to_string(),
            ));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(AnalysisError::InvalidConfig(format!(
                "risk-free rate must be finite, got {}",
                self.risk_free_rate
            )));
        }
        if self.max_workers == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(AnalysisError::InvalidConfig(
                "fetch timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn acquisition(&self) -> AcquisitionConfig {
        AcquisitionConfig {
            benchmark_symbol: self.benchmark_symbol.trim().to_string(),
            max_workers: self.max_workers,
            fetch_timeout: self.fetch_timeout,
        }
    }
}

/// Everything one call to [`StockAnalyzer::analyze`] produces
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub report: Report,
    pub chart: PerformanceChartData,
}

/// High-level interface for risk/return analysis
///
/// Fetches the benchmark and the requested symbols from a [`PriceSource`],
/// computes metrics for every symbol that could be fetched, and returns the
/// report along with chart data. Instances are independent; nothing is
/// shared between two analyzers.
pub struct StockAnalyzer {
    source: Arc<dyn PriceSource>,
    config: AnalyzerConfig,
    cancel: CancelFlag,
}

impl StockAnalyzer {
    pub fn new(source: Arc<dyn PriceSource>, config: AnalyzerConfig) -> Self {
        Self {
            source,
            config,
            cancel: CancelFlag::new(),
        }
    }

    /// Analyzer with default settings (`^GSPC`, 2% risk-free rate, 5 workers)
    pub fn with_defaults(source: Arc<dyn PriceSource>) -> Self {
        Self::new(source, AnalyzerConfig::default())
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Handle for cancelling the analysis from another task
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the whole pipeline for `symbols` over `date_range`
    ///
    /// # Arguments
    /// * `symbols` - Ticker symbols in the order they should appear in the report
    /// * `date_range` - Half-open window `[start, end)`
    ///
    /// # Errors
    /// Configuration problems, an unavailable benchmark, and cancellation
    /// before the benchmark was fetched. Per-symbol problems never fail the
    /// call; they show up in `report.failures`.
    pub async fn analyze(&self, symbols: &[String], date_range: DateRange) -> Result<AnalysisOutput> {
        self.config.validate()?;

        let acquisition = DataAcquisition::new(Arc::clone(&self.source), self.config.acquisition())
            .with_cancel_flag(self.cancel.clone());
        let engine = MetricsEngine::new(self.config.risk_free_rate);

        let run = acquisition.fetch_run(symbols, date_range).await?;
        let span = tracing::info_span!("run", id = %run.run_id);

        async move {
            let timer = Timer::start("metrics and report");
            log_metrics(&format!(
                "Computing metrics for {} symbols against {} (rf = {})",
                run.success_count(),
                run.benchmark.symbol(),
                engine.risk_free_rate()
            ));

            let report = ReportAssembler::assemble(&run, &engine);
            let chart = PerformanceChartData::from_run(&run, &report);
            timer.log_elapsed("ANALYZER");

            info!(
                rows = report.rows.len(),
                failures = report.failures.len(),
                "Analysis complete for {}",
                report.date_range
            );

            Ok(AnalysisOutput { report, chart })
        }
        .instrument(span)
        .await
    }

    /// Same as [`analyze`](Self::analyze) for the trailing `days` ending today
    pub async fn analyze_trailing(&self, symbols: &[String], days: i64) -> Result<AnalysisOutput> {
        let date_range = DateRange::trailing_days(days)?;
        self.analyze(symbols, date_range).await
    }
}
