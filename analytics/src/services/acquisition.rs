//! Concurrent price acquisition.
//!
//! The benchmark is fetched first, on its own; without it nothing else is
//! worth fetching. Symbols are then fetched on spawned tasks gated by a
//! semaphore with `max_workers` permits, and every task is joined before the
//! run is handed on, so downstream code always sees one outcome per symbol.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{AnalysisError, FetchError};
use crate::models::{AnalysisRun, DateRange, FetchOutcome, PriceSeries};
use crate::services::PriceSource;
use crate::utils::{log_fetch, Logger, Timer};

pub const DEFAULT_BENCHMARK: &str = "^GSPC";
pub const DEFAULT_MAX_WORKERS: usize = 5;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Run-level cancellation signal shared between the caller and fetch tasks.
///
/// Fetches that have not started when the flag is set are skipped and
/// recorded as [`FetchError::Cancelled`]; fetches already in flight finish.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    pub benchmark_symbol: String,
    pub max_workers: usize,
    pub fetch_timeout: Duration,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            benchmark_symbol: DEFAULT_BENCHMARK.to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

pub struct DataAcquisition {
    source: Arc<dyn PriceSource>,
    config: AcquisitionConfig,
    cancel: CancelFlag,
    logger: Logger,
}

impl DataAcquisition {
    pub fn new(source: Arc<dyn PriceSource>, config: AcquisitionConfig) -> Self {
        Self {
            source,
            config,
            cancel: CancelFlag::new(),
            logger: Logger::new("ACQUISITION"),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Fetch the benchmark, then every symbol, and gather the outcomes in
    /// caller order.
    ///
    /// Fails only for configuration problems, cancellation before the
    /// benchmark fetch, or a benchmark that cannot be retrieved. Individual
    /// symbol failures are recorded in the returned run.
    pub async fn fetch_run(
        &self,
        symbols: &[String],
        date_range: DateRange,
    ) -> Result<AnalysisRun, AnalysisError> {
        if symbols.is_empty() {
            return Err(AnalysisError::EmptySymbols);
        }
        if self.config.max_workers == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_workers must be at least 1".to_string(),
            ));
        }

        let symbols = self.distinct_symbols(symbols);
        if symbols.is_empty() {
            return Err(AnalysisError::EmptySymbols);
        }

        if self.cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        let timer = Timer::start("acquisition");
        log_fetch(&format!(
            "Fetching {} symbols plus benchmark {} ({}) via {} with {} workers",
            symbols.len(),
            self.config.benchmark_symbol,
            date_range,
            self.source.name(),
            self.config.max_workers
        ));

        let benchmark = self.fetch_benchmark(date_range).await.map_err(|source| {
            self.logger.error_with_error(
                &format!("Benchmark {} unavailable", self.config.benchmark_symbol),
                &source,
            );
            AnalysisError::BenchmarkUnavailable {
                symbol: self.config.benchmark_symbol.clone(),
                source,
            }
        })?;

        info!(
            benchmark = %self.config.benchmark_symbol,
            points = benchmark.len(),
            "Benchmark series loaded"
        );
        let benchmark = Arc::new(benchmark);

        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let mut handles = Vec::with_capacity(symbols.len());

        for symbol in &symbols {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let cancel = self.cancel.clone();
            let symbol = symbol.clone();
            let timeout = self.config.fetch_timeout;

            handles.push(tokio::spawn(async move {
                if cancel.is_cancelled() {
                    return Err(FetchError::Cancelled);
                }

                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| FetchError::Cancelled)?;

                // Cancellation may have arrived while waiting for a permit
                if cancel.is_cancelled() {
                    return Err(FetchError::Cancelled);
                }

                fetch_with_timeout(source.as_ref(), &symbol, &date_range, timeout).await
            }));
        }

        let joined = futures::future::join_all(handles).await;

        let mut outcomes = IndexMap::with_capacity(symbols.len());
        for (symbol, result) in symbols.into_iter().zip(joined) {
            let outcome = match result {
                Ok(fetched) => FetchOutcome::from(fetched),
                Err(join_error) => FetchOutcome::Failure(FetchError::Source(format!(
                    "fetch task failed: {}",
                    join_error
                ))),
            };

            match &outcome {
                FetchOutcome::Success(series) => {
                    debug!(symbol = %symbol, points = series.len(), "Fetched price series");
                }
                FetchOutcome::Failure(error) => {
                    warn!(symbol = %symbol, error = %error, "Failed to fetch price series");
                }
            }

            outcomes.insert(symbol, outcome);
        }

        let run = AnalysisRun::new(date_range, benchmark, outcomes);
        log_fetch(&format!(
            "Acquisition completed: {}/{} symbols fetched, {} failed",
            run.success_count(),
            run.outcomes.len(),
            run.failure_count()
        ));
        timer.log_elapsed("ACQUISITION");

        Ok(run)
    }

    /// Benchmark fetch on its own task, so a panicking source is reported
    /// like any other fetch failure
    async fn fetch_benchmark(&self, date_range: DateRange) -> Result<PriceSeries, FetchError> {
        let source = Arc::clone(&self.source);
        let symbol = self.config.benchmark_symbol.clone();
        let timeout = self.config.fetch_timeout;

        tokio::spawn(async move {
            fetch_with_timeout(source.as_ref(), &symbol, &date_range, timeout).await
        })
        .await
        .unwrap_or_else(|join_error| {
            Err(FetchError::Source(format!("fetch task failed: {}", join_error)))
        })
    }

    /// Trim whitespace, drop blanks and repeated symbols, keep first-seen order
    fn distinct_symbols(&self, symbols: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut distinct = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let symbol = symbol.trim();
            if symbol.is_empty() {
                continue;
            }
            if seen.insert(symbol.to_string()) {
                distinct.push(symbol.to_string());
            } else {
                self.logger.warn(&format!("Ignoring duplicate symbol {}", symbol));
            }
        }

        distinct
    }
}

async fn fetch_with_timeout(
    source: &dyn PriceSource,
    symbol: &str,
    date_range: &DateRange,
    timeout: Duration,
) -> Result<PriceSeries, FetchError> {
    match tokio::time::timeout(timeout, source.fetch_closes(symbol, date_range)).await {
        Ok(Ok(series)) if series.is_empty() => Err(FetchError::Empty),
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(timeout)),
    }
}
