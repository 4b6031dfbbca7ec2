//! Price-history provider abstraction.
//!
//! [`PriceSource`] is the only thing the pipeline knows about market data. Each
//! concrete provider (a CSV directory, an HTTP API, an in-memory fixture)
//! implements it and returns a validated [`PriceSeries`] with naive dates.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use stockmetrics_analytics::error::FetchError;
//! use stockmetrics_analytics::models::{DateRange, PriceSeries};
//! use stockmetrics_analytics::services::PriceSource;
//!
//! struct NothingSource;
//!
//! #[async_trait]
//! impl PriceSource for NothingSource {
//!     async fn fetch_closes(
//!         &self,
//!         symbol: &str,
//!         _range: &DateRange,
//!     ) -> Result<PriceSeries, FetchError> {
//!         Err(FetchError::NotFound(symbol.to_string()))
//!     }
//! }
//! ```

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{DateRange, PriceSeries};

/// Fetches daily closing prices for one symbol over a window.
///
/// Implementations must return `FetchError::Empty` rather than an empty
/// series, and must strip timezone information from dates.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_closes(&self, symbol: &str, range: &DateRange)
        -> Result<PriceSeries, FetchError>;

    /// Short provider name for logs
    fn name(&self) -> &str {
        "price-source"
    }
}

/// Serves pre-built series, restricted to the requested window.
///
/// Useful for fixtures and for re-running an analysis on data that is
/// already in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceSource {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }
}

#[async_trait]
impl PriceSource for InMemoryPriceSource {
    async fn fetch_closes(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<PriceSeries, FetchError> {
        let series = self
            .series
            .get(symbol)
            .ok_or_else(|| FetchError::NotFound(symbol.to_string()))?;

        let points = series
            .points()
            .iter()
            .filter(|p| range.contains(p.date))
            .copied()
            .collect::<Vec<_>>();

        if points.is_empty() {
            return Err(FetchError::Empty);
        }

        Ok(PriceSeries::new(symbol, points)?)
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_filters_window() {
        let series = PriceSeries::new(
            "AAA",
            (1..=10).map(|day| PricePoint::new(d(day), 10.0 + day as f64)).collect(),
        )
        .unwrap();
        let source = InMemoryPriceSource::new().with_series(series);

        let range = DateRange::new(d(3), d(6)).unwrap();
        let fetched = source.fetch_closes("AAA", &range).await.unwrap();
        assert_eq!(fetched.len(), 3);
        assert_eq!(fetched.first_date(), Some(d(3)));
        assert_eq!(fetched.last_date(), Some(d(5)));
    }

    #[tokio::test]
    async fn test_in_memory_missing_and_empty() {
        let series = PriceSeries::new("AAA", vec![PricePoint::new(d(1), 1.0)]).unwrap();
        let source = InMemoryPriceSource::new().with_series(series);
        let range = DateRange::new(d(5), d(9)).unwrap();

        assert_eq!(
            source.fetch_closes("BBB", &range).await,
            Err(FetchError::NotFound("BBB".to_string()))
        );
        assert_eq!(source.fetch_closes("AAA", &range).await, Err(FetchError::Empty));
    }
}
