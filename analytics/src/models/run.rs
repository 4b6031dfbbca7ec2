use std::sync::Arc;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::FetchError;
use crate::models::{DateRange, PriceSeries};

/// Result of fetching one symbol
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(PriceSeries),
    Failure(FetchError),
}

impl FetchOutcome {
    pub fn series(&self) -> Option<&PriceSeries> {
        match self {
            FetchOutcome::Success(series) => Some(series),
            FetchOutcome::Failure(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

impl From<Result<PriceSeries, FetchError>> for FetchOutcome {
    fn from(result: Result<PriceSeries, FetchError>) -> Self {
        match result {
            Ok(series) => FetchOutcome::Success(series),
            Err(error) => FetchOutcome::Failure(error),
        }
    }
}

/// Everything acquired for one pipeline invocation.
///
/// `outcomes` has exactly one entry per requested symbol, in the order the
/// caller asked for them. Dropped once the report is built.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub date_range: DateRange,
    pub benchmark: Arc<PriceSeries>,
    pub outcomes: IndexMap<String, FetchOutcome>,
}

impl AnalysisRun {
    pub fn new(
        date_range: DateRange,
        benchmark: Arc<PriceSeries>,
        outcomes: IndexMap<String, FetchOutcome>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            date_range,
            benchmark,
            outcomes,
        }
    }

    pub fn series(&self, symbol: &str) -> Option<&PriceSeries> {
        self.outcomes.get(symbol).and_then(FetchOutcome::series)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.outcomes.keys().map(String::as_str)
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }
}
