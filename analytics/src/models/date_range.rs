use chrono::{NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Historical window for a run. `start` is inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AnalysisError> {
        if start >= end {
            return Err(AnalysisError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse ISO `YYYY-MM-DD` bounds
    pub fn parse(start: &str, end: &str) -> Result<Self, AnalysisError> {
        Self::new(parse_iso_date(start)?, parse_iso_date(end)?)
    }

    /// The `days` calendar days up to and including today (UTC)
    pub fn trailing_days(days: i64) -> Result<Self, AnalysisError> {
        let today = Utc::now().date_naive();
        let end = today.succ_opt().ok_or_else(|| AnalysisError::InvalidDateRange {
            start: today.to_string(),
            end: "after the last representable date".to_string(),
        })?;
        Self::days_before(end, days)
    }

    /// The `days` calendar days ending just before the exclusive `end`
    pub fn days_before(end: NaiveDate, days: i64) -> Result<Self, AnalysisError> {
        let start = TimeDelta::try_days(days)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| AnalysisError::InvalidDateRange {
                start: format!("{} days before {}", days, end),
                end: end.to_string(),
            })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

pub fn parse_iso_date(input: &str) -> Result<NaiveDate, AnalysisError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| AnalysisError::InvalidDate {
        input: input.to_string(),
    })
}
