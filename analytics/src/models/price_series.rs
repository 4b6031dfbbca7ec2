use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closing prices for one instrument.
///
/// Dates are naive calendar dates, strictly increasing, and every close is a
/// finite positive number. The series is immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from points that are already in date order
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for point in &points {
            if !point.close.is_finite() {
                return Err(SeriesError::NonFinitePrice { date: point.date });
            }
            if point.close <= 0.0 {
                return Err(SeriesError::NonPositivePrice {
                    date: point.date,
                    value: point.close,
                });
            }
        }

        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::UnorderedDates {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            points,
        })
    }

    /// Build a series from timezone-aware observations in any order.
    ///
    /// Each timestamp is reduced to its calendar date in its own timezone, then
    /// the timezone is dropped so series from different exchanges compare on
    /// naive dates. When two observations land on the same date the later one wins.
    pub fn from_zoned<Tz: TimeZone>(
        symbol: impl Into<String>,
        observations: impl IntoIterator<Item = (DateTime<Tz>, f64)>,
    ) -> Result<Self, SeriesError> {
        let points = observations
            .into_iter()
            .map(|(time, close)| PricePoint::new(time.date_naive(), close))
            .collect();
        Self::from_unsorted(symbol, points)
    }

    /// Sort by date and drop duplicate dates (last observation kept)
    pub fn from_unsorted(
        symbol: impl Into<String>,
        mut points: Vec<PricePoint>,
    ) -> Result<Self, SeriesError> {
        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self::new(symbol, deduped)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Simple daily returns, dated at the later observation.
    ///
    /// The first observation has no prior day and is dropped, so the result is
    /// one shorter than the series (empty for fewer than two points).
    pub fn returns(&self) -> ReturnSeries {
        let points = self
            .points
            .windows(2)
            .map(|w| ReturnPoint {
                date: w[1].date,
                value: (w[1].close - w[0].close) / w[0].close,
            })
            .collect();

        ReturnSeries { points }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Daily simple returns derived from a [`PriceSeries`]
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Inner join on date. Both inputs are date-ordered, so a merge walk suffices.
    pub fn align(&self, other: &ReturnSeries) -> AlignedReturns {
        let mut aligned = AlignedReturns::default();
        let (mut i, mut j) = (0, 0);

        while i < self.points.len() && j < other.points.len() {
            let (left, right) = (&self.points[i], &other.points[j]);
            match left.date.cmp(&right.date) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    aligned.dates.push(left.date);
                    aligned.left.push(left.value);
                    aligned.right.push(right.value);
                    i += 1;
                    j += 1;
                }
            }
        }

        aligned
    }
}

/// Two return series restricted to their common dates
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedReturns {
    pub dates: Vec<NaiveDate>,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl AlignedReturns {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
