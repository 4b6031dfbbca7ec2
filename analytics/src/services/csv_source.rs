use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::error::FetchError;
use crate::models::{DateRange, PricePoint, PriceSeries};
use crate::services::PriceSource;
use crate::utils::Logger;

/// One row of a price history CSV. Extra columns (open, high, volume...) are ignored.
#[derive(Debug, Deserialize)]
struct RawPriceRow {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Close")]
    close: Option<f64>,
}

/// Reads `<dir>/<SYMBOL>.csv` files with at least `date` and `close` columns
pub struct CsvPriceSource {
    data_dir: PathBuf,
    logger: Logger,
}

impl CsvPriceSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            logger: Logger::new("CSV_SOURCE"),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn file_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }

    /// Parse CSV content into points inside `range`, sorted by date
    fn parse_csv_content(
        &self,
        content: &str,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for (line, result) in reader.deserialize().enumerate() {
            let row: RawPriceRow =
                result.map_err(|e| FetchError::Malformed(format!("row {}: {}", line + 1, e)))?;

            let Some(close) = row.close else {
                self.logger
                    .debug(&format!("{}: skipping row {} without close", symbol, line + 1));
                continue;
            };

            let date = parse_row_date(&row.date).ok_or_else(|| {
                FetchError::Malformed(format!("row {}: bad date '{}'", line + 1, row.date))
            })?;

            if range.contains(date) {
                points.push(PricePoint::new(date, close));
            }
        }

        Ok(points)
    }
}

/// Accepts plain dates and timestamps with an offset; the offset is dropped
/// after taking the local calendar date.
fn parse_row_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(input).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%:z")
                .ok()
                .map(|dt| dt.date_naive())
        })
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    async fn fetch_closes(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<PriceSeries, FetchError> {
        let path = self.file_for(symbol);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(symbol.to_string()));
            }
            Err(e) => {
                return Err(FetchError::Source(format!("{}: {}", path.display(), e)));
            }
        };

        let points = self.parse_csv_content(&content, symbol, range)?;
        if points.is_empty() {
            return Err(FetchError::Empty);
        }

        let series = PriceSeries::from_unsorted(symbol, points)?;
        self.logger.debug(&format!(
            "Loaded {} points for {} from {}",
            series.len(),
            symbol,
            path.display()
        ));

        Ok(series)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
