//! Report assembly and chart data.
//!
//! The assembler walks the run's outcomes in the order the caller requested
//! them. Symbols that failed to fetch or whose metrics are undefined are left
//! out of `rows` and recorded in `failures` instead.

use std::fmt::Write as _;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::models::{AnalysisRun, DateRange, FetchOutcome, FormattedMetrics, StockMetrics};
use crate::services::MetricsEngine;
use crate::utils::log_report;
use crate::utils::stats::cumulative_path;

pub const TABLE_HEADERS: [&str; 6] = [
    "Symbol",
    "Annual Return",
    "Volatility",
    "Sharpe Ratio",
    "Max Drawdown",
    "Beta",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Fetch,
    Metrics,
}

/// A symbol that was requested but has no row in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub stage: FailureStage,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub run_id: Uuid,
    pub benchmark_symbol: String,
    pub date_range: DateRange,
    pub rows: Vec<StockMetrics>,
    pub failures: Vec<SymbolFailure>,
}

impl Report {
    pub fn symbols(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.symbol.as_str()).collect()
    }

    pub fn formatted_rows(&self) -> Vec<FormattedMetrics> {
        self.rows.iter().map(StockMetrics::formatted).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the rows as a left-aligned text table, one line per symbol
    pub fn render_table(&self) -> String {
        let cells: Vec<[String; 6]> = self
            .formatted_rows()
            .into_iter()
            .map(|f| {
                [
                    f.symbol,
                    f.annual_return,
                    f.volatility,
                    f.sharpe_ratio,
                    f.max_drawdown,
                    f.beta,
                ]
            })
            .collect();

        let mut widths = TABLE_HEADERS.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let mut out = String::new();
        push_line(&mut out, &TABLE_HEADERS[..], &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule[..], &widths);
        for row in &cells {
            push_line(&mut out, &row[..], &widths);
        }
        out
    }
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize; 6]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join(" | ");
    let _ = writeln!(out, "{}", line.trim_end());
}

pub struct ReportAssembler;

impl ReportAssembler {
    pub fn assemble(run: &AnalysisRun, engine: &MetricsEngine) -> Report {
        let mut rows = Vec::with_capacity(run.outcomes.len());
        let mut failures = Vec::new();

        for (symbol, outcome) in &run.outcomes {
            match outcome {
                FetchOutcome::Failure(error) => {
                    warn!(symbol = %symbol, error = %error, "Skipping symbol: fetch failed");
                    failures.push(SymbolFailure {
                        symbol: symbol.clone(),
                        stage: FailureStage::Fetch,
                        reason: error.to_string(),
                    });
                }
                FetchOutcome::Success(series) => match engine.compute(series, &run.benchmark) {
                    Ok(metrics) => rows.push(metrics),
                    Err(error) => {
                        warn!(symbol = %symbol, error = %error, "Skipping symbol: metrics undefined");
                        failures.push(SymbolFailure {
                            symbol: symbol.clone(),
                            stage: FailureStage::Metrics,
                            reason: error.to_string(),
                        });
                    }
                },
            }
        }

        log_report(&format!(
            "{} rows, {} skipped (run {})",
            rows.len(),
            failures.len(),
            run.run_id
        ));

        Report {
            run_id: run.run_id,
            benchmark_symbol: run.benchmark.symbol().to_string(),
            date_range: run.date_range,
            rows,
            failures,
        }
    }
}

/// Growth of one unit invested at the first close
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeReturnPath {
    pub symbol: String,
    pub dates: Vec<chrono::NaiveDate>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReturnPoint {
    pub symbol: String,
    pub volatility: f64,
    pub annual_return: f64,
}

/// Data behind the cumulative-returns and risk/return charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceChartData {
    pub cumulative_returns: Vec<CumulativeReturnPath>,
    pub risk_return: Vec<RiskReturnPoint>,
}

impl PerformanceChartData {
    /// Paths use each symbol's own return series, not the benchmark-aligned one
    pub fn from_run(run: &AnalysisRun, report: &Report) -> Self {
        let cumulative_returns = run
            .outcomes
            .iter()
            .filter_map(|(symbol, outcome)| {
                let returns = outcome.series()?.returns();
                if returns.is_empty() {
                    return None;
                }
                Some(CumulativeReturnPath {
                    symbol: symbol.clone(),
                    dates: returns.points().iter().map(|p| p.date).collect(),
                    values: cumulative_path(&returns.values()),
                })
            })
            .collect();

        let risk_return = report
            .rows
            .iter()
            .map(|row| RiskReturnPoint {
                symbol: row.symbol.clone(),
                volatility: row.volatility,
                annual_return: row.mean_return,
            })
            .collect();

        Self {
            cumulative_returns,
            risk_return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::{PricePoint, PriceSeries};
    use chrono::NaiveDate;
    use indexmap::IndexMap;
    use std::sync::Arc;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(d(1 + i as u32), c))
            .collect();
        PriceSeries::new(symbol, points).unwrap()
    }

    fn run(outcomes: Vec<(&str, FetchOutcome)>) -> AnalysisRun {
        let benchmark = series("^GSPC", &[100.0, 101.0, 100.0, 103.0, 102.0]);
        let outcomes: IndexMap<String, FetchOutcome> = outcomes
            .into_iter()
            .map(|(s, o)| (s.to_string(), o))
            .collect();
        AnalysisRun::new(
            DateRange::new(d(1), d(20)).unwrap(),
            Arc::new(benchmark),
            outcomes,
        )
    }

    #[test]
    fn test_order_kept_and_failures_recorded() {
        let run = run(vec![
            ("A", FetchOutcome::Success(series("A", &[10.0, 10.5, 10.2, 10.9, 11.0]))),
            ("B", FetchOutcome::Failure(FetchError::NotFound("B".to_string()))),
            ("C", FetchOutcome::Success(series("C", &[50.0, 49.0, 51.0, 52.0, 50.5]))),
            ("FLAT", FetchOutcome::Success(series("FLAT", &[5.0, 5.0, 5.0, 5.0, 5.0]))),
        ]);

        let report = ReportAssembler::assemble(&run, &MetricsEngine::default());

        assert_eq!(report.symbols(), vec!["A", "C"]);
        assert_eq!(report.run_id, run.run_id);
        assert_eq!(report.benchmark_symbol, "^GSPC");
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].symbol, "B");
        assert_eq!(report.failures[0].stage, FailureStage::Fetch);
        assert_eq!(report.failures[1].symbol, "FLAT");
        assert_eq!(report.failures[1].stage, FailureStage::Metrics);
    }

    #[test]
    fn test_all_failed_gives_empty_report() {
        let run = run(vec![(
            "X",
            FetchOutcome::Failure(FetchError::Empty),
        )]);
        let report = ReportAssembler::assemble(&run, &MetricsEngine::default());
        assert!(report.is_empty());
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_render_table() {
        let report = Report {
            run_id: Uuid::nil(),
            benchmark_symbol: "^GSPC".to_string(),
            date_range: DateRange::new(d(1), d(20)).unwrap(),
            rows: vec![StockMetrics {
                symbol: "AAPL".to_string(),
                mean_return: 0.1234,
                volatility: 0.25,
                sharpe_ratio: 0.4136,
                max_drawdown: -0.1567,
                beta: 1.204,
            }],
            failures: Vec::new(),
        };

        let table = report.render_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Symbol | Annual Return | Volatility | Sharpe Ratio | Max Drawdown | Beta"
        );
        assert!(lines[1].starts_with("------ | ----"));
        assert_eq!(
            lines[2],
            "AAPL   | 12.34%        | 25.00%     | 0.41         | -15.67%      | 1.20"
        );
    }

    #[test]
    fn test_chart_data() {
        let run = run(vec![
            ("A", FetchOutcome::Success(series("A", &[10.0, 11.0, 9.9]))),
            ("B", FetchOutcome::Failure(FetchError::Empty)),
            ("C", FetchOutcome::Success(series("C", &[20.0, 21.0, 22.0, 21.0]))),
        ]);
        let report = ReportAssembler::assemble(&run, &MetricsEngine::default());
        let chart = PerformanceChartData::from_run(&run, &report);

        let symbols: Vec<&str> = chart
            .cumulative_returns
            .iter()
            .map(|p| p.symbol.as_str())
            .collect();
        assert_eq!(symbols, vec!["A", "C"]);

        let a = &chart.cumulative_returns[0];
        assert_eq!(a.dates, vec![d(2), d(3)]);
        assert!((a.values[0] - 1.1).abs() < 1e-12);
        assert!((a.values[1] - 0.99).abs() < 1e-12);

        assert_eq!(chart.risk_return.len(), report.rows.len());
        let json = serde_json::to_value(&chart).unwrap();
        assert!(json["risk_return"].is_array());
    }
}
