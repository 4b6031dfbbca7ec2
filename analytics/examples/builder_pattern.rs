//! Builder Pattern Example
//!
//! Configures an analyzer with the builder and runs it over generated prices,
//! so it needs no files or network access.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as Days, NaiveDate};
use stockmetrics_analytics::prelude::*;

fn generated(symbol: &str, start: NaiveDate, drift: f64, swing: f64) -> Result<PriceSeries, Box<dyn Error>> {
    let points = (0..120)
        .map(|day| {
            let phase = (day as f64 / 5.0).sin();
            PricePoint::new(start + Days::days(day), 100.0 * (1.0 + drift * day as f64) + swing * phase)
        })
        .collect();
    Ok(PriceSeries::new(symbol, points)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    stockmetrics_analytics::init_logger()?;

    println!("🏗️  Builder Pattern Example - Flexible Configuration");
    println!("{}", "=".repeat(60));

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad start date")?;
    let source = InMemoryPriceSource::new()
        .with_series(generated("^IXIC", start, 0.001, 2.0)?)
        .with_series(generated("GROWTH", start, 0.003, 6.0)?)
        .with_series(generated("STEADY", start, 0.0005, 1.0)?)
        .with_series(generated("CHOPPY", start, 0.0, 9.0)?);

    let analyzer = AnalysisBuilder::new(Arc::new(source))
        .with_benchmark("^IXIC")
        .with_risk_free_rate(0.045)
        .with_max_workers(2)
        .with_fetch_timeout(Duration::from_secs(5))
        .build()?;

    println!(
        "✅ Analyzer: benchmark {}, rf {:.1}%, {} workers",
        analyzer.config().benchmark_symbol,
        analyzer.config().risk_free_rate * 100.0,
        analyzer.config().max_workers
    );

    let symbols: Vec<String> = ["GROWTH", "UNKNOWN", "STEADY", "CHOPPY"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let output = analyzer
        .analyze(&symbols, DateRange::new(start, start + Days::days(120))?)
        .await?;

    println!();
    print!("{}", output.report.render_table());
    println!();
    println!("📈 Chart data:");
    println!("{}", serde_json::to_string_pretty(&output.chart.risk_return)?);

    println!("{}", "=".repeat(60));

    Ok(())
}
