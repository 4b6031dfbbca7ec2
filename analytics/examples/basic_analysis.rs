//! Basic Analysis Example
//!
//! Runs the full pipeline over a directory of `<SYMBOL>.csv` files.
//!
//! ```text
//! cargo run -p stockmetrics-analytics --example basic_analysis -- ./data
//! ```

use std::error::Error;
use std::sync::Arc;

use stockmetrics_analytics::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    stockmetrics_analytics::init_logger()?;

    let data_dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());

    println!("🚀 Basic Analysis Example - CSV price files in {}", data_dir);
    println!("{}", "=".repeat(60));

    let analyzer = StockAnalyzer::with_defaults(Arc::new(CsvPriceSource::new(&data_dir)));
    let symbols: Vec<String> = ["AAPL", "GOOGL", "MSFT", "AMZN"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let date_range = DateRange::trailing_days(365)?;

    match analyzer.analyze(&symbols, date_range).await {
        Ok(output) => {
            println!("✅ Analysis completed for {}", output.report.date_range);
            println!();
            print!("{}", output.report.render_table());

            for failure in &output.report.failures {
                println!("⚠️  {} skipped ({:?}): {}", failure.symbol, failure.stage, failure.reason);
            }
        }
        Err(e) => {
            println!("❌ Analysis failed: {}", e);
        }
    }

    println!("{}", "=".repeat(60));

    Ok(())
}
