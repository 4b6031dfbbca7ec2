use serde::{Deserialize, Serialize};

/// Annualized risk/return statistics for one symbol.
///
/// Created once by [`MetricsEngine`](crate::services::MetricsEngine) and never
/// mutated. Values are fractions (0.12 means 12%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetrics {
    pub symbol: String,
    /// Mean daily return times 252
    #[serde(rename = "annual_return")]
    pub mean_return: f64,
    /// Sample standard deviation of daily returns times sqrt(252)
    pub volatility: f64,
    pub sharpe_ratio: f64,
    /// Most negative peak-to-trough decline, always <= 0
    pub max_drawdown: f64,
    pub beta: f64,
}

impl StockMetrics {
    pub fn formatted(&self) -> FormattedMetrics {
        FormattedMetrics {
            symbol: self.symbol.clone(),
            annual_return: format_percent(self.mean_return),
            volatility: format_percent(self.volatility),
            sharpe_ratio: format_ratio(self.sharpe_ratio),
            max_drawdown: format_percent(self.max_drawdown),
            beta: format_ratio(self.beta),
        }
    }
}

/// Display strings for a [`StockMetrics`] row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedMetrics {
    pub symbol: String,
    pub annual_return: String,
    pub volatility: String,
    pub sharpe_ratio: String,
    pub max_drawdown: String,
    pub beta: String,
}

/// `0.1234` -> `"12.34%"`
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// `1.2345` -> `"1.23"`
pub fn format_ratio(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting() {
        let metrics = StockMetrics {
            symbol: "AAPL".to_string(),
            mean_return: 0.1234,
            volatility: 0.25,
            sharpe_ratio: 0.4136,
            max_drawdown: -0.1567,
            beta: 1.204,
        };

        let formatted = metrics.formatted();
        assert_eq!(formatted.symbol, "AAPL");
        assert_eq!(formatted.annual_return, "12.34%");
        assert_eq!(formatted.volatility, "25.00%");
        assert_eq!(formatted.sharpe_ratio, "0.41");
        assert_eq!(formatted.max_drawdown, "-15.67%");
        assert_eq!(formatted.beta, "1.20");
    }

    #[test]
    fn test_serializes_annual_return_name() {
        let metrics = StockMetrics {
            symbol: "MSFT".to_string(),
            mean_return: 0.1,
            volatility: 0.2,
            sharpe_ratio: 0.4,
            max_drawdown: -0.05,
            beta: 0.9,
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["annual_return"], 0.1);
        assert!(json.get("mean_return").is_none());
    }
}
