use tracing::debug;

use crate::error::MetricsError;
use crate::models::{PriceSeries, StockMetrics};
use crate::utils::stats::{cumulative_path, max_drawdown, mean, sample_covariance, sample_std_dev, sample_variance};

/// Trading days per year used to annualize daily statistics
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Relative spread below which a return series counts as constant
const FLAT_TOLERANCE: f64 = 1e-12;

/// Derives [`StockMetrics`] for one symbol against the benchmark.
///
/// Pure computation: inputs are borrowed, never modified, and every undefined
/// statistic comes back as a [`MetricsError`] instead of a NaN.
#[derive(Debug, Clone, Copy)]
pub struct MetricsEngine {
    risk_free_rate: f64,
}

impl MetricsEngine {
    pub fn new(risk_free_rate: f64) -> Self {
        Self { risk_free_rate }
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn compute(
        &self,
        series: &PriceSeries,
        benchmark: &PriceSeries,
    ) -> Result<StockMetrics, MetricsError> {
        let aligned = series.returns().align(&benchmark.returns());
        if aligned.is_empty() {
            return Err(MetricsError::EmptyAlignment);
        }

        let stock = &aligned.left;
        let market = &aligned.right;

        let daily_mean = mean(stock).ok_or(MetricsError::EmptyAlignment)?;
        let daily_std = sample_std_dev(stock).ok_or(MetricsError::InsufficientData(stock.len()))?;

        if is_flat(daily_std, daily_mean) {
            return Err(MetricsError::ZeroVolatility);
        }

        let mean_return = daily_mean * TRADING_DAYS_PER_YEAR;
        let volatility = daily_std * TRADING_DAYS_PER_YEAR.sqrt();
        let sharpe_ratio = (mean_return - self.risk_free_rate) / volatility;

        let max_drawdown = max_drawdown(&cumulative_path(stock));

        let market_variance =
            sample_variance(market).ok_or(MetricsError::InsufficientData(market.len()))?;
        let market_mean = mean(market).ok_or(MetricsError::EmptyAlignment)?;
        if is_flat(market_variance.sqrt(), market_mean) {
            return Err(MetricsError::ZeroBenchmarkVariance);
        }
        let covariance =
            sample_covariance(stock, market).ok_or(MetricsError::InsufficientData(stock.len()))?;
        let beta = covariance / market_variance;

        let metrics = StockMetrics {
            symbol: series.symbol().to_string(),
            mean_return: finite("mean_return", mean_return)?,
            volatility: finite("volatility", volatility)?,
            sharpe_ratio: finite("sharpe_ratio", sharpe_ratio)?,
            max_drawdown: finite("max_drawdown", max_drawdown)?,
            beta: finite("beta", beta)?,
        };

        debug!(
            symbol = %metrics.symbol,
            aligned = aligned.len(),
            mean_return = metrics.mean_return,
            volatility = metrics.volatility,
            "Computed metrics"
        );

        Ok(metrics)
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(DEFAULT_RISK_FREE_RATE)
    }
}

/// Identical returns leave rounding noise instead of an exact zero spread
fn is_flat(std_dev: f64, mean: f64) -> bool {
    std_dev <= FLAT_TOLERANCE * mean.abs().max(FLAT_TOLERANCE)
}

fn finite(field: &'static str, value: f64) -> Result<f64, MetricsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MetricsError::NonFinite { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        series_from(symbol, 1, closes)
    }

    fn series_from(symbol: &str, first_day: u32, closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(d(first_day + i as u32), c))
            .collect();
        PriceSeries::new(symbol, points).unwrap()
    }

    fn close_to(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn test_reference_scenario() {
        let stock = series("S", &[100.0, 102.0, 101.0, 105.0]);
        let market = series("M", &[100.0, 101.0, 100.0, 103.0]);

        let metrics = MetricsEngine::default().compute(&stock, &market).unwrap();

        let xs = [0.02, 101.0 / 102.0 - 1.0, 105.0 / 101.0 - 1.0];
        let ys = [0.01, 100.0 / 101.0 - 1.0, 0.03];
        let mean_x = xs.iter().sum::<f64>() / 3.0;
        let mean_y = ys.iter().sum::<f64>() / 3.0;
        let var_x = xs.iter().map(|x| (x - mean_x).powi(2)).sum::<f64>() / 2.0;
        let var_y = ys.iter().map(|y| (y - mean_y).powi(2)).sum::<f64>() / 2.0;
        let cov = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum::<f64>()
            / 2.0;

        let expected_mean = mean_x * 252.0;
        let expected_vol = var_x.sqrt() * 252.0_f64.sqrt();

        assert_eq!(metrics.symbol, "S");
        assert!(close_to(metrics.mean_return, expected_mean));
        assert!(close_to(metrics.volatility, expected_vol));
        assert!(close_to(metrics.sharpe_ratio, (expected_mean - 0.02) / expected_vol));
        assert!(close_to(metrics.beta, cov / var_y));
        // path 1.02 -> 1.01 -> 1.05, trough 1.01 against peak 1.02
        assert!(close_to(metrics.max_drawdown, 1.01 / 1.02 - 1.0));
    }

    #[test]
    fn test_risk_free_rate_is_configurable() {
        let stock = series("S", &[100.0, 102.0, 101.0, 105.0]);
        let market = series("M", &[100.0, 101.0, 100.0, 103.0]);

        let base = MetricsEngine::new(0.0).compute(&stock, &market).unwrap();
        let shifted = MetricsEngine::new(0.05).compute(&stock, &market).unwrap();

        assert!(close_to(
            base.sharpe_ratio - shifted.sharpe_ratio,
            0.05 / base.volatility
        ));
        assert_eq!(base.beta, shifted.beta);
    }

    #[test]
    fn test_annualization_is_fixed() {
        // Same daily returns, different lengths: mean_return stays mean * 252
        let short = series("S", &[100.0, 101.0, 100.0, 101.0, 100.0]);
        let long = series("S", &[100.0, 101.0, 100.0, 101.0, 100.0, 101.0, 100.0, 101.0, 100.0]);
        let market = series("M", &[100.0, 103.0, 101.0, 104.0, 100.0, 102.0, 99.0, 105.0, 104.0]);

        let engine = MetricsEngine::default();
        for s in [&short, &long] {
            let metrics = engine.compute(s, &market).unwrap();
            let returns = s.returns().values();
            let expected = returns.iter().sum::<f64>() / returns.len() as f64 * 252.0;
            assert!(close_to(metrics.mean_return, expected));
        }
    }

    #[test]
    fn test_no_common_dates() {
        let stock = series_from("S", 1, &[100.0, 101.0, 102.0]);
        let market = series_from("M", 10, &[100.0, 101.0, 102.0]);

        assert_eq!(
            MetricsEngine::default().compute(&stock, &market),
            Err(MetricsError::EmptyAlignment)
        );
    }

    #[test]
    fn test_single_aligned_return() {
        let stock = series("S", &[100.0, 101.0]);
        let market = series("M", &[100.0, 102.0]);

        assert_eq!(
            MetricsEngine::default().compute(&stock, &market),
            Err(MetricsError::InsufficientData(1))
        );
    }

    #[test]
    fn test_zero_volatility() {
        let stock = series("S", &[100.0, 100.0, 100.0, 100.0]);
        let market = series("M", &[100.0, 101.0, 100.0, 103.0]);

        assert_eq!(
            MetricsEngine::default().compute(&stock, &market),
            Err(MetricsError::ZeroVolatility)
        );
    }

    #[test]
    fn test_zero_benchmark_variance() {
        let stock = series("S", &[100.0, 102.0, 101.0, 105.0]);
        let market = series("M", &[100.0, 100.0, 100.0, 100.0]);

        assert_eq!(
            MetricsEngine::default().compute(&stock, &market),
            Err(MetricsError::ZeroBenchmarkVariance)
        );
    }

    #[test]
    fn test_constant_growth_stock_has_zero_volatility() {
        // 10% every day: the computed spread is rounding noise, not zero
        let stock = series("S", &[100.0, 110.0, 121.0, 133.1, 146.41]);
        let market = series("M", &[100.0, 101.0, 100.0, 103.0, 102.0]);

        assert_eq!(
            MetricsEngine::default().compute(&stock, &market),
            Err(MetricsError::ZeroVolatility)
        );
    }

    #[test]
    fn test_constant_growth_benchmark_has_zero_variance() {
        let stock = series("S", &[100.0, 102.0, 101.0, 105.0, 104.0]);
        let market = series("M", &[100.0, 110.0, 121.0, 133.1, 146.41]);

        assert_eq!(
            MetricsEngine::default().compute(&stock, &market),
            Err(MetricsError::ZeroBenchmarkVariance)
        );
    }

    #[test]
    fn test_drawdown_sign() {
        let market = series("M", &[100.0, 101.0, 100.0, 103.0, 102.0, 104.0]);
        let engine = MetricsEngine::default();

        let rising = series("UP", &[100.0, 101.0, 103.0, 103.0, 110.0, 111.0]);
        assert_eq!(engine.compute(&rising, &market).unwrap().max_drawdown, 0.0);

        let dipping = series("DIP", &[100.0, 110.0, 99.0, 120.0, 60.0, 130.0]);
        let dd = engine.compute(&dipping, &market).unwrap().max_drawdown;
        assert!(close_to(dd, 60.0 / 120.0 - 1.0));
    }

    #[test]
    fn test_beta_matches_direct_computation() {
        let stock = series("S", &[50.0, 51.0, 49.5, 52.0, 53.5, 52.5, 54.0]);
        let market = series("M", &[10.0, 10.1, 9.9, 10.3, 10.4, 10.35, 10.5]);

        let metrics = MetricsEngine::default().compute(&stock, &market).unwrap();
        let xs = stock.returns().values();
        let ys = market.returns().values();
        let expected = sample_covariance(&xs, &ys).unwrap() / sample_variance(&ys).unwrap();

        assert!(close_to(metrics.beta, expected));
    }
}
