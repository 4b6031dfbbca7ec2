//! Sample statistics over plain `f64` slices.
//!
//! Variance and covariance use the n-1 denominator. Functions return `None`
//! when the statistic is undefined for the input length.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn sample_covariance(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;
    let sum: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    Some(sum / (xs.len() - 1) as f64)
}

pub fn sample_variance(values: &[f64]) -> Option<f64> {
    sample_covariance(values, values)
}

pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Growth of one unit invested: running product of `1 + r`
pub fn cumulative_path(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |value, r| {
            *value *= 1.0 + r;
            Some(*value)
        })
        .collect()
}

/// Minimum of `value / running_max - 1` along the path. Zero for an empty or
/// non-decreasing path, negative otherwise.
pub fn max_drawdown(path: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for &value in path {
        peak = peak.max(value);
        worst = worst.min(value / peak - 1.0);
    }

    worst
}
