//! Numeric primitives shared by every risk metric.
//!
//! This module provides the building blocks the concrete calculators are
//! composed from: horizon scaling via overlapping sums, exponential decay
//! weighting, and percentile estimators over empirical distributions.

/// Minimum threshold for a standard deviation to be treated as non-zero.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Scale a daily return series to a multi-day horizon using overlapping sums.
///
/// For `horizon_days <= 1` the input is returned unchanged. For longer
/// horizons, every window of `horizon_days` consecutive returns is summed,
/// producing `n - horizon_days + 1` observations.
///
/// The windows deliberately overlap: adjacent scaled observations share
/// `horizon_days - 1` daily returns, trading statistical independence for
/// sample-size preservation. Non-overlapping blocks would divide the
/// sample count by the horizon.
///
/// # Arguments
///
/// * `returns` - Daily fractional returns, oldest first
/// * `horizon_days` - Holding period in trading days
///
/// # Example
///
/// ```
/// use ronda_traits::stats::scale_returns_to_horizon;
///
/// let daily = vec![0.5, 0.25, -0.25, 0.5];
/// let scaled = scale_returns_to_horizon(&daily, 2);
/// assert_eq!(scaled, vec![0.75, 0.0, 0.25]);
/// ```
pub fn scale_returns_to_horizon(returns: &[f64], horizon_days: usize) -> Vec<f64> {
    if horizon_days <= 1 || returns.len() < horizon_days {
        return returns.to_vec();
    }

    let n_windows = returns.len() - horizon_days + 1;
    let mut scaled = Vec::with_capacity(n_windows);

    // Rolling sum: add the entering observation, drop the leaving one.
    let mut window_sum: f64 = returns[..horizon_days].iter().sum();
    scaled.push(window_sum);
    for i in horizon_days..returns.len() {
        window_sum += returns[i] - returns[i - horizon_days];
        scaled.push(window_sum);
    }

    scaled
}

/// Exponential decay weights for a series of `n` observations.
///
/// Produces `lambda^0 .. lambda^(n-1)` reversed so the most recent
/// observation (last index) receives the largest weight, normalized to sum
/// to 1.0. This is the RiskMetrics weighting scheme for historical VaR.
///
/// # Arguments
///
/// * `n` - Number of observations
/// * `lambda_decay` - Decay factor in `(0, 1)`; higher means slower decay
///
/// # Example
///
/// ```
/// use ronda_traits::stats::exponential_weights;
///
/// let weights = exponential_weights(3, 0.94);
/// let total: f64 = weights.iter().sum();
/// assert!((total - 1.0).abs() < 1e-12);
/// assert!(weights[2] > weights[1] && weights[1] > weights[0]);
/// ```
pub fn exponential_weights(n: usize, lambda_decay: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }

    let mut weights: Vec<f64> = (0..n).map(|i| lambda_decay.powi(i as i32)).collect();
    weights.reverse();

    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }

    weights
}

/// Weighted percentile of an empirical distribution.
///
/// Sorts the data ascending, accumulates the matching weights in the same
/// order, and returns the data value at the first index where cumulative
/// weight reaches or exceeds `percentile`.
///
/// # Arguments
///
/// * `data` - Observations (unsorted)
/// * `weights` - One weight per observation, expected to sum to ~1.0
/// * `percentile` - Target cumulative weight as a fraction in `[0, 1]`
///
/// # Panics
///
/// Does not panic; an empty input returns NaN and mismatched lengths are
/// truncated to the shorter of the two.
pub fn weighted_percentile(data: &[f64], weights: &[f64], percentile: f64) -> f64 {
    let n = data.len().min(weights.len());
    if n == 0 {
        return f64::NAN;
    }

    let mut indexed: Vec<(f64, f64)> = data[..n]
        .iter()
        .zip(weights[..n].iter())
        .map(|(&d, &w)| (d, w))
        .collect();
    indexed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut cumulative = 0.0;
    for &(value, weight) in &indexed {
        cumulative += weight;
        if cumulative >= percentile {
            return value;
        }
    }

    // Cumulative weight fell short of the target (rounding); take the max.
    indexed[n - 1].0
}

/// Percentile with linear interpolation between order statistics.
///
/// Matches numpy's default `percentile` behaviour: for a sorted sample of
/// size `n`, the target rank is `percentile * (n - 1)` and fractional
/// ranks interpolate linearly between the two neighbouring observations.
///
/// # Arguments
///
/// * `data` - Observations (unsorted)
/// * `percentile` - Fraction in `[0, 1]`
///
/// # Example
///
/// ```
/// use ronda_traits::stats::linear_percentile;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0];
/// assert!((linear_percentile(&data, 0.5) - 2.5).abs() < 1e-12);
/// ```
pub fn linear_percentile(data: &[f64], percentile: f64) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = percentile.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        return sorted[lower];
    }

    let fraction = rank - lower as f64;
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

/// Arithmetic mean of a slice.
///
/// Returns NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (N-1 denominator).
///
/// Returns 0.0 for fewer than two observations.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
