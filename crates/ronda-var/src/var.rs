//! Value-at-Risk calculator.
//!
//! Supports three interchangeable estimation methods:
//! - **Historical simulation**: percentile of the empirical (horizon-scaled)
//!   return distribution, optionally with RiskMetrics exponential weights
//! - **Parametric**: Gaussian quantile from sample mean and volatility
//! - **Monte Carlo**: percentile of simulated cumulative horizon returns
//!
//! All methods operate on a percentage-of-value scale with losses negative;
//! the final result is scaled by the portfolio value.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde_json::json;
use statrs::distribution::{ContinuousCDF, Normal as StandardNormal};

use ronda_traits::stats::{
    exponential_weights, linear_percentile, mean, sample_std, scale_returns_to_horizon,
    weighted_percentile,
};
use ronda_traits::{Result, RiskConfig, RiskError, VarMethod, validate_inputs};

use crate::result::{VarResult, series_metadata};

/// Value-at-Risk calculator.
///
/// Owns a validated [`RiskConfig`]; the config's method can be overridden
/// per call.
///
/// # Example
///
/// ```rust,ignore
/// use ronda_var::VarCalculator;
/// use ronda_traits::{RiskConfig, VarMethod};
///
/// let calculator = VarCalculator::new(RiskConfig::default())?;
/// let result = calculator.calculate(&returns, 1_000_000.0, None)?;
/// println!("1-day 95% VaR: {:.0}", result.value);
/// ```
#[derive(Debug, Clone)]
pub struct VarCalculator {
    config: RiskConfig,
}

impl VarCalculator {
    /// Create a new calculator from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidConfig`] when any config field is out
    /// of range.
    pub fn new(config: RiskConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this calculator runs with.
    pub const fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Compute Value-at-Risk for a portfolio return series.
    ///
    /// # Arguments
    ///
    /// * `portfolio_returns` - Daily fractional returns, oldest first
    /// * `portfolio_value` - Current portfolio value in currency units
    /// * `method` - Overrides the config's method for this call only
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidInput`] when the return series fails
    /// validation.
    pub fn calculate(
        &self,
        portfolio_returns: &[f64],
        portfolio_value: f64,
        method: Option<VarMethod>,
    ) -> Result<VarResult> {
        calculate_with_config(&self.config, portfolio_returns, portfolio_value, method)
    }
}

/// Compute VaR against an explicit config.
///
/// The sweep helpers hand in a cloned config with one field overridden,
/// so a shared calculator is never mutated mid-sweep.
pub(crate) fn calculate_with_config(
    config: &RiskConfig,
    portfolio_returns: &[f64],
    portfolio_value: f64,
    method: Option<VarMethod>,
) -> Result<VarResult> {
    validate_inputs(Some(portfolio_returns), None, None)?;

    let method = method.unwrap_or(config.var_method);
    let pct = match method {
        VarMethod::Historical => historical_var_pct(config, portfolio_returns),
        VarMethod::Parametric => parametric_var_pct(config, portfolio_returns)?,
        VarMethod::MonteCarlo => monte_carlo_var_pct(config, portfolio_returns)?,
    };

    let mut metadata = series_metadata(portfolio_returns);
    if method == VarMethod::MonteCarlo {
        metadata.insert(
            "simulations".to_string(),
            json!(config.monte_carlo_simulations),
        );
    }

    Ok(VarResult {
        value: pct * portfolio_value,
        pct,
        confidence_level: config.confidence_level,
        time_horizon_days: config.time_horizon_days,
        method,
        portfolio_value,
        calculated_at: chrono::Utc::now(),
        metadata,
    })
}

/// Historical-simulation VaR on the percentage scale.
///
/// Scales the series to the horizon with overlapping sums, then takes the
/// `(1 − confidence)` percentile: weighted when exponential weighting is
/// enabled, linear-interpolated otherwise.
pub(crate) fn historical_var_pct(config: &RiskConfig, returns: &[f64]) -> f64 {
    let scaled = scale_returns_to_horizon(returns, config.time_horizon_days);
    let tail = 1.0 - config.confidence_level;

    if config.exponential_weighting {
        let weights = exponential_weights(scaled.len(), config.lambda_decay);
        weighted_percentile(&scaled, &weights, tail)
    } else {
        linear_percentile(&scaled, tail)
    }
}

/// Parametric (Gaussian) VaR on the percentage scale.
///
/// VaR% = μ·T + z·σ·√T on the *unscaled* daily moments, where z is the
/// standard-normal quantile at `(1 − confidence)` (negative above 50%
/// confidence). Assumes i.i.d. normal daily returns, a known limitation
/// versus the historical and Monte Carlo methods, which do not need
/// normality for horizon scaling.
pub(crate) fn parametric_var_pct(config: &RiskConfig, returns: &[f64]) -> Result<f64> {
    let mu = mean(returns);
    let sigma = sample_std(returns);
    let horizon = config.time_horizon_days as f64;
    let z = standard_normal()?.inverse_cdf(1.0 - config.confidence_level);

    Ok(mu * horizon + z * sigma * horizon.sqrt())
}

/// Monte Carlo VaR on the percentage scale.
pub(crate) fn monte_carlo_var_pct(config: &RiskConfig, returns: &[f64]) -> Result<f64> {
    let simulated = simulate_cumulative_returns(config, returns)?;
    Ok(linear_percentile(&simulated, 1.0 - config.confidence_level))
}

/// Simulate cumulative horizon returns from Normal(μ, σ) daily draws.
///
/// Draws `monte_carlo_simulations` independent paths of `time_horizon_days`
/// daily returns each and sums every path. With `random_seed` set in the
/// config the generator is seeded deterministically, so repeated calls
/// produce bit-identical paths; the CVaR calculator relies on this to
/// regenerate the distribution its VaR threshold came from.
pub(crate) fn simulate_cumulative_returns(
    config: &RiskConfig,
    returns: &[f64],
) -> Result<Vec<f64>> {
    let mu = mean(returns);
    let sigma = sample_std(returns);

    let normal = Normal::new(mu, sigma)
        .map_err(|e| RiskError::InvalidInput(format!("cannot sample daily returns: {e}")))?;

    let mut rng = match config.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut simulated = Vec::with_capacity(config.monte_carlo_simulations);
    for _ in 0..config.monte_carlo_simulations {
        let cumulative: f64 = (0..config.time_horizon_days)
            .map(|_| normal.sample(&mut rng))
            .sum();
        simulated.push(cumulative);
    }

    Ok(simulated)
}

/// Standard normal distribution for quantile and density lookups.
pub(crate) fn standard_normal() -> Result<StandardNormal> {
    StandardNormal::new(0.0, 1.0).map_err(|e| RiskError::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn synthetic_returns(n: usize) -> Vec<f64> {
        // Deterministic pseudo-random daily returns centred near zero
        let normal = Normal::new(0.0005, 0.015).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = RiskConfig {
            confidence_level: 1.5,
            ..RiskConfig::default()
        };
        assert!(matches!(
            VarCalculator::new(config),
            Err(RiskError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_calculate_rejects_short_series() {
        let calculator = VarCalculator::new(RiskConfig::default()).unwrap();
        let result = calculator.calculate(&[0.01; 10], 1_000_000.0, None);
        assert!(matches!(result, Err(RiskError::InvalidInput(_))));
    }

    #[test]
    fn test_historical_var_is_a_loss() {
        let calculator = VarCalculator::new(RiskConfig::default()).unwrap();
        let returns = synthetic_returns(252);
        let result = calculator.calculate(&returns, 1_000_000.0, None).unwrap();

        assert!(result.pct < 0.0);
        assert!(result.value < 0.0);
        assert_relative_eq!(result.value, result.pct * 1_000_000.0);
        assert_eq!(result.method, VarMethod::Historical);
    }

    #[test]
    fn test_historical_var_matches_linear_percentile() {
        let calculator = VarCalculator::new(RiskConfig::default()).unwrap();
        let returns = synthetic_returns(252);
        let result = calculator.calculate(&returns, 1.0, None).unwrap();

        assert_relative_eq!(result.pct, linear_percentile(&returns, 0.05));
    }

    #[test]
    fn test_exponential_weighting_changes_estimate() {
        let returns = synthetic_returns(252);

        let plain = VarCalculator::new(RiskConfig::default()).unwrap();
        let weighted = VarCalculator::new(RiskConfig {
            exponential_weighting: true,
            ..RiskConfig::default()
        })
        .unwrap();

        let plain_var = plain.calculate(&returns, 1.0, None).unwrap();
        let weighted_var = weighted.calculate(&returns, 1.0, None).unwrap();

        assert!(plain_var.pct < 0.0);
        assert!(weighted_var.pct < 0.0);
        // Both are draws from the empirical distribution
        let min = returns.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(weighted_var.pct >= min);
    }

    #[test]
    fn test_parametric_var_closed_form() {
        let config = RiskConfig {
            var_method: VarMethod::Parametric,
            ..RiskConfig::default()
        };
        let calculator = VarCalculator::new(config).unwrap();
        let returns = synthetic_returns(252);
        let result = calculator.calculate(&returns, 1.0, None).unwrap();

        let mu = mean(&returns);
        let sigma = sample_std(&returns);
        let z = standard_normal().unwrap().inverse_cdf(0.05);
        assert_relative_eq!(result.pct, mu + z * sigma, epsilon = 1e-12);
    }

    #[test]
    fn test_parametric_var_scales_with_horizon() {
        let returns = synthetic_returns(252);
        let one_day = VarCalculator::new(RiskConfig {
            var_method: VarMethod::Parametric,
            ..RiskConfig::default()
        })
        .unwrap();
        let ten_day = VarCalculator::new(RiskConfig {
            var_method: VarMethod::Parametric,
            time_horizon_days: 10,
            ..RiskConfig::default()
        })
        .unwrap();

        let var_1 = one_day.calculate(&returns, 1.0, None).unwrap();
        let var_10 = ten_day.calculate(&returns, 1.0, None).unwrap();

        // Longer horizon, more extreme loss estimate
        assert!(var_10.pct < var_1.pct);
    }

    #[test]
    fn test_monte_carlo_deterministic_with_seed() {
        let config = RiskConfig {
            var_method: VarMethod::MonteCarlo,
            monte_carlo_simulations: 2_000,
            random_seed: Some(42),
            ..RiskConfig::default()
        };
        let calculator = VarCalculator::new(config).unwrap();
        let returns = synthetic_returns(252);

        let first = calculator.calculate(&returns, 1_000_000.0, None).unwrap();
        let second = calculator.calculate(&returns, 1_000_000.0, None).unwrap();

        assert_eq!(first.pct.to_bits(), second.pct.to_bits());
        assert_eq!(first.value.to_bits(), second.value.to_bits());
    }

    #[test]
    fn test_monte_carlo_close_to_parametric_one_day() {
        let returns = synthetic_returns(504);
        let config = RiskConfig {
            monte_carlo_simulations: 100_000,
            random_seed: Some(7),
            ..RiskConfig::default()
        };
        let calculator = VarCalculator::new(config).unwrap();

        let mc = calculator
            .calculate(&returns, 1.0, Some(VarMethod::MonteCarlo))
            .unwrap();
        let parametric = calculator
            .calculate(&returns, 1.0, Some(VarMethod::Parametric))
            .unwrap();

        // The generative model is the same Gaussian, so the estimates agree
        // up to simulation noise
        assert_abs_diff_eq!(mc.pct, parametric.pct, epsilon = 0.003);
    }

    #[test]
    fn test_method_override_does_not_change_config() {
        let calculator = VarCalculator::new(RiskConfig::default()).unwrap();
        let returns = synthetic_returns(252);

        let result = calculator
            .calculate(&returns, 1.0, Some(VarMethod::Parametric))
            .unwrap();
        assert_eq!(result.method, VarMethod::Parametric);
        assert_eq!(calculator.config().var_method, VarMethod::Historical);
    }

    #[test]
    fn test_more_confidence_more_extreme() {
        let returns = synthetic_returns(252);

        for method in [
            VarMethod::Historical,
            VarMethod::Parametric,
            VarMethod::MonteCarlo,
        ] {
            let var_95 = VarCalculator::new(RiskConfig {
                confidence_level: 0.95,
                random_seed: Some(11),
                ..RiskConfig::default()
            })
            .unwrap()
            .calculate(&returns, 1.0, Some(method))
            .unwrap();

            let var_99 = VarCalculator::new(RiskConfig {
                confidence_level: 0.99,
                random_seed: Some(11),
                ..RiskConfig::default()
            })
            .unwrap()
            .calculate(&returns, 1.0, Some(method))
            .unwrap();

            assert!(
                var_99.pct <= var_95.pct,
                "VaR(99%) must be at least as extreme as VaR(95%) for {method}"
            );
        }
    }

    #[test]
    fn test_metadata_contents() {
        let config = RiskConfig {
            var_method: VarMethod::MonteCarlo,
            random_seed: Some(3),
            ..RiskConfig::default()
        };
        let calculator = VarCalculator::new(config).unwrap();
        let returns = synthetic_returns(100);
        let result = calculator.calculate(&returns, 1.0, None).unwrap();

        assert_eq!(result.metadata["observations"], json!(100));
        assert_eq!(result.metadata["simulations"], json!(10_000));
        assert!(result.metadata.contains_key("volatility"));
    }
}
