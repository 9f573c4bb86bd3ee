//! Conditional Value-at-Risk (Expected Shortfall) calculator.
//!
//! CVaR answers "how bad is it when it's worse than VaR": the average loss
//! in the worst `(1 − confidence)` fraction of outcomes. The calculator
//! composes a [`VarCalculator`] and always obtains the VaR threshold first;
//! every method is conditioned on that threshold.

use serde::{Deserialize, Serialize};
use serde_json::json;
use statrs::distribution::{Continuous, ContinuousCDF};
use tracing::warn;

use ronda_traits::stats::{mean, sample_std, scale_returns_to_horizon};
use ronda_traits::{Result, RiskConfig, VarMethod, validate_inputs};

use crate::result::{CvarResult, VarResult, series_metadata};
use crate::var::{
    VarCalculator, calculate_with_config, simulate_cumulative_returns, standard_normal,
};

/// Conditional-VaR calculator.
///
/// Internally owns a [`VarCalculator`] constructed from the same config.
/// Computing the VaR threshold first is a hard dependency of every method,
/// not an optimization.
///
/// # Example
///
/// ```rust,ignore
/// use ronda_var::CvarCalculator;
/// use ronda_traits::RiskConfig;
///
/// let calculator = CvarCalculator::new(RiskConfig::default())?;
/// let result = calculator.calculate(&returns, 1_000_000.0, None)?;
/// assert!(result.value <= result.var_threshold * 1_000_000.0);
/// ```
#[derive(Debug, Clone)]
pub struct CvarCalculator {
    config: RiskConfig,
    var: VarCalculator,
}

/// Side-by-side VaR/CVaR comparison for one return series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarCvarComparison {
    /// The VaR row
    pub var: VarResult,

    /// The CVaR row at the same confidence/horizon/method
    pub cvar: CvarResult,

    /// `CVaR% − VaR%`; non-positive (up to resampling noise for
    /// unseeded Monte Carlo, where the two rows simulate independently)
    pub spread_pct: f64,

    /// The same spread in currency units
    pub spread_value: f64,
}

impl CvarCalculator {
    /// Create a new calculator from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidConfig`](ronda_traits::RiskError::InvalidConfig)
    /// when any config field is out of range.
    pub fn new(config: RiskConfig) -> Result<Self> {
        let var = VarCalculator::new(config.clone())?;
        Ok(Self { config, var })
    }

    /// The configuration this calculator runs with.
    pub const fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// The VaR calculator this CVaR calculator composes.
    pub const fn var_calculator(&self) -> &VarCalculator {
        &self.var
    }

    /// Compute Conditional VaR for a portfolio return series.
    ///
    /// # Arguments
    ///
    /// * `portfolio_returns` - Daily fractional returns, oldest first
    /// * `portfolio_value` - Current portfolio value in currency units
    /// * `method` - Overrides the config's method for this call only
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidInput`](ronda_traits::RiskError::InvalidInput)
    /// when the return series fails validation.
    pub fn calculate(
        &self,
        portfolio_returns: &[f64],
        portfolio_value: f64,
        method: Option<VarMethod>,
    ) -> Result<CvarResult> {
        calculate_cvar_with_config(&self.config, portfolio_returns, portfolio_value, method)
    }

    /// Recompute CVaR at each of the given confidence levels.
    ///
    /// # Errors
    ///
    /// Fails on invalid input or an out-of-range sweep level.
    pub fn cvar_by_confidence(
        &self,
        portfolio_returns: &[f64],
        portfolio_value: f64,
        confidence_levels: &[f64],
        method: Option<VarMethod>,
    ) -> Result<Vec<CvarResult>> {
        confidence_levels
            .iter()
            .map(|&level| {
                let config = self.config.with_confidence_level(level);
                config.validate()?;
                calculate_cvar_with_config(&config, portfolio_returns, portfolio_value, method)
            })
            .collect()
    }

    /// Recompute CVaR at each of the given time horizons (in trading days).
    ///
    /// # Errors
    ///
    /// Fails on invalid input or an invalid sweep horizon.
    pub fn cvar_by_horizon(
        &self,
        portfolio_returns: &[f64],
        portfolio_value: f64,
        horizons: &[usize],
        method: Option<VarMethod>,
    ) -> Result<Vec<CvarResult>> {
        horizons
            .iter()
            .map(|&horizon| {
                let config = self.config.with_time_horizon(horizon);
                config.validate()?;
                calculate_cvar_with_config(&config, portfolio_returns, portfolio_value, method)
            })
            .collect()
    }

    /// Compute VaR and CVaR side by side with their difference.
    ///
    /// # Errors
    ///
    /// Fails when either underlying calculation fails.
    pub fn compare_with_var(
        &self,
        portfolio_returns: &[f64],
        portfolio_value: f64,
        method: Option<VarMethod>,
    ) -> Result<VarCvarComparison> {
        let var = self.var.calculate(portfolio_returns, portfolio_value, method)?;
        let cvar = self.calculate(portfolio_returns, portfolio_value, method)?;
        let spread_pct = cvar.pct - var.pct;

        Ok(VarCvarComparison {
            spread_value: spread_pct * portfolio_value,
            spread_pct,
            var,
            cvar,
        })
    }
}

/// Compute CVaR against an explicit config.
fn calculate_cvar_with_config(
    config: &RiskConfig,
    portfolio_returns: &[f64],
    portfolio_value: f64,
    method: Option<VarMethod>,
) -> Result<CvarResult> {
    validate_inputs(Some(portfolio_returns), None, None)?;

    let method = method.unwrap_or(config.var_method);

    // The VaR percentile is the tail cutoff for every method
    let var_result = calculate_with_config(config, portfolio_returns, portfolio_value, Some(method))?;
    let var_pct = var_result.pct;

    let (cvar_pct, tail_observations) = match method {
        VarMethod::Historical => historical_cvar_pct(config, portfolio_returns, var_pct),
        VarMethod::Parametric => (
            parametric_cvar_pct(config, portfolio_returns)?,
            estimated_tail_count(config, portfolio_returns),
        ),
        VarMethod::MonteCarlo => (
            monte_carlo_cvar_pct(config, portfolio_returns, var_pct)?,
            estimated_tail_count(config, portfolio_returns),
        ),
    };

    let mut metadata = series_metadata(portfolio_returns);
    metadata.insert("var_threshold_pct".to_string(), json!(var_pct));
    metadata.insert("tail_observations".to_string(), json!(tail_observations));
    if method == VarMethod::MonteCarlo {
        metadata.insert(
            "simulations".to_string(),
            json!(config.monte_carlo_simulations),
        );
    }

    Ok(CvarResult {
        value: cvar_pct * portfolio_value,
        pct: cvar_pct,
        var_threshold: var_pct,
        tail_observations,
        confidence_level: config.confidence_level,
        time_horizon_days: config.time_horizon_days,
        method,
        portfolio_value,
        calculated_at: chrono::Utc::now(),
        metadata,
    })
}

/// Historical CVaR: mean of the scaled returns at or below the threshold.
///
/// An empty tail (possible with very small samples) falls back to the VaR
/// threshold itself as a conservative estimate, an explicit edge-case
/// policy, logged as a warning rather than escalated.
fn historical_cvar_pct(config: &RiskConfig, returns: &[f64], var_pct: f64) -> (f64, usize) {
    let scaled = scale_returns_to_horizon(returns, config.time_horizon_days);
    let tail: Vec<f64> = scaled.iter().copied().filter(|&r| r <= var_pct).collect();

    if tail.is_empty() {
        warn!(
            var_pct,
            observations = scaled.len(),
            "empty tail in historical CVaR, falling back to VaR threshold"
        );
        return (var_pct, 0);
    }

    (mean(&tail), tail.len())
}

/// Closed-form Gaussian Expected Shortfall.
///
/// CVaR% = μ·T − σ·√T·φ(z)/(1 − confidence), with φ the standard-normal
/// density at the same quantile z used for parametric VaR.
fn parametric_cvar_pct(config: &RiskConfig, returns: &[f64]) -> Result<f64> {
    let mu = mean(returns);
    let sigma = sample_std(returns);
    let horizon = config.time_horizon_days as f64;
    let tail = 1.0 - config.confidence_level;

    let normal = standard_normal()?;
    let z = normal.inverse_cdf(tail);
    let density = normal.pdf(z);

    Ok(mu * horizon - sigma * horizon.sqrt() * density / tail)
}

/// Monte Carlo CVaR: mean of simulated cumulative returns at or below the
/// threshold, using the same simulation approach (and seed policy) as the
/// VaR method. Same empty-tail fallback as historical.
fn monte_carlo_cvar_pct(config: &RiskConfig, returns: &[f64], var_pct: f64) -> Result<f64> {
    let simulated = simulate_cumulative_returns(config, returns)?;
    let tail: Vec<f64> = simulated.iter().copied().filter(|&r| r <= var_pct).collect();

    if tail.is_empty() {
        warn!(
            var_pct,
            simulations = simulated.len(),
            "empty tail in Monte Carlo CVaR, falling back to VaR threshold"
        );
        return Ok(var_pct);
    }

    Ok(mean(&tail))
}

/// Estimated tail count for methods without discrete tail observations.
///
/// Parametric and Monte Carlo CVaR report `n × (1 − confidence)`, a
/// documented approximation for diagnostics, not a measured count.
fn estimated_tail_count(config: &RiskConfig, returns: &[f64]) -> usize {
    (returns.len() as f64 * (1.0 - config.confidence_level)) as usize
}
