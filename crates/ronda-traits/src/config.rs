//! Risk calculation configuration.
//!
//! [`RiskConfig`] is an immutable value object owned by each calculator.
//! It validates itself before any calculator may use it; constructing a
//! calculator with an invalid config fails immediately with
//! [`RiskError::InvalidConfig`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RiskError};

/// Value-at-Risk estimation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VarMethod {
    /// Historical simulation using the empirical return distribution
    #[default]
    Historical,
    /// Parametric (variance-covariance) method assuming Gaussian daily returns
    Parametric,
    /// Monte Carlo simulation of cumulative horizon returns
    MonteCarlo,
}

impl VarMethod {
    /// String name of the method, as used in serialized results.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Historical => "historical",
            Self::Parametric => "parametric",
            Self::MonteCarlo => "monte_carlo",
        }
    }
}

impl fmt::Display for VarMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VarMethod {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "historical" => Ok(Self::Historical),
            "parametric" => Ok(Self::Parametric),
            "monte_carlo" => Ok(Self::MonteCarlo),
            other => Err(RiskError::InvalidMethod(other.to_string())),
        }
    }
}

/// Configuration for a risk calculation.
///
/// A config is validated once, at calculator construction, and treated as
/// immutable afterwards. Parameter sweep helpers never mutate a shared
/// config; they clone it with one field overridden per iteration.
///
/// # Example
///
/// ```
/// use ronda_traits::{RiskConfig, VarMethod};
///
/// let config = RiskConfig {
///     confidence_level: 0.99,
///     time_horizon_days: 10,
///     var_method: VarMethod::Historical,
///     ..RiskConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Confidence level in `[0.5, 1.0)`, e.g. 0.95 or 0.99
    pub confidence_level: f64,

    /// Holding period for the risk estimate, in trading days (≥ 1)
    pub time_horizon_days: usize,

    /// Estimation method used when no per-call override is given
    pub var_method: VarMethod,

    /// Number of Monte Carlo paths (≥ 1000)
    pub monte_carlo_simulations: usize,

    /// Historical lookback used by callers when assembling return series (≥ 30)
    pub historical_lookback_days: usize,

    /// Window for correlation/exposure estimation (≥ 20)
    pub correlation_window_days: usize,

    /// If true, historical VaR/CVaR use RiskMetrics-style decayed weights
    /// instead of uniform weights
    pub exponential_weighting: bool,

    /// Decay factor in `(0.5, 1.0)` when exponential weighting is enabled
    pub lambda_decay: f64,

    /// Fixed seed for Monte Carlo simulation. With a seed set, two calls
    /// with identical inputs produce bit-identical results; without one,
    /// each call draws fresh entropy.
    pub random_seed: Option<u64>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            time_horizon_days: 1,
            var_method: VarMethod::Historical,
            monte_carlo_simulations: 10_000,
            historical_lookback_days: 252,
            correlation_window_days: 60,
            exponential_weighting: false,
            lambda_decay: 0.94, // RiskMetrics daily decay
            random_seed: None,
        }
    }
}

impl RiskConfig {
    /// Validate every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidConfig`] naming the first out-of-range
    /// field.
    pub fn validate(&self) -> Result<()> {
        if !(0.5..1.0).contains(&self.confidence_level) {
            return Err(RiskError::InvalidConfig(format!(
                "confidence_level must be in [0.5, 1.0), got {}",
                self.confidence_level
            )));
        }
        if self.time_horizon_days < 1 {
            return Err(RiskError::InvalidConfig(
                "time_horizon_days must be at least 1".to_string(),
            ));
        }
        if self.monte_carlo_simulations < 1000 {
            return Err(RiskError::InvalidConfig(format!(
                "monte_carlo_simulations must be at least 1000, got {}",
                self.monte_carlo_simulations
            )));
        }
        if self.historical_lookback_days < 30 {
            return Err(RiskError::InvalidConfig(format!(
                "historical_lookback_days must be at least 30, got {}",
                self.historical_lookback_days
            )));
        }
        if self.correlation_window_days < 20 {
            return Err(RiskError::InvalidConfig(format!(
                "correlation_window_days must be at least 20, got {}",
                self.correlation_window_days
            )));
        }
        if self.lambda_decay <= 0.5 || self.lambda_decay >= 1.0 {
            return Err(RiskError::InvalidConfig(format!(
                "lambda_decay must be in (0.5, 1.0), got {}",
                self.lambda_decay
            )));
        }
        Ok(())
    }

    /// Clone this config with a different confidence level.
    ///
    /// Used by the sweep helpers so the shared config is never mutated.
    pub fn with_confidence_level(&self, confidence_level: f64) -> Self {
        Self {
            confidence_level,
            ..self.clone()
        }
    }

    /// Clone this config with a different time horizon.
    pub fn with_time_horizon(&self, time_horizon_days: usize) -> Self {
        Self {
            time_horizon_days,
            ..self.clone()
        }
    }
}
