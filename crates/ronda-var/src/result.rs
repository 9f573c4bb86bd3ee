//! Immutable outputs of VaR and CVaR calculations.
//!
//! Results are created once per `calculate()` invocation, never mutated,
//! and serialize to a flat mapping suitable for a calling API or report
//! layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

use ronda_traits::VarMethod;
use ronda_traits::stats::{mean, sample_std};

/// Result of a Value-at-Risk calculation.
///
/// Sign convention: losses are negative, so `value` and `pct` are always
/// at or below zero for any confidence level above 50%.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarResult {
    /// VaR in currency units (≤ 0)
    pub value: f64,

    /// VaR as a fraction of portfolio value (≤ 0)
    pub pct: f64,

    /// Confidence level the estimate was computed at
    pub confidence_level: f64,

    /// Holding period in trading days
    pub time_horizon_days: usize,

    /// Estimation method used
    pub method: VarMethod,

    /// Portfolio value the figure was scaled against
    pub portfolio_value: f64,

    /// When the calculation ran
    pub calculated_at: DateTime<Utc>,

    /// Method-specific diagnostics (observation count, mean/vol, etc.)
    pub metadata: BTreeMap<String, Value>,
}

/// Result of a Conditional-VaR (Expected-Shortfall) calculation.
///
/// Carries the same fields as [`VarResult`] plus the VaR threshold that
/// defined the tail and the number of observations in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvarResult {
    /// CVaR in currency units (≤ 0, at least as extreme as the VaR)
    pub value: f64,

    /// CVaR as a fraction of portfolio value (≤ 0)
    pub pct: f64,

    /// VaR percentile used as the tail cutoff, as a fraction of value
    pub var_threshold: f64,

    /// Number of return observations at or below the threshold.
    ///
    /// For the historical method this is an actual count. Parametric and
    /// Monte Carlo have no discrete tail observations, so the count is
    /// estimated as `observations × (1 − confidence_level)`.
    pub tail_observations: usize,

    /// Confidence level the estimate was computed at
    pub confidence_level: f64,

    /// Holding period in trading days
    pub time_horizon_days: usize,

    /// Estimation method used
    pub method: VarMethod,

    /// Portfolio value the figure was scaled against
    pub portfolio_value: f64,

    /// When the calculation ran
    pub calculated_at: DateTime<Utc>,

    /// Method-specific diagnostics
    pub metadata: BTreeMap<String, Value>,
}

/// Summary diagnostics of an input return series, attached to every
/// result's metadata.
pub(crate) fn series_metadata(returns: &[f64]) -> BTreeMap<String, Value> {
    let min = returns.iter().copied().fold(f64::INFINITY, f64::min);
    let max = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut metadata = BTreeMap::new();
    metadata.insert("observations".to_string(), json!(returns.len()));
    metadata.insert("mean".to_string(), json!(mean(returns)));
    metadata.insert("volatility".to_string(), json!(sample_std(returns)));
    metadata.insert("min".to_string(), json!(min));
    metadata.insert("max".to_string(), json!(max));
    metadata
}
