//! Rolling-window VaR backtesting.
//!
//! Re-estimates VaR on a trailing window at every step and compares the
//! prediction with the realized loss over the following horizon. A
//! well-calibrated model shows a violation rate close to
//! `1 − confidence_level`.

use serde::{Deserialize, Serialize};

use ronda_traits::stats::scale_returns_to_horizon;
use ronda_traits::{Result, RiskError, VarMethod};

use crate::var::{VarCalculator, calculate_with_config};

/// Default trailing window: one trading year.
pub const DEFAULT_WINDOW_SIZE: usize = 252;

/// One evaluation period of a VaR backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarBacktestRecord {
    /// Index into the input series where the forward window starts
    pub index: usize,

    /// Predicted VaR over the horizon, as a fraction of value
    pub predicted_pct: f64,

    /// Realized cumulative return over the next horizon days
    pub realized_pct: f64,

    /// Whether the realized loss was worse than predicted
    pub violation: bool,
}

/// Outcome of a rolling-window VaR backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarBacktestResult {
    /// Trailing window length used for each estimate
    pub window_size: usize,

    /// Number of evaluation periods
    pub n_windows: usize,

    /// Number of periods where realized loss exceeded predicted VaR
    pub violations: usize,

    /// `violations / n_windows`
    pub violation_rate: f64,

    /// `1 − confidence_level`: the rate a calibrated model should show
    pub expected_rate: f64,

    /// Full per-period table
    pub records: Vec<VarBacktestRecord>,
}

impl VarBacktestResult {
    /// Whether the observed violation rate is within `tolerance` of the
    /// expected rate.
    pub fn is_calibrated(&self, tolerance: f64) -> bool {
        (self.violation_rate - self.expected_rate).abs() <= tolerance
    }
}

impl VarCalculator {
    /// Backtest VaR predictions over a rolling trailing window.
    ///
    /// For each index `i` from `window_size` through
    /// `len − time_horizon_days`, VaR is estimated from the trailing
    /// `window_size` returns and compared with the realized cumulative
    /// return over the next `time_horizon_days` days. A violation is
    /// flagged when the realized loss is more negative than the
    /// prediction.
    ///
    /// # Arguments
    ///
    /// * `portfolio_returns` - Daily fractional returns, oldest first
    /// * `portfolio_value` - Portfolio value estimates are scaled against
    /// * `method` - Overrides the config's method for every window
    /// * `window_size` - Trailing estimation window; defaults to
    ///   [`DEFAULT_WINDOW_SIZE`] when `None`
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InsufficientData`] when the series is shorter
    /// than `window_size + time_horizon_days`, before any computation
    /// starts.
    pub fn backtest(
        &self,
        portfolio_returns: &[f64],
        portfolio_value: f64,
        method: Option<VarMethod>,
        window_size: Option<usize>,
    ) -> Result<VarBacktestResult> {
        let window_size = window_size.unwrap_or(DEFAULT_WINDOW_SIZE);
        let horizon = self.config().time_horizon_days;

        if portfolio_returns.len() < window_size + horizon {
            return Err(RiskError::InsufficientData(format!(
                "backtest needs at least {} observations (window {} + horizon {}), got {}",
                window_size + horizon,
                window_size,
                horizon,
                portfolio_returns.len()
            )));
        }

        let mut records = Vec::new();
        let mut violations = 0;

        for i in window_size..=(portfolio_returns.len() - horizon) {
            let window = &portfolio_returns[i - window_size..i];
            let predicted =
                calculate_with_config(self.config(), window, portfolio_value, method)?;

            // Realized cumulative return over the forward horizon
            let forward = &portfolio_returns[i..i + horizon];
            let realized_pct = scale_returns_to_horizon(forward, horizon)[0];

            let violation = realized_pct < predicted.pct;
            if violation {
                violations += 1;
            }

            records.push(VarBacktestRecord {
                index: i,
                predicted_pct: predicted.pct,
                realized_pct,
                violation,
            });
        }

        let n_windows = records.len();
        Ok(VarBacktestResult {
            window_size,
            n_windows,
            violations,
            violation_rate: violations as f64 / n_windows as f64,
            expected_rate: 1.0 - self.config().confidence_level,
            records,
        })
    }
}
