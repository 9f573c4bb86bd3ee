//! Multi-confidence and multi-horizon VaR sweeps.
//!
//! Each sweep point runs against a cloned config with the one field
//! overridden, then validated. The calculator's own config is never
//! mutated, so a shared calculator stays safe under concurrent use.

use ronda_traits::{Result, VarMethod};

use crate::result::VarResult;
use crate::var::{VarCalculator, calculate_with_config};

impl VarCalculator {
    /// Recompute VaR at each of the given confidence levels.
    ///
    /// # Errors
    ///
    /// Fails on invalid input, or with
    /// [`RiskError::InvalidConfig`](ronda_traits::RiskError::InvalidConfig)
    /// when a sweep level is outside `[0.5, 1.0)`.
    pub fn var_by_confidence(
        &self,
        portfolio_returns: &[f64],
        portfolio_value: f64,
        confidence_levels: &[f64],
        method: Option<VarMethod>,
    ) -> Result<Vec<VarResult>> {
        confidence_levels
            .iter()
            .map(|&level| {
                let config = self.config().with_confidence_level(level);
                config.validate()?;
                calculate_with_config(&config, portfolio_returns, portfolio_value, method)
            })
            .collect()
    }

    /// Recompute VaR at each of the given time horizons (in trading days).
    ///
    /// # Errors
    ///
    /// Fails on invalid input or an invalid sweep horizon.
    pub fn var_by_horizon(
        &self,
        portfolio_returns: &[f64],
        portfolio_value: f64,
        horizons: &[usize],
        method: Option<VarMethod>,
    ) -> Result<Vec<VarResult>> {
        horizons
            .iter()
            .map(|&horizon| {
                let config = self.config().with_time_horizon(horizon);
                config.validate()?;
                calculate_with_config(&config, portfolio_returns, portfolio_value, method)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};
    use ronda_traits::RiskConfig;

    fn synthetic_returns(n: usize) -> Vec<f64> {
        let normal = Normal::new(0.0005, 0.015).unwrap();
        let mut rng = StdRng::seed_from_u64(19);
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    #[test]
    fn test_var_by_confidence_monotone() {
        let calculator = VarCalculator::new(RiskConfig::default()).unwrap();
        let returns = synthetic_returns(252);
        let levels = [0.90, 0.95, 0.99];

        let results = calculator
            .var_by_confidence(&returns, 1_000_000.0, &levels, None)
            .unwrap();

        assert_eq!(results.len(), 3);
        for (result, &level) in results.iter().zip(levels.iter()) {
            assert_eq!(result.confidence_level, level);
        }
        // Higher confidence, more extreme loss
        assert!(results[2].pct <= results[1].pct);
        assert!(results[1].pct <= results[0].pct);
    }

    #[test]
    fn test_var_by_confidence_leaves_config_untouched() {
        let calculator = VarCalculator::new(RiskConfig::default()).unwrap();
        let returns = synthetic_returns(252);

        calculator
            .var_by_confidence(&returns, 1.0, &[0.90, 0.99], None)
            .unwrap();

        assert_eq!(calculator.config().confidence_level, 0.95);
    }

    #[test]
    fn test_var_by_confidence_rejects_out_of_range_level() {
        let calculator = VarCalculator::new(RiskConfig::default()).unwrap();
        let returns = synthetic_returns(252);

        assert!(
            calculator
                .var_by_confidence(&returns, 1.0, &[0.95, 1.2], None)
                .is_err()
        );
    }

    #[test]
    fn test_var_by_horizon_widens_with_horizon() {
        let config = RiskConfig {
            var_method: VarMethod::Parametric,
            ..RiskConfig::default()
        };
        let calculator = VarCalculator::new(config).unwrap();
        let returns = synthetic_returns(252);

        let results = calculator
            .var_by_horizon(&returns, 1.0, &[1, 5, 21], None)
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].time_horizon_days, 1);
        assert_eq!(results[2].time_horizon_days, 21);
        assert!(results[2].pct < results[0].pct);
        assert_eq!(calculator.config().time_horizon_days, 1);
    }
}
