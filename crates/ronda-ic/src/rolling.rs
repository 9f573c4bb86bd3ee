//! Rolling Information-Coefficient factor weighting.
//!
//! Measures, per factor, the rank correlation between a cross-sectional
//! score snapshot and the subsequent realized return, aggregated over a
//! rolling calendar window, then converts a set of per-factor ICs into
//! normalized portfolio weights.
//!
//! Degradation is deliberately soft: a factor/date with too few matched
//! instruments yields a zero, insignificant IC rather than an error, and
//! a window where every factor is filtered out falls back to equal
//! weights so downstream consumers never receive an empty or zero-sum
//! weight set.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use ronda_traits::{Date, FactorDataProvider, Result, RiskError, Symbol};

use crate::cache::BoundedCache;
use crate::spearman::rank_correlation;

/// Configuration for rolling IC calculation and factor weighting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingIcConfig {
    /// Rolling lookback window in calendar days
    pub window_days: i64,

    /// Forward-return holding period in trading days
    pub holding_period: usize,

    /// Minimum matched instruments for an IC observation to count
    pub min_stocks: usize,

    /// Minimum retained IC observations for a factor to receive weight
    pub min_observations: usize,

    /// Significance threshold: p-values at or above this fail the
    /// quality filter
    pub max_p_value: f64,

    /// Minimum |IC| effect size for the quality filter and weighting
    pub min_ic_threshold: f64,

    /// If true, factors with a negative average IC are excluded from
    /// weighting entirely (only positively-predictive factors rewarded)
    pub use_signed_ic: bool,

    /// Capacity of the per-date snapshot caches
    pub cache_capacity: usize,
}

impl Default for RollingIcConfig {
    fn default() -> Self {
        Self {
            window_days: 60,
            holding_period: 5,
            min_stocks: 10,
            min_observations: 5,
            max_p_value: 0.10,
            min_ic_threshold: 0.01,
            use_signed_ic: false,
            cache_capacity: 256,
        }
    }
}

impl RollingIcConfig {
    /// Validate every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidConfig`] naming the first out-of-range
    /// field.
    pub fn validate(&self) -> Result<()> {
        if self.window_days < 1 {
            return Err(RiskError::InvalidConfig(
                "window_days must be at least 1".to_string(),
            ));
        }
        if self.holding_period < 1 {
            return Err(RiskError::InvalidConfig(
                "holding_period must be at least 1".to_string(),
            ));
        }
        if self.min_stocks < 3 {
            return Err(RiskError::InvalidConfig(
                "min_stocks must be at least 3 for a defined rank correlation".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.max_p_value) {
            return Err(RiskError::InvalidConfig(format!(
                "max_p_value must be in [0.0, 1.0], got {}",
                self.max_p_value
            )));
        }
        if self.min_ic_threshold < 0.0 {
            return Err(RiskError::InvalidConfig(
                "min_ic_threshold must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// A single factor's IC measurement for one calculation date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorIc {
    /// Factor name
    pub factor: String,

    /// Calculation date the scores were taken at
    pub date: Date,

    /// Spearman rank correlation between scores and forward returns
    pub ic: f64,

    /// Two-sided p-value of the correlation
    pub p_value: f64,

    /// Matched instruments with both a score and a forward return
    pub num_stocks: usize,

    /// Whether the p-value clears the significance threshold
    pub is_significant: bool,

    /// Whether significance, sample size, and effect size all pass
    pub passes_quality_filter: bool,
}

impl FactorIc {
    /// The soft-failure value: zero, insignificant IC.
    ///
    /// Returned instead of an error when too few instruments match or the
    /// correlation is numerically undefined.
    fn degenerate(factor: &str, date: Date, num_stocks: usize) -> Self {
        Self {
            factor: factor.to_string(),
            date,
            ic: 0.0,
            p_value: 1.0,
            num_stocks,
            is_significant: false,
            passes_quality_filter: false,
        }
    }
}

/// Rolling IC calculator over an injected data provider.
///
/// Per-date factor-score and forward-return lookups are memoized in
/// bounded caches for the lifetime of the calculator instance. Cache
/// entries never expire by time; call [`clear_cache`](Self::clear_cache)
/// between independent backtests or analyses to avoid stale
/// cross-contamination.
#[derive(Debug)]
pub struct RollingIcCalculator<P> {
    provider: P,
    config: RollingIcConfig,
    score_cache: BoundedCache<(String, Date), HashMap<Symbol, f64>>,
    forward_cache: BoundedCache<Date, HashMap<Symbol, f64>>,
}

impl<P: FactorDataProvider> RollingIcCalculator<P> {
    /// Create a calculator over a data provider.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidConfig`] when the config fails
    /// validation.
    pub fn new(provider: P, config: RollingIcConfig) -> Result<Self> {
        config.validate()?;
        let cache_capacity = config.cache_capacity;
        Ok(Self {
            provider,
            config,
            score_cache: BoundedCache::new(cache_capacity),
            forward_cache: BoundedCache::new(cache_capacity),
        })
    }

    /// The configuration this calculator runs with.
    pub const fn config(&self) -> &RollingIcConfig {
        &self.config
    }

    /// Compute a factor's IC for one calculation date.
    ///
    /// Inner-joins the factor-score snapshot with the forward-return
    /// snapshot on instrument identifier and computes the Spearman rank
    /// correlation. Fails soft (IC 0, p-value 1, insignificant) when
    /// fewer than `min_stocks` instruments match or the correlation is
    /// undefined.
    ///
    /// # Errors
    ///
    /// Only provider failures surface as errors; thin data never does.
    pub fn factor_ic(&mut self, factor: &str, date: Date) -> Result<FactorIc> {
        let scores = self.cached_scores(factor, date)?;
        let forwards = self.cached_forward_returns(date)?;

        // Inner join on symbol
        let matched: Vec<(f64, f64)> = scores
            .iter()
            .filter_map(|(symbol, &score)| forwards.get(symbol).map(|&fwd| (score, fwd)))
            .collect();
        let num_stocks = matched.len();

        if num_stocks < self.config.min_stocks {
            debug!(
                factor,
                %date,
                num_stocks,
                min_stocks = self.config.min_stocks,
                "too few matched instruments for IC"
            );
            return Ok(FactorIc::degenerate(factor, date, num_stocks));
        }

        let (score_vec, fwd_vec): (Vec<f64>, Vec<f64>) = matched.into_iter().unzip();

        let Some(corr) = rank_correlation(&score_vec, &fwd_vec) else {
            debug!(factor, %date, "rank correlation undefined");
            return Ok(FactorIc::degenerate(factor, date, num_stocks));
        };

        let is_significant = corr.p_value < self.config.max_p_value;
        let passes_quality_filter = is_significant
            && num_stocks >= self.config.min_observations
            && corr.ic.abs() >= self.config.min_ic_threshold;

        Ok(FactorIc {
            factor: factor.to_string(),
            date,
            ic: corr.ic,
            p_value: corr.p_value,
            num_stocks,
            is_significant,
            passes_quality_filter,
        })
    }

    /// Compute each factor's IC across a series of calculation dates.
    ///
    /// # Errors
    ///
    /// Propagates provider failures.
    pub fn factor_ic_series(&mut self, factor: &str, dates: &[Date]) -> Result<Vec<FactorIc>> {
        dates.iter().map(|&date| self.factor_ic(factor, date)).collect()
    }

    /// Convert per-factor rolling ICs into normalized portfolio weights.
    ///
    /// Determines the calculation dates available in
    /// `[target_date − window_days, target_date]`, averages each factor's
    /// retained ICs over that window, applies the rejection rules
    /// (observation count, effect size, and optionally sign), and
    /// normalizes the surviving IC magnitudes into weights summing to 1.
    ///
    /// Graceful degradation, not failure: an empty window, or a window
    /// where every factor is rejected, yields equal weights across all
    /// input factors with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidInput`] for an empty factor list, and
    /// propagates provider failures.
    pub fn rolling_weights(
        &mut self,
        factors: &[String],
        target_date: Date,
    ) -> Result<BTreeMap<String, f64>> {
        if factors.is_empty() {
            return Err(RiskError::InvalidInput(
                "rolling weights require at least one factor".to_string(),
            ));
        }

        let window_start = target_date - Duration::days(self.config.window_days);
        let dates = self.provider.score_dates(window_start, target_date)?;

        if dates.is_empty() {
            warn!(
                %target_date,
                window_days = self.config.window_days,
                "no calculation dates in window, falling back to equal weights"
            );
            return Ok(equal_weights(factors));
        }

        let mut masses: BTreeMap<String, f64> = BTreeMap::new();
        for factor in factors {
            let ics: Vec<f64> = self
                .factor_ic_series(factor, &dates)?
                .into_iter()
                .filter(|ic| ic.num_stocks >= self.config.min_stocks)
                .map(|ic| ic.ic)
                .collect();

            let mass = self.weight_mass(factor, &ics);
            masses.insert(factor.clone(), mass);
        }

        let total: f64 = masses.values().sum();
        if total <= 0.0 {
            warn!(
                %target_date,
                factors = factors.len(),
                "every factor filtered out, falling back to equal weights"
            );
            return Ok(equal_weights(factors));
        }

        Ok(masses
            .into_iter()
            .map(|(factor, mass)| (factor, mass / total))
            .collect())
    }

    /// Clear the per-date snapshot caches.
    ///
    /// Must be called between logically independent backtests or
    /// analyses; entries have no time-based invalidation.
    pub fn clear_cache(&mut self) {
        self.score_cache.clear();
        self.forward_cache.clear();
    }

    /// Unnormalized weight mass for one factor's retained IC series.
    ///
    /// Zero means the factor is rejected: too few observations, effect
    /// size below threshold, or (under signed weighting) a negative
    /// average IC.
    fn weight_mass(&self, factor: &str, ics: &[f64]) -> f64 {
        if ics.len() < self.config.min_observations {
            debug!(
                factor,
                observations = ics.len(),
                "factor rejected: too few IC observations"
            );
            return 0.0;
        }

        let avg_ic: f64 = ics.iter().sum::<f64>() / ics.len() as f64;
        if avg_ic.abs() < self.config.min_ic_threshold {
            debug!(factor, avg_ic, "factor rejected: |IC| below threshold");
            return 0.0;
        }

        if self.config.use_signed_ic {
            if avg_ic < 0.0 {
                debug!(factor, avg_ic, "factor rejected: negative IC under signed weighting");
                return 0.0;
            }
            avg_ic
        } else {
            avg_ic.abs()
        }
    }

    fn cached_scores(&mut self, factor: &str, date: Date) -> Result<HashMap<Symbol, f64>> {
        let key = (factor.to_string(), date);
        if let Some(scores) = self.score_cache.get(&key) {
            return Ok(scores.clone());
        }

        let scores = self.provider.factor_scores(factor, date)?;
        self.score_cache.insert(key, scores.clone());
        Ok(scores)
    }

    fn cached_forward_returns(&mut self, date: Date) -> Result<HashMap<Symbol, f64>> {
        if let Some(forwards) = self.forward_cache.get(&date) {
            return Ok(forwards.clone());
        }

        let forwards = self
            .provider
            .forward_returns(date, self.config.holding_period)?;
        self.forward_cache.insert(date, forwards.clone());
        Ok(forwards)
    }
}

/// Equal weights across all input factors.
fn equal_weights(factors: &[String]) -> BTreeMap<String, f64> {
    let share = 1.0 / factors.len() as f64;
    factors.iter().map(|f| (f.clone(), share)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    /// In-memory provider with call counting for cache tests.
    struct MemoryProvider {
        scores: HashMap<(String, Date), HashMap<Symbol, f64>>,
        forwards: HashMap<Date, HashMap<Symbol, f64>>,
        dates: Vec<Date>,
        score_calls: RefCell<usize>,
        forward_calls: RefCell<usize>,
    }

    impl MemoryProvider {
        fn empty() -> Self {
            Self {
                scores: HashMap::new(),
                forwards: HashMap::new(),
                dates: Vec::new(),
                score_calls: RefCell::new(0),
                forward_calls: RefCell::new(0),
            }
        }

        /// Provider where `aligned` factors rank forward returns
        /// perfectly and `inverted` factors rank them perfectly
        /// backwards, over `n_stocks` instruments on every date.
        fn synthetic(dates: Vec<Date>, aligned: &[&str], inverted: &[&str], n_stocks: usize) -> Self {
            let mut provider = Self::empty();

            for &date in &dates {
                let mut forwards = HashMap::new();
                for i in 0..n_stocks {
                    // Forward return increases with instrument index
                    forwards.insert(format!("S{i:03}"), 0.001 * i as f64 - 0.002);
                }
                provider.forwards.insert(date, forwards);

                for &factor in aligned {
                    let scores: HashMap<Symbol, f64> = (0..n_stocks)
                        .map(|i| (format!("S{i:03}"), i as f64))
                        .collect();
                    provider.scores.insert((factor.to_string(), date), scores);
                }
                for &factor in inverted {
                    let scores: HashMap<Symbol, f64> = (0..n_stocks)
                        .map(|i| (format!("S{i:03}"), -(i as f64)))
                        .collect();
                    provider.scores.insert((factor.to_string(), date), scores);
                }
            }

            provider.dates = dates;
            provider
        }
    }

    impl FactorDataProvider for MemoryProvider {
        fn factor_scores(&self, factor: &str, date: Date) -> Result<HashMap<Symbol, f64>> {
            *self.score_calls.borrow_mut() += 1;
            Ok(self
                .scores
                .get(&(factor.to_string(), date))
                .cloned()
                .unwrap_or_default())
        }

        fn forward_returns(
            &self,
            date: Date,
            _holding_period: usize,
        ) -> Result<HashMap<Symbol, f64>> {
            *self.forward_calls.borrow_mut() += 1;
            Ok(self.forwards.get(&date).cloned().unwrap_or_default())
        }

        fn score_dates(&self, start: Date, end: Date) -> Result<Vec<Date>> {
            Ok(self
                .dates
                .iter()
                .copied()
                .filter(|d| *d >= start && *d <= end)
                .collect())
        }
    }

    fn weekdays(n: usize) -> Vec<Date> {
        let start = Date::from_ymd_opt(2024, 3, 4).unwrap();
        (0..n as i64).map(|i| start + Duration::days(i)).collect()
    }

    fn target_date() -> Date {
        Date::from_ymd_opt(2024, 4, 1).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(RollingIcConfig::default().validate().is_ok());

        let config = RollingIcConfig {
            min_stocks: 2,
            ..RollingIcConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RollingIcConfig {
            max_p_value: 1.5,
            ..RollingIcConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_factor_ic_perfect_alignment() {
        let provider = MemoryProvider::synthetic(weekdays(1), &["momentum"], &[], 12);
        let date = provider.dates[0];
        let mut calculator =
            RollingIcCalculator::new(provider, RollingIcConfig::default()).unwrap();

        let ic = calculator.factor_ic("momentum", date).unwrap();
        assert_relative_eq!(ic.ic, 1.0, epsilon = 1e-10);
        assert_eq!(ic.num_stocks, 12);
        assert!(ic.is_significant);
        assert!(ic.passes_quality_filter);
    }

    #[test]
    fn test_factor_ic_soft_fails_below_min_stocks() {
        // Only 4 instruments; min_stocks default is 10
        let provider = MemoryProvider::synthetic(weekdays(1), &["thin"], &[], 4);
        let date = provider.dates[0];
        let mut calculator =
            RollingIcCalculator::new(provider, RollingIcConfig::default()).unwrap();

        let ic = calculator.factor_ic("thin", date).unwrap();
        assert_eq!(ic.ic, 0.0);
        assert_eq!(ic.p_value, 1.0);
        assert_eq!(ic.num_stocks, 4);
        assert!(!ic.is_significant);
        assert!(!ic.passes_quality_filter);
    }

    #[test]
    fn test_factor_ic_unknown_factor_soft_fails() {
        let provider = MemoryProvider::synthetic(weekdays(1), &["momentum"], &[], 12);
        let date = provider.dates[0];
        let mut calculator =
            RollingIcCalculator::new(provider, RollingIcConfig::default()).unwrap();

        let ic = calculator.factor_ic("no_such_factor", date).unwrap();
        assert_eq!(ic.ic, 0.0);
        assert_eq!(ic.num_stocks, 0);
    }

    #[test]
    fn test_rolling_weights_sum_to_one() {
        let provider =
            MemoryProvider::synthetic(weekdays(10), &["momentum", "value"], &["noise"], 12);
        let mut calculator =
            RollingIcCalculator::new(provider, RollingIcConfig::default()).unwrap();

        let factors = vec![
            "momentum".to_string(),
            "value".to_string(),
            "noise".to_string(),
        ];
        let weights = calculator.rolling_weights(&factors, target_date()).unwrap();

        let total: f64 = weights.values().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
        assert_eq!(weights.len(), 3);
    }

    #[test]
    fn test_empty_window_equal_weights() {
        let mut calculator =
            RollingIcCalculator::new(MemoryProvider::empty(), RollingIcConfig::default()).unwrap();

        let factors = vec!["F1".to_string(), "F2".to_string()];
        let weights = calculator.rolling_weights(&factors, target_date()).unwrap();

        assert_eq!(weights["F1"], 0.5);
        assert_eq!(weights["F2"], 0.5);
    }

    #[test]
    fn test_signed_ic_zeroes_negative_factor() {
        let provider = MemoryProvider::synthetic(weekdays(8), &["good"], &["bad"], 12);
        let config = RollingIcConfig {
            use_signed_ic: true,
            ..RollingIcConfig::default()
        };
        let mut calculator = RollingIcCalculator::new(provider, config).unwrap();

        let factors = vec!["good".to_string(), "bad".to_string()];
        let weights = calculator.rolling_weights(&factors, target_date()).unwrap();

        // Equal magnitude, opposite sign: only the positive factor survives
        assert_relative_eq!(weights["good"], 1.0, epsilon = 1e-12);
        assert_relative_eq!(weights["bad"], 0.0);
    }

    #[test]
    fn test_unsigned_ic_rewards_magnitude() {
        let provider = MemoryProvider::synthetic(weekdays(8), &["good"], &["bad"], 12);
        let mut calculator =
            RollingIcCalculator::new(provider, RollingIcConfig::default()).unwrap();

        let factors = vec!["good".to_string(), "bad".to_string()];
        let weights = calculator.rolling_weights(&factors, target_date()).unwrap();

        // |IC| is identical, so weights split evenly
        assert_relative_eq!(weights["good"], 0.5, epsilon = 1e-12);
        assert_relative_eq!(weights["bad"], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_all_factors_filtered_falls_back_to_equal() {
        // Too few instruments on every date, so every IC is rejected
        let provider = MemoryProvider::synthetic(weekdays(8), &["F1", "F2", "F3"], &[], 4);
        let mut calculator =
            RollingIcCalculator::new(provider, RollingIcConfig::default()).unwrap();

        let factors = vec!["F1".to_string(), "F2".to_string(), "F3".to_string()];
        let weights = calculator.rolling_weights(&factors, target_date()).unwrap();

        for factor in &factors {
            assert_relative_eq!(weights[factor], 1.0 / 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_min_observations_rejects_sparse_factor() {
        // Only 3 dates in the window; min_observations default is 5
        let provider = MemoryProvider::synthetic(weekdays(3), &["sparse"], &[], 12);
        let mut calculator =
            RollingIcCalculator::new(provider, RollingIcConfig::default()).unwrap();

        let factors = vec!["sparse".to_string()];
        let weights = calculator.rolling_weights(&factors, target_date()).unwrap();

        // Rejected for sparsity, then rescued by the equal-weight fallback
        assert_relative_eq!(weights["sparse"], 1.0);
    }

    #[test]
    fn test_empty_factor_list_is_an_error() {
        let mut calculator =
            RollingIcCalculator::new(MemoryProvider::empty(), RollingIcConfig::default()).unwrap();

        assert!(matches!(
            calculator.rolling_weights(&[], target_date()),
            Err(RiskError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_snapshot_lookups_are_memoized() {
        let provider = MemoryProvider::synthetic(weekdays(1), &["momentum"], &[], 12);
        let date = provider.dates[0];
        let mut calculator =
            RollingIcCalculator::new(provider, RollingIcConfig::default()).unwrap();

        calculator.factor_ic("momentum", date).unwrap();
        calculator.factor_ic("momentum", date).unwrap();
        calculator.factor_ic("momentum", date).unwrap();

        assert_eq!(*calculator.provider.score_calls.borrow(), 1);
        assert_eq!(*calculator.provider.forward_calls.borrow(), 1);
    }

    #[test]
    fn test_clear_cache_forces_refetch() {
        let provider = MemoryProvider::synthetic(weekdays(1), &["momentum"], &[], 12);
        let date = provider.dates[0];
        let mut calculator =
            RollingIcCalculator::new(provider, RollingIcConfig::default()).unwrap();

        calculator.factor_ic("momentum", date).unwrap();
        calculator.clear_cache();
        calculator.factor_ic("momentum", date).unwrap();

        assert_eq!(*calculator.provider.score_calls.borrow(), 2);
        assert_eq!(*calculator.provider.forward_calls.borrow(), 2);
    }
}
