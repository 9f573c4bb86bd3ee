//! Data-access boundary for the rolling IC calculator.
//!
//! The risk core performs no I/O of its own. Factor scores and realized
//! forward returns are supplied through the [`FactorDataProvider`] trait,
//! queried per calculation date. There is no implied transactional
//! consistency between the two lookups; staleness is the caller's
//! responsibility.

use std::collections::HashMap;

use crate::error::Result;
use crate::types::{Date, Symbol};

/// Supplies cross-sectional factor scores and realized forward returns.
///
/// Implementors typically wrap a database or an in-memory snapshot store.
/// Latency and retry semantics live behind this boundary and are out of
/// scope for the risk core.
///
/// # Example
///
/// ```rust,ignore
/// use ronda_traits::{FactorDataProvider, Date, Result, Symbol};
/// use std::collections::HashMap;
///
/// struct SnapshotStore { /* ... */ }
///
/// impl FactorDataProvider for SnapshotStore {
///     fn factor_scores(&self, factor: &str, date: Date) -> Result<HashMap<Symbol, f64>> {
///         // look up scores as of `date`
///         # unimplemented!()
///     }
///
///     fn forward_returns(&self, date: Date, holding_period: usize) -> Result<HashMap<Symbol, f64>> {
///         // price `holding_period` trading days later / price at `date` - 1
///         # unimplemented!()
///     }
///
///     fn score_dates(&self, start: Date, end: Date) -> Result<Vec<Date>> {
///         # unimplemented!()
///     }
/// }
/// ```
pub trait FactorDataProvider {
    /// Cross-sectional factor scores as of `date`.
    ///
    /// Returns a mapping from instrument identifier to a continuous
    /// factor score. An empty map is a valid answer (no coverage on that
    /// date), not an error.
    fn factor_scores(&self, factor: &str, date: Date) -> Result<HashMap<Symbol, f64>>;

    /// Realized forward returns from `date` over `holding_period` trading
    /// days.
    ///
    /// The forward return for an instrument is its price `holding_period`
    /// trading days after `date`, divided by its price at `date`, minus 1.
    /// Instruments without a price on either end are omitted from the map.
    fn forward_returns(&self, date: Date, holding_period: usize) -> Result<HashMap<Symbol, f64>>;

    /// Calculation dates with factor-score coverage in `[start, end]`,
    /// ascending.
    fn score_dates(&self, start: Date, end: Date) -> Result<Vec<Date>>;
}
