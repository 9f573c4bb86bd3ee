//! Common types used throughout the ronda risk engine.

use ndarray::Array1;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// An instrument identifier.
///
/// Symbols identify securities across the ronda workspace. Typically
/// these are ticker symbols like "AAPL" or "MSFT".
pub type Symbol = String;

/// A single asset's daily return series, used by component-VaR
/// decomposition.
///
/// All series passed to one calculation must be aligned on the same
/// dates and have the same length.
#[derive(Debug, Clone)]
pub struct AssetReturns {
    /// Instrument identifier (for labelling decomposition output)
    pub symbol: Symbol,

    /// Daily fractional returns, oldest first
    pub returns: Array1<f64>,
}

impl AssetReturns {
    /// Create a new asset return series.
    pub fn new(symbol: impl Into<Symbol>, returns: Array1<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            returns,
        }
    }

    /// Number of observations in the series.
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Returns whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}
