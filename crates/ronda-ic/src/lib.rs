//! Rolling Information-Coefficient factor weighting for ronda.
//!
//! This crate measures factor predictive power and turns it into
//! portfolio weights:
//! - [`spearman`] - rank correlation with significance testing
//! - [`rolling`] - per-date factor ICs aggregated over a rolling window,
//!   with quality filters and normalized weight output
//! - [`cache`] - bounded memoization for per-date snapshot lookups
//!
//! # Example
//!
//! ```rust,ignore
//! use ronda_ic::{RollingIcCalculator, RollingIcConfig};
//!
//! let mut calculator = RollingIcCalculator::new(provider, RollingIcConfig::default())?;
//! let weights = calculator.rolling_weights(&factors, target_date)?;
//! assert!((weights.values().sum::<f64>() - 1.0).abs() < 1e-9);
//! ```

pub mod cache;
pub mod rolling;
pub mod spearman;

// Re-export main types
pub use cache::BoundedCache;
pub use rolling::{FactorIc, RollingIcCalculator, RollingIcConfig};
pub use spearman::{RankCorrelation, rank_correlation};
