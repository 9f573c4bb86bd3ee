#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # ronda
//!
//! Portfolio risk-metrics engine.
//!
//! ronda is an umbrella crate that re-exports all ronda sub-crates for
//! convenience. It provides a unified API for Value-at-Risk, Expected
//! Shortfall, and rolling-IC factor weighting.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ronda::prelude::*;
//!
//! # fn main() -> ronda::Result<()> {
//! let config = RiskConfig {
//!     confidence_level: 0.99,
//!     time_horizon_days: 10,
//!     ..RiskConfig::default()
//! };
//!
//! // Daily fractional returns supplied by the caller
//! let returns: Vec<f64> = load_portfolio_returns();
//!
//! let var = VarCalculator::new(config.clone())?.calculate(&returns, 1_000_000.0, None)?;
//! let cvar = CvarCalculator::new(config)?.calculate(&returns, 1_000_000.0, None)?;
//!
//! println!("10-day 99% VaR:  {:.0}", var.value);
//! println!("10-day 99% CVaR: {:.0}", cvar.value);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Core types ([`RiskConfig`], [`VarMethod`], errors,
//!   validation, numeric primitives, the data-provider boundary)
//! - [`var`] - VaR and CVaR calculators with decomposition, sweeps, and
//!   backtesting
//! - [`ic`] - Rolling Information-Coefficient factor weighting
//!
//! ## Architecture
//!
//! 1. Callers supply a validated return series (and, for IC, factor and
//!    forward-return snapshots through [`FactorDataProvider`])
//! 2. [`VarCalculator`] produces a loss threshold at a confidence level
//! 3. [`CvarCalculator`] reuses that threshold to measure tail severity
//! 4. [`RollingIcCalculator`] independently produces factor weights for
//!    an external portfolio-construction step

/// Version information for the ronda crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core type definitions for ronda.
///
/// Re-exports [`ronda_traits`]: configuration, errors, validation,
/// numeric primitives, and the data-provider boundary.
pub mod traits {
    pub use ronda_traits::*;
}

/// VaR and CVaR calculators.
///
/// Re-exports [`ronda_var`]: the two loss-quantile calculators plus
/// component decomposition, confidence/horizon sweeps, and rolling-window
/// backtesting.
pub mod var {
    pub use ronda_var::*;
}

/// Rolling Information-Coefficient factor weighting.
///
/// Re-exports [`ronda_ic`]: Spearman rank IC with significance testing,
/// the rolling weighting calculator, and the bounded snapshot cache.
pub mod ic {
    pub use ronda_ic::*;
}

// Re-export core types at top level for convenience
pub use ronda_ic::{FactorIc, RollingIcCalculator, RollingIcConfig};
pub use ronda_traits::{
    AssetReturns, Date, FactorDataProvider, Result, RiskConfig, RiskError, Symbol, VarMethod,
};
pub use ronda_var::{
    CvarCalculator, CvarResult, VarBacktestResult, VarCalculator, VarCvarComparison, VarResult,
};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use ronda::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AssetReturns, CvarCalculator, CvarResult, Date, FactorDataProvider, FactorIc, Result,
        RiskConfig, RiskError, RollingIcCalculator, RollingIcConfig, Symbol, VarCalculator,
        VarMethod, VarResult,
    };
}
