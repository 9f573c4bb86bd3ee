//! Value-at-Risk and Expected-Shortfall calculators for ronda.
//!
//! This crate provides the loss-quantile side of the risk engine:
//! - [`VarCalculator`] with three interchangeable estimation methods
//!   (historical simulation, parametric/Gaussian, Monte Carlo)
//! - [`CvarCalculator`] for Conditional VaR / Expected Shortfall,
//!   composed on top of the VaR calculator
//! - Component-VaR decomposition, multi-confidence and multi-horizon
//!   sweeps, and rolling-window backtesting
//!
//! # Example
//!
//! ```rust,ignore
//! use ronda_var::{VarCalculator, CvarCalculator};
//! use ronda_traits::{RiskConfig, VarMethod};
//!
//! let config = RiskConfig {
//!     confidence_level: 0.99,
//!     time_horizon_days: 10,
//!     ..RiskConfig::default()
//! };
//!
//! let var = VarCalculator::new(config.clone())?.calculate(&returns, 1_000_000.0, None)?;
//! let cvar = CvarCalculator::new(config)?.calculate(&returns, 1_000_000.0, None)?;
//! assert!(cvar.pct <= var.pct);
//! ```

pub mod backtest;
pub mod component;
pub mod cvar;
pub mod result;
pub mod sweep;
pub mod var;

// Re-export main types
pub use backtest::{DEFAULT_WINDOW_SIZE, VarBacktestRecord, VarBacktestResult};
pub use component::{ComponentVar, ComponentVarTable};
pub use cvar::{CvarCalculator, VarCvarComparison};
pub use result::{CvarResult, VarResult};
pub use var::VarCalculator;
