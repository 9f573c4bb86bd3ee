#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core type definitions for the ronda risk engine.
//!
//! This crate provides the foundational pieces every ronda calculator is
//! built from: validated configuration, the error taxonomy, input
//! validation, shared numeric primitives, and the data-provider boundary.

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod config;
pub mod error;
pub mod provider;
pub mod stats;
pub mod types;
pub mod validate;

// Re-exports
pub use config::{RiskConfig, VarMethod};
pub use error::{Result, RiskError};
pub use provider::FactorDataProvider;
pub use types::{AssetReturns, Date, Symbol};
pub use validate::validate_inputs;
