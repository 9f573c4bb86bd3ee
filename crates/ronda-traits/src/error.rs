//! Error types for the ronda risk engine.
//!
//! This module defines the error taxonomy used throughout the ronda
//! workspace. Validation failures are never silently caught inside the
//! risk core; they propagate to the caller through these types.

use thiserror::Error;

/// The main error type for ronda operations.
///
/// This enum encompasses all error cases that can occur when configuring
/// calculators, validating inputs, and computing risk metrics.
#[derive(Debug, Error)]
pub enum RiskError {
    /// A [`RiskConfig`](crate::config::RiskConfig) failed its own validation.
    ///
    /// Surfaced at calculator construction; never recovered.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A return series, weight vector, or covariance matrix failed an
    /// input check. The caller must not retry with the same data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An unrecognized calculation method was requested at call time.
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    /// A backtest or rolling calculation was requested with fewer
    /// observations than its window requires.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A data provider failed to supply factor scores or forward returns.
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for RiskError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for RiskError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for ronda operations.
///
/// This is a convenience type that uses [`RiskError`] as the error type.
pub type Result<T> = std::result::Result<T, RiskError>;
