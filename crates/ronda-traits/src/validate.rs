//! Input validation shared by all risk calculators.
//!
//! Every `calculate()` entry point runs these checks before touching the
//! numbers. Failures surface as [`RiskError::InvalidInput`] and are never
//! silently caught inside the core; the caller must not retry with the
//! same data.

use nalgebra::DMatrix;
use ndarray::Array2;

use crate::error::{Result, RiskError};

/// Minimum number of observations required for any risk calculation.
pub const MIN_OBSERVATIONS: usize = 30;

/// Tolerance for the portfolio weight sum around 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Symmetry tolerance for covariance matrices.
pub const SYMMETRY_TOLERANCE: f64 = 1e-8;

/// Smallest admissible eigenvalue for a covariance matrix. Values below
/// this are treated as genuine negative curvature rather than rounding.
pub const PSD_TOLERANCE: f64 = -1e-8;

/// Validate a return series.
///
/// # Errors
///
/// Returns [`RiskError::InvalidInput`] when the series contains NaN or
/// infinite values, or holds fewer than [`MIN_OBSERVATIONS`] observations.
pub fn validate_returns(returns: &[f64]) -> Result<()> {
    if returns.iter().any(|r| r.is_nan()) {
        return Err(RiskError::InvalidInput(
            "returns contain NaN values".to_string(),
        ));
    }
    if returns.len() < MIN_OBSERVATIONS {
        return Err(RiskError::InvalidInput(format!(
            "need at least {} return observations, got {}",
            MIN_OBSERVATIONS,
            returns.len()
        )));
    }
    if returns.iter().any(|r| r.is_infinite()) {
        return Err(RiskError::InvalidInput(
            "returns contain infinite values".to_string(),
        ));
    }
    Ok(())
}

/// Validate a long-only portfolio weight vector.
///
/// # Errors
///
/// Returns [`RiskError::InvalidInput`] when weights contain NaN or
/// infinite values, sum away from 1.0 beyond [`WEIGHT_SUM_TOLERANCE`], or
/// contain a negative entry.
pub fn validate_weights(weights: &[f64]) -> Result<()> {
    if weights.iter().any(|w| w.is_nan()) {
        return Err(RiskError::InvalidInput(
            "weights contain NaN values".to_string(),
        ));
    }

    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(RiskError::InvalidInput(format!(
            "weights must sum to 1.0 (±{WEIGHT_SUM_TOLERANCE}), got {total}"
        )));
    }

    if weights.iter().any(|&w| w < 0.0) {
        return Err(RiskError::InvalidInput(
            "weights contain negative values (long-only portfolios assumed)".to_string(),
        ));
    }
    if weights.iter().any(|w| w.is_infinite()) {
        return Err(RiskError::InvalidInput(
            "weights contain infinite values".to_string(),
        ));
    }
    Ok(())
}

/// Validate a covariance matrix.
///
/// Checks for NaN/infinite entries, symmetry within
/// [`SYMMETRY_TOLERANCE`], and positive semi-definiteness: the smallest
/// eigenvalue must not fall below [`PSD_TOLERANCE`].
///
/// # Errors
///
/// Returns [`RiskError::InvalidInput`] describing the first failed check.
pub fn validate_covariance(covariance: &Array2<f64>) -> Result<()> {
    let (rows, cols) = covariance.dim();
    if rows != cols {
        return Err(RiskError::InvalidInput(format!(
            "covariance matrix must be square, got {rows}x{cols}"
        )));
    }

    if covariance.iter().any(|v| v.is_nan()) {
        return Err(RiskError::InvalidInput(
            "covariance matrix contains NaN values".to_string(),
        ));
    }

    for i in 0..rows {
        for j in (i + 1)..cols {
            if (covariance[[i, j]] - covariance[[j, i]]).abs() > SYMMETRY_TOLERANCE {
                return Err(RiskError::InvalidInput(format!(
                    "covariance matrix is not symmetric at ({i}, {j})"
                )));
            }
        }
    }

    let symmetric = DMatrix::from_fn(rows, cols, |i, j| covariance[[i, j]]);
    let eigenvalues = symmetric.symmetric_eigen().eigenvalues;
    if let Some(min_eigen) = eigenvalues.iter().copied().reduce(f64::min) {
        if min_eigen < PSD_TOLERANCE {
            return Err(RiskError::InvalidInput(format!(
                "covariance matrix is not positive semi-definite (min eigenvalue {min_eigen:e})"
            )));
        }
    }

    if covariance.iter().any(|v| v.is_infinite()) {
        return Err(RiskError::InvalidInput(
            "covariance matrix contains infinite values".to_string(),
        ));
    }
    Ok(())
}

/// Validate whichever inputs are supplied for a risk calculation.
///
/// All checks run unconditionally on the supplied arguments; omitted
/// arguments are skipped, not defaulted. When both weights and a
/// covariance matrix are present their dimensions must agree.
///
/// # Errors
///
/// Returns [`RiskError::InvalidInput`] describing the first failed check.
pub fn validate_inputs(
    returns: Option<&[f64]>,
    weights: Option<&[f64]>,
    covariance: Option<&Array2<f64>>,
) -> Result<()> {
    if let Some(returns) = returns {
        validate_returns(returns)?;
    }
    if let Some(weights) = weights {
        validate_weights(weights)?;
    }
    if let Some(covariance) = covariance {
        validate_covariance(covariance)?;
    }
    if let (Some(weights), Some(covariance)) = (weights, covariance) {
        if weights.len() != covariance.nrows() {
            return Err(RiskError::InvalidInput(format!(
                "weights ({}) and covariance matrix ({}) cover different asset sets",
                weights.len(),
                covariance.nrows()
            )));
        }
    }
    Ok(())
}
