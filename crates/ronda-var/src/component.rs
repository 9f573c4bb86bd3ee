//! Component-VaR decomposition via finite differences.
//!
//! Perturbs each asset's weight by a small epsilon, renormalizes the rest,
//! and measures the change in portfolio VaR. The resulting component VaRs
//! are signed: negative means the asset adds risk, positive means it
//! diversifies. The sum of components only *approximates* total portfolio
//! VaR (finite-difference method, not an exact Euler decomposition); the
//! table exposes the approximation error instead of reconciling it away.

use serde::{Deserialize, Serialize};

use ronda_traits::validate::validate_weights;
use ronda_traits::{AssetReturns, Result, RiskError, Symbol, VarMethod};

use crate::result::VarResult;
use crate::var::{VarCalculator, calculate_with_config};

/// Weight bump used for the finite-difference marginal.
const WEIGHT_EPSILON: f64 = 0.001;

/// One asset's contribution to portfolio VaR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentVar {
    /// Instrument identifier
    pub symbol: Symbol,

    /// Portfolio weight of the asset
    pub weight: f64,

    /// Marginal VaR: change in portfolio VaR per unit of weight
    pub marginal_var: f64,

    /// Component VaR: weight × marginal VaR, in currency units
    pub component_var: f64,
}

/// Component-VaR decomposition of a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentVarTable {
    /// Total portfolio VaR the decomposition was measured against
    pub portfolio_var: VarResult,

    /// Per-asset contributions, sorted by |component VaR| descending
    pub components: Vec<ComponentVar>,

    /// Sum of component VaRs
    pub component_sum: f64,

    /// `component_sum − portfolio VaR`: the finite-difference
    /// approximation error
    pub approximation_error: f64,
}

impl VarCalculator {
    /// Decompose portfolio VaR into per-asset components.
    ///
    /// # Arguments
    ///
    /// * `assets` - Aligned daily return series, one per asset
    /// * `weights` - Long-only portfolio weights matching `assets` by index
    /// * `portfolio_value` - Current portfolio value in currency units
    /// * `method` - Overrides the config's method for this call only
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidInput`] when no assets are supplied,
    /// series lengths or the weight vector disagree, or the blended
    /// portfolio series fails validation.
    pub fn calculate_component_var(
        &self,
        assets: &[AssetReturns],
        weights: &[f64],
        portfolio_value: f64,
        method: Option<VarMethod>,
    ) -> Result<ComponentVarTable> {
        if assets.is_empty() {
            return Err(RiskError::InvalidInput(
                "component VaR requires at least one asset".to_string(),
            ));
        }
        if assets.len() != weights.len() {
            return Err(RiskError::InvalidInput(format!(
                "got {} assets but {} weights",
                assets.len(),
                weights.len()
            )));
        }
        let n_obs = assets[0].len();
        if assets.iter().any(|a| a.len() != n_obs) {
            return Err(RiskError::InvalidInput(
                "asset return series have mismatched lengths".to_string(),
            ));
        }
        validate_weights(weights)?;

        let portfolio_returns = blend_returns(assets, weights, n_obs);
        let portfolio_var = self.calculate(&portfolio_returns, portfolio_value, method)?;

        let mut components = Vec::with_capacity(assets.len());
        for (i, asset) in assets.iter().enumerate() {
            let bumped = bump_weights(weights, i, WEIGHT_EPSILON);
            let bumped_returns = blend_returns(assets, &bumped, n_obs);
            let bumped_var =
                calculate_with_config(self.config(), &bumped_returns, portfolio_value, method)?;

            let marginal_var = (bumped_var.value - portfolio_var.value) / WEIGHT_EPSILON;
            components.push(ComponentVar {
                symbol: asset.symbol.clone(),
                weight: weights[i],
                marginal_var,
                component_var: weights[i] * marginal_var,
            });
        }

        components.sort_by(|a, b| {
            b.component_var
                .abs()
                .partial_cmp(&a.component_var.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let component_sum: f64 = components.iter().map(|c| c.component_var).sum();
        let approximation_error = component_sum - portfolio_var.value;

        Ok(ComponentVarTable {
            portfolio_var,
            components,
            component_sum,
            approximation_error,
        })
    }
}

/// Weighted sum of asset returns per date.
fn blend_returns(assets: &[AssetReturns], weights: &[f64], n_obs: usize) -> Vec<f64> {
    (0..n_obs)
        .map(|t| {
            assets
                .iter()
                .zip(weights.iter())
                .map(|(asset, &w)| w * asset.returns[t])
                .sum()
        })
        .collect()
}

/// Bump weight `index` by `epsilon` and proportionally reduce the others
/// so the total stays 1.0.
fn bump_weights(weights: &[f64], index: usize, epsilon: f64) -> Vec<f64> {
    let bumped_target = weights[index] + epsilon;
    let others_sum: f64 = 1.0 - weights[index];

    weights
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            if i == index {
                bumped_target
            } else if others_sum > f64::EPSILON {
                w * (1.0 - bumped_target) / others_sum
            } else {
                // Single-asset portfolio: nothing to absorb the bump
                w
            }
        })
        .collect()
}
