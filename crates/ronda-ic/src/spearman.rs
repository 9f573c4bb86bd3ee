//! Spearman rank correlation with significance testing.
//!
//! The Information Coefficient is the Spearman rank correlation between a
//! factor's cross-sectional scores and the subsequent realized returns.
//! Values range from -1 to 1; values near zero indicate no predictive
//! power. Significance comes from the t-statistic of the correlation
//! against a Student-t distribution with n − 2 degrees of freedom.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Rank correlation between two aligned samples.
#[derive(Debug, Clone, Copy)]
pub struct RankCorrelation {
    /// Spearman rank correlation coefficient
    pub ic: f64,
    /// Two-sided p-value of the correlation
    pub p_value: f64,
    /// Number of paired observations
    pub n_obs: usize,
}

/// Compute the Spearman rank correlation between scores and returns.
///
/// Both slices must be aligned by instrument; non-finite pairs are
/// excluded before ranking. Ties receive their average rank.
///
/// Returns `None` when fewer than 3 finite pairs remain, when either
/// sample is constant (the correlation is undefined), or when the result
/// is not finite.
///
/// # Example
///
/// ```
/// use ronda_ic::spearman::rank_correlation;
///
/// let scores = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let returns = [0.01, 0.02, 0.03, 0.04, 0.05];
/// let corr = rank_correlation(&scores, &returns).unwrap();
/// assert!((corr.ic - 1.0).abs() < 1e-10);
/// ```
pub fn rank_correlation(scores: &[f64], returns: &[f64]) -> Option<RankCorrelation> {
    let pairs: Vec<(f64, f64)> = scores
        .iter()
        .zip(returns.iter())
        .filter(|(s, r)| s.is_finite() && r.is_finite())
        .map(|(&s, &r)| (s, r))
        .collect();

    let n = pairs.len();
    if n < 3 {
        return None;
    }

    let score_ranks = average_ranks(&pairs.iter().map(|(s, _)| *s).collect::<Vec<_>>());
    let return_ranks = average_ranks(&pairs.iter().map(|(_, r)| *r).collect::<Vec<_>>());

    let ic = pearson(&score_ranks, &return_ranks)?;
    if !ic.is_finite() {
        return None;
    }

    Some(RankCorrelation {
        ic,
        p_value: two_sided_p_value(ic, n),
        n_obs: n,
    })
}

/// Ranks of values, 1-based, with ties receiving their average rank.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && (indexed[j].1 - indexed[i].1).abs() < f64::EPSILON {
            j += 1;
        }

        // Tied values share the average of the ranks they span
        let avg_rank = (i + j + 1) as f64 / 2.0;
        for entry in &indexed[i..j] {
            ranks[entry.0] = avg_rank;
        }

        i = j;
    }

    ranks
}

/// Pearson correlation of two equal-length samples.
///
/// Returns `None` when either sample has zero variance.
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x: f64 = xs.iter().sum::<f64>() / n;
    let mean_y: f64 = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Two-sided p-value of a correlation coefficient over `n` observations.
///
/// Uses the t-statistic `ic·√((n−2)/(1−ic²))` against Student-t(n−2).
/// A perfect correlation (|ic| = 1) gets p = 0.
fn two_sided_p_value(ic: f64, n: usize) -> f64 {
    let df = (n - 2) as f64;
    // Rank arithmetic leaves |ic| a few ulps shy of 1 for perfect
    // correlations; treat anything this close as exact
    let denominator = 1.0 - ic * ic;
    if denominator < 1e-12 {
        return 0.0;
    }

    let t_stat = ic * (df / denominator).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t_stat.abs())),
        Err(_) => 1.0,
    }
}
