//! # Portfolio
//!
//! $$
//! \sigma_p=\sqrt{\textstyle\sum_i \bar w_i^2\sigma_i^2},\qquad
//! \bar w_i = w_i/\textstyle\sum_j w_j
//! $$
//!
//! Asset records and weight-normalized portfolio aggregation. The default
//! volatility model assumes independent assets (no covariance terms), which
//! understates risk for positively correlated holdings; a full covariance
//! matrix can be plugged in via [`CovarianceModel::Full`] without changing
//! the contract.

use anyhow::bail;
use anyhow::Result;
use impl_new_derive::ImplNew;

/// Single portfolio position supplied by the caller.
///
/// Weights are percentage points and are not required to sum to 100; every
/// engine normalizes by the total weight internally. Assets are borrowed by
/// each engine call and never mutated.
#[derive(ImplNew, Clone, Debug)]
pub struct Asset {
  /// Unique, non-empty ticker symbol.
  pub symbol: String,
  /// Portfolio weight in percentage points.
  pub weight: f64,
  /// Annualized expected return as a decimal (0.12 = 12%).
  pub expected_return: f64,
  /// Annualized return standard deviation as a decimal.
  pub volatility: f64,
  /// Current price per unit.
  pub price: f64,
}

/// Weight-normalized portfolio summary, recomputed on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct PortfolioSummary {
  /// Weighted average of per-asset expected returns.
  pub expected_return: f64,
  /// Portfolio volatility under the chosen covariance model.
  pub volatility: f64,
}

/// Cross-asset covariance structure used by [`aggregate_with_covariance`].
#[derive(Clone, Debug, Default)]
pub enum CovarianceModel {
  /// Independent assets: diagonal covariance, no cross terms.
  #[default]
  Diagonal,
  /// Full annualized covariance matrix, row/col order matching the assets.
  Full(Vec<Vec<f64>>),
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn mat_vec_mul(mat: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
  mat
    .iter()
    .map(|row| row.iter().zip(v.iter()).map(|(a, b)| a * b).sum())
    .collect()
}

/// Reduce an asset list to its expected-return/volatility pair under the
/// independence assumption.
pub fn aggregate(assets: &[Asset]) -> Result<PortfolioSummary> {
  aggregate_with_covariance(assets, &CovarianceModel::Diagonal)
}

/// [`aggregate`] with a pluggable covariance model.
///
/// A zero total weight is the invalid-portfolio signal: both fields collapse
/// to zero instead of dividing 0/0, and callers must not proceed with the
/// result.
pub fn aggregate_with_covariance(
  assets: &[Asset],
  model: &CovarianceModel,
) -> Result<PortfolioSummary> {
  if assets.is_empty() {
    bail!("asset list must not be empty");
  }

  let total_weight: f64 = assets.iter().map(|a| a.weight).sum();
  if total_weight == 0.0 {
    return Ok(PortfolioSummary::default());
  }

  let w: Vec<f64> = assets.iter().map(|a| a.weight / total_weight).collect();
  let expected_return: f64 = assets
    .iter()
    .zip(&w)
    .map(|(a, wi)| wi * a.expected_return)
    .sum();

  let variance = match model {
    CovarianceModel::Diagonal => assets
      .iter()
      .zip(&w)
      .map(|(a, wi)| wi * wi * a.volatility * a.volatility)
      .sum(),
    CovarianceModel::Full(cov) => {
      let sigma_w = mat_vec_mul(cov, &w);
      dot(&w, &sigma_w)
    }
  };

  Ok(PortfolioSummary {
    expected_return,
    volatility: f64::max(variance, 0.0).sqrt(),
  })
}

/// Heuristic re-weighting suggestion: weights proportional to inverse
/// volatility, rescaled to percentage points summing to 100.
///
/// Zero-volatility assets are excluded from the inverse sum; if every asset
/// has zero volatility the suggestion falls back to equal weights.
pub fn suggest_inverse_vol_weights(assets: &[Asset]) -> Result<Vec<(String, f64)>> {
  if assets.is_empty() {
    bail!("asset list must not be empty");
  }

  let inv_vols: Vec<f64> = assets
    .iter()
    .map(|a| {
      if a.volatility > 1e-15 {
        1.0 / a.volatility
      } else {
        0.0
      }
    })
    .collect();

  let total: f64 = inv_vols.iter().sum();
  let weights: Vec<f64> = if total > 1e-15 {
    inv_vols.iter().map(|&iv| 100.0 * iv / total).collect()
  } else {
    vec![100.0 / assets.len() as f64; assets.len()]
  };

  Ok(
    assets
      .iter()
      .zip(weights)
      .map(|(a, w)| (a.symbol.clone(), w))
      .collect(),
  )
}
