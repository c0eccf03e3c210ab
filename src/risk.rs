//! # Risk
//!
//! $$
//! \mathrm{CVaR}_{95}=\Bigl|\tfrac{1}{k}\textstyle\sum_{i<k} r_{(i)}\Bigr|,
//! \qquad k=\lfloor 0.05\,n\rfloor
//! $$
//!
//! Risk metrics over a realized (or simulated) daily return series: tail
//! losses, drawdown, beta against a market series and distribution moments.

use anyhow::bail;
use anyhow::Result;
use ordered_float::OrderedFloat;
use statrs::statistics::Statistics;

use crate::config::AnalyticsConfig;
use crate::portfolio::aggregate;
use crate::portfolio::Asset;

/// Risk profile of a portfolio against a caller-supplied return series.
#[derive(Clone, Copy, Debug)]
pub struct RiskMetrics {
  /// Weight-normalized annualized expected return.
  pub portfolio_return: f64,
  /// Weight-normalized annualized volatility (independence model).
  pub portfolio_volatility: f64,
  /// `(return - risk_free) / volatility`; IEEE ±∞/NaN when the portfolio
  /// volatility is zero.
  pub sharpe_ratio: f64,
  /// 95% value-at-risk as a positive loss magnitude.
  pub var_95: f64,
  /// Average of the worst 5% of returns, as a positive magnitude.
  pub cvar_95: f64,
  /// Running-max drawdown over the raw return series (see [`risk_metrics`]).
  pub max_drawdown: f64,
  /// Regression slope of portfolio returns on market returns; exactly `1.0`
  /// when no usable market series is supplied.
  pub beta: f64,
}

/// Distribution moments of a return series.
#[derive(Clone, Copy, Debug)]
pub struct ReturnMoments {
  pub mean: f64,
  /// Sample (n-1) standard deviation.
  pub std_dev: f64,
  /// Standardized third moment.
  pub skewness: f64,
  /// Excess kurtosis (normal = 0).
  pub kurtosis: f64,
}

/// Compute the full risk profile for `assets` against `returns`.
///
/// `market_returns` must match `returns` in length to contribute a beta;
/// anything else leaves beta at its neutral default of `1.0`.
pub fn risk_metrics(
  assets: &[Asset],
  returns: &[f64],
  market_returns: Option<&[f64]>,
  analytics: &AnalyticsConfig,
) -> Result<RiskMetrics> {
  if returns.is_empty() {
    bail!("return series must not be empty");
  }

  let summary = aggregate(assets)?;
  let sharpe_ratio = (summary.expected_return - analytics.risk_free_rate) / summary.volatility;

  let mut sorted = returns.to_vec();
  sorted.sort_unstable_by_key(|r| OrderedFloat(*r));

  let cut = (0.05 * sorted.len() as f64).floor() as usize;
  let var_95 = sorted[cut].abs();
  // Fewer than 20 samples leave an empty tail below the cut; the tail
  // average falls back to the VaR cut instead of dividing by zero.
  let cvar_95 = if cut == 0 {
    var_95
  } else {
    (sorted[..cut].iter().sum::<f64>() / cut as f64).abs()
  };

  Ok(RiskMetrics {
    portfolio_return: summary.expected_return,
    portfolio_volatility: summary.volatility,
    sharpe_ratio,
    var_95,
    cvar_95,
    max_drawdown: max_drawdown(returns),
    beta: beta(returns, market_returns),
  })
}

/// Distribution moments of the series: mean, sample std-dev, skewness and
/// excess kurtosis.
pub fn return_moments(returns: &[f64]) -> Result<ReturnMoments> {
  if returns.is_empty() {
    bail!("return series must not be empty");
  }

  let mean = returns.mean();
  let std_dev = returns.std_dev();

  let n = returns.len() as f64;
  let pop_std = (returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n).sqrt();
  let skewness = returns
    .iter()
    .map(|r| ((r - mean) / pop_std).powi(3))
    .sum::<f64>()
    / n;
  let kurtosis = returns
    .iter()
    .map(|r| ((r - mean) / pop_std).powi(4))
    .sum::<f64>()
    / n
    - 3.0;

  Ok(ReturnMoments {
    mean,
    std_dev,
    skewness,
    kurtosis,
  })
}

/// Maximum drawdown measured on the raw return series.
///
/// The peak tracks the returns themselves, not a compounded wealth curve,
/// so the ratio can exceed 1 when a large positive return is followed by a
/// loss. This is the figure the dashboard's risk panel displays; it differs
/// from the textbook peak-to-trough equity-curve drawdown.
fn max_drawdown(returns: &[f64]) -> f64 {
  let mut peak = returns[0];
  let mut max_dd = 0.0_f64;

  for &r in returns {
    if r > peak {
      peak = r;
    }
    let dd = (peak - r) / peak;
    if dd > max_dd {
      max_dd = dd;
    }
  }

  max_dd
}

fn beta(returns: &[f64], market_returns: Option<&[f64]>) -> f64 {
  match market_returns {
    Some(market) if market.len() == returns.len() => {
      // OLS slope of portfolio on market, which is cov(p, m) / var(m);
      // degenerate regressions (constant market) keep the neutral default.
      linreg::linear_regression::<f64, f64, f64>(market, returns)
        .map(|(slope, _intercept)| slope)
        .unwrap_or(1.0)
    }
    _ => 1.0,
  }
}
