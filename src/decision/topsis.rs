//! # TOPSIS
//!
//! $$
//! C_i=\frac{d_i^-}{d_i^+ + d_i^-}
//! $$
//!
//! Ranks assets by relative closeness to the ideal solution across
//! weighted, vector-normalized criteria. Beneficial criteria pull the
//! ideal toward the column maximum, cost criteria toward the minimum.

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use ndarray::Array2;
use ndarray_stats::QuantileExt;
use ordered_float::OrderedFloat;

use super::Computed;
use crate::config::AnalyticsConfig;
use crate::portfolio::Asset;

/// Criterion extracted per asset for the decision matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CriterionKind {
  Return,
  Volatility,
  Sharpe,
  Price,
  /// Unrecognized name; extracts 0 for every asset.
  Unknown,
}

impl CriterionKind {
  /// Parse a criterion name; unrecognized names map to [`CriterionKind::Unknown`].
  pub fn from_str(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "return" => Self::Return,
      "volatility" => Self::Volatility,
      "sharpe" => Self::Sharpe,
      "price" => Self::Price,
      _ => Self::Unknown,
    }
  }

  fn extract(&self, asset: &Asset, risk_free: f64) -> f64 {
    match self {
      Self::Return => asset.expected_return,
      Self::Volatility => asset.volatility,
      Self::Sharpe => (asset.expected_return - risk_free) / asset.volatility,
      Self::Price => asset.price,
      Self::Unknown => 0.0,
    }
  }
}

/// Weighted ranking criterion.
#[derive(Clone, Debug)]
pub struct TopsisCriterion {
  pub kind: CriterionKind,
  /// Relative importance in [0, 1]. The ranking is only meaningful when
  /// the weights sum to 1; see [`normalize_weights`].
  pub weight: f64,
  /// Higher values preferred when true, lower when false.
  pub beneficial: bool,
}

impl TopsisCriterion {
  pub fn new(name: &str, weight: f64, beneficial: bool) -> Self {
    Self {
      kind: CriterionKind::from_str(name),
      weight,
      beneficial,
    }
  }
}

/// Per-asset ranking outcome.
#[derive(Clone, Debug)]
pub struct TopsisResult {
  /// Index of the asset in the caller's input order.
  pub asset_index: usize,
  pub symbol: String,
  /// Relative closeness in [0, 1]; higher is better.
  pub score: f64,
  /// 1-based rank; ties keep input order.
  pub rank: usize,
  pub distance_to_ideal: f64,
  pub distance_to_negative: f64,
}

/// Rescale criterion weights in place to sum to 1. No-op when the sum is 0.
pub fn normalize_weights(criteria: &mut [TopsisCriterion]) {
  let total: f64 = criteria.iter().map(|c| c.weight).sum();
  if total > 0.0 {
    for criterion in criteria.iter_mut() {
      criterion.weight /= total;
    }
  }
}

/// Rank assets by closeness to the ideal solution; the returned list is
/// sorted by rank ascending.
///
/// Empty inputs and non-finite decision matrices degrade to the neutral
/// fallback (score 0, input order) instead of failing.
pub fn topsis_rank(
  assets: &[Asset],
  criteria: &[TopsisCriterion],
  analytics: &AnalyticsConfig,
) -> Computed<Vec<TopsisResult>> {
  match compute(assets, criteria, analytics) {
    Ok(results) => Computed::Exact(results),
    Err(e) => {
      let fallback = assets
        .iter()
        .enumerate()
        .map(|(i, asset)| TopsisResult {
          asset_index: i,
          symbol: asset.symbol.clone(),
          score: 0.0,
          rank: i + 1,
          distance_to_ideal: 0.0,
          distance_to_negative: 0.0,
        })
        .collect();
      Computed::degraded(fallback, e.to_string())
    }
  }
}

fn compute(
  assets: &[Asset],
  criteria: &[TopsisCriterion],
  analytics: &AnalyticsConfig,
) -> Result<Vec<TopsisResult>> {
  let n = assets.len();
  let m = criteria.len();
  if n == 0 {
    bail!("asset list is empty");
  }
  if m == 0 {
    bail!("criteria list is empty");
  }

  let weight_total: f64 = criteria.iter().map(|c| c.weight).sum();
  if (weight_total - 1.0).abs() > 1e-6 {
    tracing::warn!(weight_total, "criterion weights do not sum to 1");
  }

  let mut matrix = Array2::<f64>::zeros((n, m));
  for (i, asset) in assets.iter().enumerate() {
    for (j, criterion) in criteria.iter().enumerate() {
      matrix[[i, j]] = criterion.kind.extract(asset, analytics.risk_free_rate);
    }
  }

  // vector-normalize and weight each column; zero-norm columns stay zero
  for (j, criterion) in criteria.iter().enumerate() {
    let norm = matrix.column(j).iter().map(|x| x * x).sum::<f64>().sqrt();
    let scale = if norm > 0.0 { criterion.weight / norm } else { 0.0 };
    for i in 0..n {
      matrix[[i, j]] *= scale;
    }
  }

  let (ideal, negative) = ideal_vectors(&matrix, criteria)?;

  let mut results: Vec<TopsisResult> = assets
    .iter()
    .enumerate()
    .map(|(i, asset)| {
      let mut d_pos = 0.0;
      let mut d_neg = 0.0;
      for j in 0..m {
        d_pos += (matrix[[i, j]] - ideal[j]).powi(2);
        d_neg += (matrix[[i, j]] - negative[j]).powi(2);
      }
      let d_pos = d_pos.sqrt();
      let d_neg = d_neg.sqrt();

      let denom = d_pos + d_neg;
      // an asset equal to both reference points scores 0, not NaN
      let score = if denom > 0.0 { d_neg / denom } else { 0.0 };

      TopsisResult {
        asset_index: i,
        symbol: asset.symbol.clone(),
        score,
        rank: 0,
        distance_to_ideal: d_pos,
        distance_to_negative: d_neg,
      }
    })
    .collect();

  // stable sort: equal scores keep input order
  results.sort_by_key(|r| std::cmp::Reverse(OrderedFloat(r.score)));
  for (position, result) in results.iter_mut().enumerate() {
    result.rank = position + 1;
  }

  Ok(results)
}

fn ideal_vectors(
  matrix: &Array2<f64>,
  criteria: &[TopsisCriterion],
) -> Result<(Vec<f64>, Vec<f64>)> {
  let mut ideal = Vec::with_capacity(criteria.len());
  let mut negative = Vec::with_capacity(criteria.len());

  for (j, criterion) in criteria.iter().enumerate() {
    let column = matrix.column(j);
    let max = *column
      .max()
      .map_err(|e| anyhow!("criterion column {j} has no ordered maximum: {e}"))?;
    let min = *column
      .min()
      .map_err(|e| anyhow!("criterion column {j} has no ordered minimum: {e}"))?;

    if criterion.beneficial {
      ideal.push(max);
      negative.push(min);
    } else {
      ideal.push(min);
      negative.push(max);
    }
  }

  Ok((ideal, negative))
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;

  use super::*;

  fn asset(symbol: &str, ret: f64, vol: f64, price: f64) -> Asset {
    Asset::new(symbol.to_string(), 50.0, ret, vol, price)
  }

  fn default_criteria() -> Vec<TopsisCriterion> {
    vec![
      TopsisCriterion::new("return", 0.4, true),
      TopsisCriterion::new("volatility", 0.3, false),
      TopsisCriterion::new("sharpe", 0.2, true),
      TopsisCriterion::new("price", 0.1, false),
    ]
  }

  #[test]
  fn dominating_asset_ranks_first() {
    let assets = vec![
      asset("GOOD", 0.20, 0.10, 50.0),
      asset("BAD", 0.05, 0.40, 300.0),
    ];

    let ranking = topsis_rank(&assets, &default_criteria(), &AnalyticsConfig::default());
    assert!(!ranking.is_degraded());

    let results = ranking.value();
    assert_eq!(results[0].symbol, "GOOD");
    assert_eq!(results[0].rank, 1);
    assert_eq!(results[1].rank, 2);
    assert!(results[0].score > results[1].score);
  }

  #[test]
  fn scores_stay_in_unit_interval() {
    let assets = vec![
      asset("AAA", 0.12, 0.25, 210.0),
      asset("BBB", 0.05, 0.08, 98.0),
      asset("CCC", 0.18, 0.35, 410.0),
    ];

    let ranking = topsis_rank(&assets, &default_criteria(), &AnalyticsConfig::default());
    for result in ranking.value() {
      assert!(result.score >= 0.0 && result.score <= 1.0, "score {}", result.score);
      assert!(result.distance_to_ideal >= 0.0);
      assert!(result.distance_to_negative >= 0.0);
    }
  }

  #[test]
  fn results_arrive_sorted_by_rank() {
    let assets = vec![
      asset("AAA", 0.12, 0.25, 210.0),
      asset("BBB", 0.05, 0.08, 98.0),
      asset("CCC", 0.18, 0.35, 410.0),
    ];

    let ranking = topsis_rank(&assets, &default_criteria(), &AnalyticsConfig::default());
    let results = ranking.value();
    for (position, result) in results.iter().enumerate() {
      assert_eq!(result.rank, position + 1);
    }
  }

  #[test]
  fn single_beneficial_criterion_orders_by_value() {
    let assets = vec![asset("LOW", 0.05, 0.2, 100.0), asset("HIGH", 0.15, 0.2, 100.0)];
    let criteria = vec![TopsisCriterion::new("return", 1.0, true)];

    let ranking = topsis_rank(&assets, &criteria, &AnalyticsConfig::default());
    let results = ranking.value();

    assert_eq!(results[0].symbol, "HIGH");
    assert_relative_eq!(results[0].score, 1.0, max_relative = 1e-12);
    assert_relative_eq!(results[1].score, 0.0, epsilon = 1e-12);
  }

  #[test]
  fn unknown_criterion_extracts_zero_for_everyone() {
    let assets = vec![asset("AAA", 0.12, 0.25, 210.0), asset("BBB", 0.05, 0.08, 98.0)];
    let criteria = vec![TopsisCriterion::new("momentum", 1.0, true)];

    let ranking = topsis_rank(&assets, &criteria, &AnalyticsConfig::default());
    assert!(!ranking.is_degraded());

    // an all-zero column collapses both reference points onto every asset
    let results = ranking.value();
    assert!(results.iter().all(|r| r.score == 0.0));
    assert_eq!(results[0].asset_index, 0);
    assert_eq!(results[1].asset_index, 1);
  }

  #[test]
  fn empty_inputs_degrade_to_input_order() {
    let assets = vec![asset("AAA", 0.12, 0.25, 210.0), asset("BBB", 0.05, 0.08, 98.0)];

    let ranking = topsis_rank(&assets, &[], &AnalyticsConfig::default());
    assert!(ranking.is_degraded());

    let results = ranking.value();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].rank, 1);
    assert_eq!(results[1].rank, 2);
    assert!(results.iter().all(|r| r.score == 0.0));

    let ranking = topsis_rank(&[], &default_criteria(), &AnalyticsConfig::default());
    assert!(ranking.is_degraded());
    assert!(ranking.value().is_empty());
  }

  #[test]
  fn normalize_weights_rescales_to_unit_sum() {
    let mut criteria = vec![
      TopsisCriterion::new("return", 2.0, true),
      TopsisCriterion::new("volatility", 1.0, false),
      TopsisCriterion::new("price", 1.0, false),
    ];
    normalize_weights(&mut criteria);

    let total: f64 = criteria.iter().map(|c| c.weight).sum();
    assert_relative_eq!(total, 1.0, max_relative = 1e-12);
    assert_relative_eq!(criteria[0].weight, 0.5, max_relative = 1e-12);

    let mut zeroed = vec![TopsisCriterion::new("return", 0.0, true)];
    normalize_weights(&mut zeroed);
    assert_eq!(zeroed[0].weight, 0.0);
  }

  #[test]
  fn criterion_names_parse_case_insensitively() {
    assert_eq!(CriterionKind::from_str("Return"), CriterionKind::Return);
    assert_eq!(CriterionKind::from_str("VOLATILITY"), CriterionKind::Volatility);
    assert_eq!(CriterionKind::from_str("sharpe"), CriterionKind::Sharpe);
    assert_eq!(CriterionKind::from_str("price"), CriterionKind::Price);
    assert_eq!(CriterionKind::from_str("momentum"), CriterionKind::Unknown);
  }
}
