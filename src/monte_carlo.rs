//! # Monte Carlo
//!
//! $$
//! V_{t+1}=V_t\,(1+z\,\sigma_d+\mu_d),\qquad
//! \mu_d=\tfrac{\mu}{252},\ \ \sigma_d=\tfrac{\sigma}{\sqrt{252}}
//! $$
//!
//! Forward-looking portfolio value simulation under discretized geometric
//! Brownian motion, with percentile, VaR and multi-horizon extraction.
//! Paths are independent and fan out across threads with `rayon`; each path
//! derives its own generator seed from the base seed, so seeded runs are
//! reproducible regardless of thread scheduling.

use anyhow::bail;
use anyhow::Result;
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Distribution;
use rayon::prelude::*;

use crate::config::AnalyticsConfig;
use crate::portfolio::aggregate;
use crate::portfolio::Asset;
use crate::portfolio::PortfolioSummary;
use crate::sampler::BoxMuller;

/// Runtime configuration for [`MonteCarloEngine`].
#[derive(Clone, Debug)]
pub struct MonteCarloConfig {
  /// Starting portfolio value.
  pub initial_value: f64,
  /// Horizon of the base simulation in trading days.
  pub time_horizon_days: usize,
  /// Number of independent paths per batch.
  pub simulation_count: usize,
  /// Also simulate the fixed multi-year horizons.
  pub include_multi_period: bool,
  /// Base RNG seed; `None` draws a fresh one per run.
  pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
  fn default() -> Self {
    Self {
      initial_value: 100_000.0,
      time_horizon_days: 252,
      simulation_count: 10_000,
      include_multi_period: true,
      seed: None,
    }
  }
}

/// Five-point percentile summary of a sorted sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct Percentiles {
  pub p5: f64,
  pub p25: f64,
  pub p50: f64,
  pub p75: f64,
  pub p95: f64,
}

/// Fixed-horizon projection produced in multi-period mode.
#[derive(Clone, Debug)]
pub struct Projection {
  /// Horizon label, e.g. `"5Y"`.
  pub period: String,
  /// Horizon length in trading days.
  pub time_horizon_days: usize,
  /// Percentiles of the final portfolio value.
  pub percentiles: Percentiles,
  /// Percentiles of total return, in percent.
  pub total_return: Percentiles,
  /// Median-based annualized return, in percent.
  pub annualized_return: f64,
  /// Share of paths finishing below the initial value, in percent.
  pub probability_of_loss: f64,
}

/// Full output of one simulation run. Materialized in one call and replaced
/// wholesale by the next run; nothing is mutated incrementally.
#[derive(Clone, Debug)]
pub struct SimulationResult {
  /// Final path values, sorted ascending.
  pub final_values: Vec<f64>,
  /// Per-path total returns `(final - initial) / initial`, sorted ascending.
  pub returns: Vec<f64>,
  /// Percentiles of the final values.
  pub percentiles: Percentiles,
  /// 95% value-at-risk as a positive loss fraction of the initial value.
  pub var_95: f64,
  /// Annualized portfolio expected return driving the drift.
  pub expected_return: f64,
  /// Annualized portfolio volatility driving the diffusion.
  pub volatility: f64,
  /// `(expected_return - risk_free) / volatility`; IEEE ±∞/NaN when the
  /// portfolio volatility is zero.
  pub sharpe_ratio: f64,
  /// Base horizon in trading days.
  pub time_horizon_days: usize,
  /// Fixed-horizon projections; empty unless multi-period mode is on.
  pub projections: Vec<Projection>,
}

/// Monte Carlo engine over a caller-owned asset list.
#[derive(Clone, Debug)]
pub struct MonteCarloEngine {
  config: MonteCarloConfig,
  analytics: AnalyticsConfig,
}

impl MonteCarloEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: MonteCarloConfig, analytics: AnalyticsConfig) -> Self {
    Self { config, analytics }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &MonteCarloConfig {
    &self.config
  }

  /// Run one simulation; see [`simulate`].
  pub fn simulate(&self, assets: &[Asset]) -> Result<SimulationResult> {
    simulate(assets, &self.config, &self.analytics)
  }
}

/// Simulate portfolio value paths and derive percentile/VaR/Sharpe
/// statistics, plus fixed multi-year projections when requested.
pub fn simulate(
  assets: &[Asset],
  config: &MonteCarloConfig,
  analytics: &AnalyticsConfig,
) -> Result<SimulationResult> {
  if assets.is_empty() {
    bail!("asset list must not be empty");
  }
  if !(config.initial_value > 0.0) {
    bail!("initial value must be positive, got {}", config.initial_value);
  }
  if config.time_horizon_days == 0 {
    bail!("time horizon must be at least one day");
  }
  if config.simulation_count == 0 {
    bail!("simulation count must be at least one path");
  }

  let summary = aggregate(assets)?;
  let base_seed = config.seed.unwrap_or_else(rand::random);

  let (final_values, returns) = run_batch(
    &summary,
    config.initial_value,
    config.time_horizon_days,
    config.simulation_count,
    analytics,
    base_seed,
  );

  let percentiles = extract_percentiles(&final_values);
  let var_95 = ((percentiles.p5 - config.initial_value) / config.initial_value).abs();
  // Zero volatility leaves the ratio at IEEE ±∞/NaN: degenerate but
  // representable, never an error.
  let sharpe_ratio = (summary.expected_return - analytics.risk_free_rate) / summary.volatility;

  let mut projections = Vec::new();
  if config.include_multi_period {
    for &years in &analytics.projection_years {
      // every horizon is an independent batch with its own derived seed,
      // not a subsample of the base run
      let horizon_seed = base_seed.wrapping_add((years as u64) << 32);
      projections.push(project_horizon(
        &summary,
        config.initial_value,
        years,
        config.simulation_count,
        analytics,
        horizon_seed,
      ));
    }
  }

  Ok(SimulationResult {
    final_values,
    returns,
    percentiles,
    var_95,
    expected_return: summary.expected_return,
    volatility: summary.volatility,
    sharpe_ratio,
    time_horizon_days: config.time_horizon_days,
    projections,
  })
}

/// Simulate one batch of paths and return final values and per-path total
/// returns, both sorted ascending.
fn run_batch(
  summary: &PortfolioSummary,
  initial: f64,
  days: usize,
  count: usize,
  analytics: &AnalyticsConfig,
  seed: u64,
) -> (Vec<f64>, Vec<f64>) {
  let trading_days = analytics.trading_days as f64;
  let daily_drift = summary.expected_return / trading_days;
  let daily_vol = summary.volatility / trading_days.sqrt();
  let normal = BoxMuller::new();

  let mut final_values: Vec<f64> = (0..count)
    .into_par_iter()
    .map(|path| {
      let mut rng = StdRng::seed_from_u64(seed.wrapping_add(path as u64));
      let mut value = initial;
      for _ in 0..days {
        let z = normal.sample(&mut rng);
        value *= 1.0 + z * daily_vol + daily_drift;
      }
      value
    })
    .collect();

  let mut returns: Vec<f64> = final_values
    .iter()
    .map(|v| (v - initial) / initial)
    .collect();

  final_values.sort_unstable_by_key(|v| OrderedFloat(*v));
  returns.sort_unstable_by_key(|r| OrderedFloat(*r));

  (final_values, returns)
}

fn project_horizon(
  summary: &PortfolioSummary,
  initial: f64,
  years: usize,
  count: usize,
  analytics: &AnalyticsConfig,
  seed: u64,
) -> Projection {
  let days = years * analytics.trading_days;
  let (finals, _returns) = run_batch(summary, initial, days, count, analytics, seed);

  let percentiles = extract_percentiles(&finals);
  let total_return = Percentiles {
    p5: 100.0 * (percentiles.p5 - initial) / initial,
    p25: 100.0 * (percentiles.p25 - initial) / initial,
    p50: 100.0 * (percentiles.p50 - initial) / initial,
    p75: 100.0 * (percentiles.p75 - initial) / initial,
    p95: 100.0 * (percentiles.p95 - initial) / initial,
  };
  let annualized_return = 100.0 * ((percentiles.p50 / initial).powf(1.0 / years as f64) - 1.0);
  let below = finals.iter().filter(|v| **v < initial).count();
  let probability_of_loss = 100.0 * below as f64 / finals.len() as f64;

  Projection {
    period: format!("{years}Y"),
    time_horizon_days: days,
    percentiles,
    total_return,
    annualized_return,
    probability_of_loss,
  }
}

fn extract_percentiles(sorted: &[f64]) -> Percentiles {
  Percentiles {
    p5: percentile(sorted, 0.05),
    p25: percentile(sorted, 0.25),
    p50: percentile(sorted, 0.50),
    p75: percentile(sorted, 0.75),
    p95: percentile(sorted, 0.95),
  }
}

// Simple index estimator at floor(q * n), no interpolation.
fn percentile(sorted: &[f64], q: f64) -> f64 {
  let idx = (q * sorted.len() as f64).floor() as usize;
  sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;

  use super::*;

  fn assets() -> Vec<Asset> {
    vec![
      Asset::new("EQTY".to_string(), 60.0, 0.12, 0.25, 210.0),
      Asset::new("BOND".to_string(), 40.0, 0.05, 0.08, 98.0),
    ]
  }

  fn config(count: usize, days: usize) -> MonteCarloConfig {
    MonteCarloConfig {
      time_horizon_days: days,
      simulation_count: count,
      include_multi_period: false,
      seed: Some(42),
      ..MonteCarloConfig::default()
    }
  }

  #[test]
  fn contract_violations_are_rejected() {
    let analytics = AnalyticsConfig::default();

    assert!(simulate(&[], &config(100, 10), &analytics).is_err());

    let mut bad = config(100, 10);
    bad.initial_value = 0.0;
    assert!(simulate(&assets(), &bad, &analytics).is_err());

    assert!(simulate(&assets(), &config(0, 10), &analytics).is_err());
    assert!(simulate(&assets(), &config(100, 0), &analytics).is_err());
  }

  #[test]
  fn batch_size_and_positivity() {
    let analytics = AnalyticsConfig::default();
    let result = simulate(&assets(), &config(2_000, 64), &analytics).unwrap();

    assert_eq!(result.final_values.len(), 2_000);
    assert_eq!(result.returns.len(), 2_000);
    assert!(result.final_values.iter().all(|v| v.is_finite() && *v > 0.0));
  }

  #[test]
  fn percentiles_are_monotone() {
    let analytics = AnalyticsConfig::default();
    let result = simulate(&assets(), &config(2_000, 64), &analytics).unwrap();
    let p = result.percentiles;

    assert!(p.p5 <= p.p25);
    assert!(p.p25 <= p.p50);
    assert!(p.p50 <= p.p75);
    assert!(p.p75 <= p.p95);
    assert!(result.var_95 >= 0.0);
  }

  #[test]
  fn zero_volatility_is_deterministic() {
    let analytics = AnalyticsConfig::default();
    let assets = vec![Asset::new("FLAT".to_string(), 100.0, 0.10, 0.0, 50.0)];
    let cfg = config(500, 252);

    let result = simulate(&assets, &cfg, &analytics).unwrap();

    let expected = cfg.initial_value * (1.0_f64 + 0.10 / 252.0).powi(252);
    assert_relative_eq!(result.final_values[0], expected, max_relative = 1e-9);
    // every path multiplies the same factors in the same order
    assert!(result.final_values.iter().all(|v| *v == result.final_values[0]));
    assert_eq!(result.percentiles.p5, result.percentiles.p95);
    assert_relative_eq!(
      result.var_95,
      (expected - cfg.initial_value).abs() / cfg.initial_value,
      max_relative = 1e-9
    );
    // Sharpe over zero volatility is the documented degenerate output
    assert!(!result.sharpe_ratio.is_finite());
  }

  #[test]
  fn seeded_runs_reproduce() {
    let analytics = AnalyticsConfig::default();
    let a = simulate(&assets(), &config(500, 32), &analytics).unwrap();
    let b = simulate(&assets(), &config(500, 32), &analytics).unwrap();

    assert_eq!(a.final_values, b.final_values);
    assert_eq!(a.returns, b.returns);

    let mut other = config(500, 32);
    other.seed = Some(43);
    let c = simulate(&assets(), &other, &analytics).unwrap();
    assert_ne!(a.final_values, c.final_values);
  }

  #[test]
  fn returns_are_consistent_with_final_values() {
    let analytics = AnalyticsConfig::default();
    let cfg = config(500, 32);
    let result = simulate(&assets(), &cfg, &analytics).unwrap();

    // both arrays are sorted and related by the same affine map, so they
    // correspond elementwise
    for (v, r) in result.final_values.iter().zip(&result.returns) {
      assert_relative_eq!(
        *r,
        (v - cfg.initial_value) / cfg.initial_value,
        max_relative = 1e-12
      );
    }
  }

  #[test]
  fn multi_period_projects_each_horizon() {
    let analytics = AnalyticsConfig::default();
    let mut cfg = config(300, 32);
    cfg.include_multi_period = true;

    let result = simulate(&assets(), &cfg, &analytics).unwrap();

    assert_eq!(result.projections.len(), analytics.projection_years.len());
    for (projection, &years) in result.projections.iter().zip(&analytics.projection_years) {
      assert_eq!(projection.period, format!("{years}Y"));
      assert_eq!(projection.time_horizon_days, years * analytics.trading_days);
      assert!(projection.probability_of_loss >= 0.0);
      assert!(projection.probability_of_loss <= 100.0);
      assert!(projection.percentiles.p5 <= projection.percentiles.p95);
    }
  }

  #[test]
  fn engine_wraps_the_free_function() {
    let engine = MonteCarloEngine::new(config(200, 16), AnalyticsConfig::default());
    let result = engine.simulate(&assets()).unwrap();

    assert_eq!(result.final_values.len(), 200);
    assert_eq!(engine.config().simulation_count, 200);
  }
}
