//! # Config
//!
//! $$
//! r_f = 0.02,\qquad T_{\text{yr}} = 252
//! $$
//!
//! Shared named constants threaded through every engine call.

/// Horizons (in years) simulated by multi-period projections.
pub const DEFAULT_PROJECTION_YEARS: [usize; 6] = [1, 3, 5, 10, 15, 20];

/// Immutable constants shared by the analytics engines.
///
/// Callers hold one of these and pass it by reference into each call;
/// engines never read module-level state, so every invocation stays
/// referentially transparent and safe to run concurrently.
#[derive(Clone, Debug)]
pub struct AnalyticsConfig {
  /// Annualized risk-free rate used in Sharpe ratios.
  pub risk_free_rate: f64,
  /// Trading days per year used to scale annualized drift and volatility.
  pub trading_days: usize,
  /// Fixed horizons (years) covered in multi-period simulation mode.
  pub projection_years: Vec<usize>,
}

impl Default for AnalyticsConfig {
  fn default() -> Self {
    Self {
      risk_free_rate: 0.02,
      trading_days: 252,
      projection_years: DEFAULT_PROJECTION_YEARS.to_vec(),
    }
  }
}
