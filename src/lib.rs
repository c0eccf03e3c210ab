//! # Quantfolio
//!
//! `quantfolio` is the quantitative core behind a portfolio-risk dashboard:
//! Monte Carlo value-path simulation, realized-series risk metrics and
//! multi-criteria decision ranking over a caller-owned asset list.
//!
//! ## Modules
//!
//! | Module          | Description                                                                 |
//! |-----------------|-----------------------------------------------------------------------------|
//! | [`config`]      | Shared named constants (risk-free rate, trading-year length, horizons).      |
//! | [`sampler`]     | Box-Muller standard-normal sampling over explicit generator handles.         |
//! | [`portfolio`]   | Asset records, weight-normalized aggregation and re-weighting suggestions.   |
//! | [`monte_carlo`] | Geometric-Brownian-motion path simulation with percentile/VaR extraction.    |
//! | [`risk`]        | VaR/CVaR, drawdown, beta and distribution moments over a return series.      |
//! | [`decision`]    | AHP criterion weighting and TOPSIS asset ranking with degraded-result tags.  |
//!
//! ## Engines
//!
//! The engines are pure, synchronous, CPU-bound functions over `&[Asset]`;
//! they never call each other and share no mutable state, so concurrent
//! invocation needs no locking. Simulation paths fan out across threads via
//! `rayon`, and every run owns its generator handles (seeded per path), so
//! seeded runs reproduce exactly.
//!
//! ## Example
//!
//! ```rust
//! use quantfolio::config::AnalyticsConfig;
//! use quantfolio::monte_carlo::{MonteCarloConfig, simulate};
//! use quantfolio::portfolio::{aggregate, Asset};
//!
//! let assets = vec![
//!   Asset::new("EQTY".to_string(), 60.0, 0.12, 0.25, 210.0),
//!   Asset::new("BOND".to_string(), 40.0, 0.05, 0.08, 98.0),
//! ];
//!
//! let analytics = AnalyticsConfig::default();
//! let summary = aggregate(&assets).unwrap();
//! let result = simulate(&assets, &MonteCarloConfig::default(), &analytics).unwrap();
//!
//! assert!(result.percentiles.p5 <= result.percentiles.p95);
//! assert_eq!(result.expected_return, summary.expected_return);
//! ```

pub mod config;
pub mod decision;
pub mod monte_carlo;
pub mod portfolio;
pub mod risk;
pub mod sampler;

pub use config::AnalyticsConfig;
pub use config::DEFAULT_PROJECTION_YEARS;
pub use decision::ahp_weights;
pub use decision::normalize_weights;
pub use decision::topsis_rank;
pub use decision::AhpWeights;
pub use decision::Computed;
pub use decision::CriterionKind;
pub use decision::TopsisCriterion;
pub use decision::TopsisResult;
pub use monte_carlo::simulate;
pub use monte_carlo::MonteCarloConfig;
pub use monte_carlo::MonteCarloEngine;
pub use monte_carlo::Percentiles;
pub use monte_carlo::Projection;
pub use monte_carlo::SimulationResult;
pub use portfolio::aggregate;
pub use portfolio::aggregate_with_covariance;
pub use portfolio::suggest_inverse_vol_weights;
pub use portfolio::Asset;
pub use portfolio::CovarianceModel;
pub use portfolio::PortfolioSummary;
pub use risk::return_moments;
pub use risk::risk_metrics;
pub use risk::ReturnMoments;
pub use risk::RiskMetrics;
pub use sampler::BoxMuller;
