//! # AHP
//!
//! $$
//! M\mathbf{w}=\lambda_{\max}\mathbf{w},\qquad
//! CR=\frac{(\lambda_{\max}-n)/(n-1)}{RI_n}
//! $$
//!
//! Criterion weights from a reciprocal pairwise-comparison matrix via power
//! iteration, with a Saaty consistency check. The matrix is expected to
//! carry a unit diagonal and reciprocal off-diagonal entries, but this is
//! not validated; only the shape is.

use anyhow::bail;
use anyhow::Result;

use super::Computed;

/// Saaty random consistency index by matrix order (1-based); orders above
/// eight reuse the last entry.
const RANDOM_INDEX: [f64; 8] = [0.0, 0.0, 0.58, 0.9, 1.12, 1.24, 1.32, 1.41];

const MAX_ITERATIONS: usize = 100;
const CONVERGENCE_TOL: f64 = 1e-6;

/// Normalized criterion weights plus the Saaty consistency ratio.
#[derive(Clone, Debug, PartialEq)]
pub struct AhpWeights {
  /// L1-normalized weights, one per criterion.
  pub weights: Vec<f64>,
  /// Ratios above 0.1 conventionally mark the matrix as inconsistent; the
  /// threshold is reported to callers, not enforced here.
  pub consistency_ratio: f64,
}

/// Derive criterion weights from a pairwise-comparison matrix.
///
/// Shape errors and non-finite iteration states degrade to uniform `1/n`
/// weights with a zero consistency ratio instead of failing.
pub fn ahp_weights(criteria_names: &[String], pairwise: &[Vec<f64>]) -> Computed<AhpWeights> {
  match compute(criteria_names, pairwise) {
    Ok(weights) => Computed::Exact(weights),
    Err(e) => {
      let n = criteria_names.len();
      let fallback = AhpWeights {
        weights: if n == 0 {
          Vec::new()
        } else {
          vec![1.0 / n as f64; n]
        },
        consistency_ratio: 0.0,
      };
      Computed::degraded(fallback, e.to_string())
    }
  }
}

fn compute(criteria_names: &[String], pairwise: &[Vec<f64>]) -> Result<AhpWeights> {
  let n = criteria_names.len();
  if n == 0 {
    bail!("criteria list is empty");
  }
  if pairwise.len() != n {
    bail!("pairwise matrix has {} rows for {} criteria", pairwise.len(), n);
  }
  if let Some(row) = pairwise.iter().find(|row| row.len() != n) {
    bail!("pairwise matrix row has {} columns for {} criteria", row.len(), n);
  }

  let mut weights = vec![1.0 / n as f64; n];

  for _ in 0..MAX_ITERATIONS {
    let next = mat_vec(pairwise, &weights);
    let total: f64 = next.iter().sum();
    if !total.is_finite() || total == 0.0 {
      bail!("power iteration diverged (iterate sum {total})");
    }
    let next: Vec<f64> = next.iter().map(|x| x / total).collect();

    let delta: f64 = next
      .iter()
      .zip(&weights)
      .map(|(a, b)| (a - b).abs())
      .sum();
    weights = next;
    if delta < CONVERGENCE_TOL {
      break;
    }
  }

  // principal eigenvalue estimate from the converged weights
  let mv = mat_vec(pairwise, &weights);
  let lambda = mv.iter().zip(&weights).map(|(m, w)| m / w).sum::<f64>() / n as f64;

  let consistency_ratio = if n < 2 {
    // a 1x1 reciprocal matrix is always consistent, and (λ-n)/(n-1) has no
    // meaning there
    0.0
  } else {
    let ci = (lambda - n as f64) / (n as f64 - 1.0);
    let ri = RANDOM_INDEX.get(n - 1).copied().unwrap_or(1.41);
    if ri == 0.0 {
      0.0
    } else {
      ci / ri
    }
  };

  Ok(AhpWeights {
    weights,
    consistency_ratio,
  })
}

fn mat_vec(mat: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
  mat
    .iter()
    .map(|row| row.iter().zip(v.iter()).map(|(a, b)| a * b).sum())
    .collect()
}
