//! # Sampler
//!
//! $$
//! z=\sqrt{-2\ln u_1}\,\cos(2\pi u_2)
//! $$
//!
//! Standard-normal sampling via the Box-Muller transform over an explicit
//! generator handle. Simulations thread their own seeded [`rand::Rng`]
//! through this distribution, so parallel runs never contend on a shared
//! generator and seeded runs reproduce bit for bit.

use rand::Rng;
use rand_distr::Distribution;
use rand_distr::Uniform;

/// Box-Muller standard-normal distribution.
///
/// `u1` is drawn from an interval bounded away from zero so the logarithm
/// is always finite; `u2` spans the usual half-open unit interval.
#[derive(Clone, Copy, Debug)]
pub struct BoxMuller {
  u1: Uniform<f64>,
  u2: Uniform<f64>,
}

impl BoxMuller {
  pub fn new() -> Self {
    Self {
      u1: Uniform::new(f64::MIN_POSITIVE, 1.0),
      u2: Uniform::new(0.0, 1.0),
    }
  }
}

impl Default for BoxMuller {
  fn default() -> Self {
    Self::new()
  }
}

impl Distribution<f64> for BoxMuller {
  fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
    let u1 = rng.sample(self.u1);
    let u2 = rng.sample(self.u2);
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
  }
}
