//! Beta sampler built from two Gamma draws.
//!
//! Gamma uses the Marsaglia-Tsang squeeze on top of a Box-Muller normal.
//! Shapes below 1 are boosted: `Gamma(a) = Gamma(1 + a) * U^(1/a)`.
//! Arguments are not validated; callers clamp shapes to a small positive floor.

use std::f64::consts::PI;

use tracing::warn;

use crate::error::{BargainError, Result};
use crate::rng::UniformSource;

/// Default cap on Marsaglia-Tsang candidate draws per gamma variate.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct RandomSampler {
    max_iterations: u32,
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

impl RandomSampler {
    pub fn new(max_iterations: u32) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Standard normal variate. Both uniforms are mapped `1 - U` so `ln` never sees 0.
    pub fn normal01(&self, src: &mut dyn UniformSource) -> f64 {
        let u = 1.0 - src.next_f64();
        let v = 1.0 - src.next_f64();
        (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
    }

    pub fn gamma(&self, src: &mut dyn UniformSource, shape: f64) -> Result<f64> {
        // Boost small shapes up front; the loop below then handles shape >= 1.
        let (shape_eff, boost) = if shape < 1.0 {
            let u = 1.0 - src.next_f64();
            (1.0 + shape, u.powf(1.0 / shape))
        } else {
            (shape, 1.0)
        };

        let d = shape_eff - 1.0 / 3.0;
        let c = 1.0 / (9.0 * d).sqrt();

        let mut iterations = 0u32;
        while iterations < self.max_iterations {
            iterations += 1;
            let x = self.normal01(src);
            let mut v = 1.0 + c * x;
            if v <= 0.0 {
                continue;
            }
            v = v * v * v;
            let u = src.next_f64();
            let x2 = x * x;
            if u < 1.0 - 0.0331 * x2 * x2 {
                return Ok(d * v * boost);
            }
            if u.ln() < 0.5 * x2 + d * (1.0 - v + v.ln()) {
                return Ok(d * v * boost);
            }
        }

        warn!(shape, iterations, "Gamma sampler hit iteration cap");
        Err(BargainError::Sampling { shape, iterations })
    }

    /// Beta(alpha, beta) as `x / (x + y)` with independent gamma draws.
    pub fn beta(&self, src: &mut dyn UniformSource, alpha: f64, beta: f64) -> Result<f64> {
        let x = self.gamma(src, alpha)?;
        let y = self.gamma(src, beta)?;
        let sum = x + y;
        // Both draws can underflow for shapes near the 1e-6 floor.
        if !(sum > 0.0) || !sum.is_finite() {
            return Err(BargainError::Sampling {
                shape: alpha.min(beta),
                iterations: 0,
            });
        }
        Ok(x / sum)
    }
}
