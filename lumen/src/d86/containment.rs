//! Energy-containment search over the principal-axis ellipse family.
//!
//! For a scale factor `g` the ellipse `u²/(g²·λ1) + v²/(g²·λ2) ≤ 1` (with `u`,
//! `v` the pixel offsets rotated into principal-axis coordinates) contains some
//! amount of energy that never decreases as `g` grows. The search brackets the
//! target energy by doubling `g`, then bisects.

use common::Buffer2;
use rayon::prelude::*;

use super::eigen::EigenResult;
use super::moments::{carries_energy, CovarianceResult, PixelScale};
use crate::error::{Error, Result};

/// Upper bound on gamma while bracketing.
pub const MAX_GAMMA: f64 = 1e6;

/// Fixed number of bisection steps after bracketing.
pub const BISECTION_ITERATIONS: usize = 60;

/// Eigenvalues smaller than this fraction of `lambda1` are floored to it, so
/// collinear distributions still have finite normalized radii.
const MIN_EIGEN_RATIO: f64 = 1e-12;

/// Rows per rayon task when projecting samples.
const ROWS_PER_CHUNK: usize = 16;

/// One energy-carrying pixel in principal-axis coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedSample {
    pub value: f64,
    pub u2: f64,
    pub v2: f64,
    /// `u²/λ1 + v²/λ2`; the pixel is inside the ellipse for `g` iff this is `≤ g²`.
    radius_sq: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaSearch {
    pub gamma: f64,
    /// Energy inside the ellipse at `gamma`.
    pub enclosed_energy: f64,
    pub target_energy: f64,
}

/// Projected samples and the eigenvalues that define the ellipse family.
#[derive(Debug, Clone)]
pub struct ContainmentProfile {
    samples: Vec<ProjectedSample>,
    lambda1: f64,
    lambda2: f64,
    total_energy: f64,
}

impl ContainmentProfile {
    /// Builds a profile from already-projected `(value, u², v²)` triples.
    pub fn from_samples(
        samples: impl IntoIterator<Item = (f64, f64, f64)>,
        lambda1: f64,
        lambda2: f64,
    ) -> Self {
        let samples: Vec<ProjectedSample> = samples
            .into_iter()
            .filter(|&(value, _, _)| value > 0.0)
            .map(|(value, u2, v2)| ProjectedSample {
                value,
                u2,
                v2,
                radius_sq: normalized_radius_sq(u2, v2, lambda1, lambda2),
            })
            .collect();
        let total_energy = samples.iter().map(|s| s.value).sum();

        Self {
            samples,
            lambda1,
            lambda2,
            total_energy,
        }
    }

    /// Projects every energy-carrying pixel of `gray` onto the principal axes.
    pub fn from_image(
        gray: &Buffer2<f32>,
        moments: &CovarianceResult,
        eigen: &EigenResult,
        scale: PixelScale,
    ) -> Self {
        let width = gray.width();
        let (cx, cy) = moments.centroid;
        let (sin, cos) = eigen.theta_rad.sin_cos();

        let triples: Vec<(f64, f64, f64)> = gray
            .pixels()
            .par_chunks(width * ROWS_PER_CHUNK)
            .enumerate()
            .flat_map_iter(|(chunk_idx, chunk)| {
                let y0 = chunk_idx * ROWS_PER_CHUNK;
                chunk
                    .iter()
                    .enumerate()
                    .filter(|&(_, &value)| carries_energy(value))
                    .map(move |(i, &value)| {
                        let x = (i % width) as f64;
                        let y = (y0 + i / width) as f64;
                        let dx = (x - cx) * scale.sx;
                        let dy = (y - cy) * scale.sy;
                        let u = dx * cos + dy * sin;
                        let v = -dx * sin + dy * cos;
                        (value as f64, u * u, v * v)
                    })
            })
            .collect();

        Self::from_samples(triples, eigen.lambda1, eigen.lambda2)
    }

    pub fn samples(&self) -> &[ProjectedSample] {
        &self.samples
    }

    pub fn total_energy(&self) -> f64 {
        self.total_energy
    }

    pub fn eigenvalues(&self) -> (f64, f64) {
        (self.lambda1, self.lambda2)
    }

    /// Energy of all samples inside the ellipse scaled by `gamma`.
    ///
    /// Summed sequentially in sample order so that a fully enclosing ellipse
    /// reproduces `total_energy` exactly.
    pub fn energy_in_gamma(&self, gamma: f64) -> f64 {
        let limit = gamma * gamma;
        self.samples
            .iter()
            .filter(|s| s.radius_sq <= limit)
            .map(|s| s.value)
            .sum()
    }

    /// Finds the smallest gamma whose ellipse holds `ratio` of the total energy.
    ///
    /// `ratio` is a fraction in `(0, 1]`.
    pub fn find_gamma(&self, ratio: f64) -> Result<GammaSearch> {
        let target = ratio * self.total_energy;

        let mut lo = 0.0;
        let mut hi = 1.0;
        let mut enclosed = self.energy_in_gamma(hi);
        while enclosed < target {
            lo = hi;
            hi *= 2.0;
            if hi > MAX_GAMMA {
                return Err(Error::Convergence {
                    target,
                    reached: enclosed,
                    gamma_hi: hi,
                });
            }
            enclosed = self.energy_in_gamma(hi);
        }

        for _ in 0..BISECTION_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            let energy = self.energy_in_gamma(mid);
            if energy >= target {
                hi = mid;
                enclosed = energy;
            } else {
                lo = mid;
            }
        }

        tracing::debug!(
            gamma = hi,
            enclosed,
            target,
            samples = self.samples.len(),
            "Energy containment converged"
        );

        Ok(GammaSearch {
            gamma: hi,
            enclosed_energy: enclosed,
            target_energy: target,
        })
    }
}

fn normalized_radius_sq(u2: f64, v2: f64, lambda1: f64, lambda2: f64) -> f64 {
    if lambda1 <= 0.0 {
        // All energy sits on a single point.
        return 0.0;
    }
    let lambda2 = lambda2.max(lambda1 * MIN_EIGEN_RATIO);
    u2 / lambda1 + v2 / lambda2
}
