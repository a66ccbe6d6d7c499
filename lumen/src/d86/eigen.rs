//! Closed-form eigen-decomposition of a symmetric 2×2 matrix.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::Serialize;

/// Off-diagonal magnitude below which the matrix is treated as diagonal.
const OFF_DIAGONAL_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EigenResult {
    /// Larger eigenvalue.
    pub lambda1: f64,
    pub lambda2: f64,
    /// Direction of the `lambda1` eigenvector, in `[0, π)`.
    pub theta_rad: f64,
}

impl EigenResult {
    /// Rebuilds `[[a, b], [b, c]]` from the decomposition.
    pub fn reconstruct(&self) -> (f64, f64, f64) {
        let (sin, cos) = self.theta_rad.sin_cos();
        let a = self.lambda1 * cos * cos + self.lambda2 * sin * sin;
        let c = self.lambda1 * sin * sin + self.lambda2 * cos * cos;
        let b = (self.lambda1 - self.lambda2) * sin * cos;
        (a, b, c)
    }
}

/// Decomposes the symmetric matrix `[[a, b], [b, c]]`.
///
/// Eigenvalues are clamped at zero: callers pass covariance matrices, which are
/// positive-semidefinite up to rounding.
pub fn eigen_symmetric_2x2(a: f64, b: f64, c: f64) -> EigenResult {
    let trace = a + c;
    let det = a * c - b * b;
    let delta = (trace * trace - 4.0 * det).max(0.0).sqrt();

    let lambda1 = ((trace + delta) / 2.0).max(0.0);
    let lambda2 = ((trace - delta) / 2.0).max(0.0);

    let theta = if b.abs() > OFF_DIAGONAL_EPS {
        (lambda1 - a).atan2(b)
    } else if a >= c {
        0.0
    } else {
        FRAC_PI_2
    };

    EigenResult {
        lambda1,
        lambda2,
        theta_rad: normalize_angle(theta),
    }
}

/// Wraps an angle into `[0, π)`.
fn normalize_angle(theta: f64) -> f64 {
    let wrapped = theta.rem_euclid(PI);
    // rem_euclid of a tiny negative angle can round up to exactly π.
    if wrapped >= PI {
        0.0
    } else {
        wrapped
    }
}
