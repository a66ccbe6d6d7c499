//! Intensity-weighted centroid and covariance.

use std::ops::Add;

use common::Buffer2;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};

/// Pixel count below which sequential accumulation is faster than rayon.
const PARALLEL_THRESHOLD: usize = 65_536;

/// Energy-weighted second moments of an intensity grid.
///
/// Centroid is in pixel coordinates; covariance entries are in physical
/// units squared (offsets scaled by `hx / width` and `hy / height`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CovarianceResult {
    pub total_energy: f64,
    pub centroid: (f64, f64),
    pub cov_xx: f64,
    pub cov_yy: f64,
    pub cov_xy: f64,
}

/// Physical size of one pixel along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    pub sx: f64,
    pub sy: f64,
}

impl PixelScale {
    pub fn new(hx: f64, hy: f64, width: usize, height: usize) -> Self {
        Self {
            sx: hx / width as f64,
            sy: hy / height as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RawMoments {
    m00: f64,
    m10: f64,
    m01: f64,
}

impl Add for RawMoments {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            m00: self.m00 + rhs.m00,
            m10: self.m10 + rhs.m10,
            m01: self.m01 + rhs.m01,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct CentralMoments {
    xx: f64,
    yy: f64,
    xy: f64,
}

impl Add for CentralMoments {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            xx: self.xx + rhs.xx,
            yy: self.yy + rhs.yy,
            xy: self.xy + rhs.xy,
        }
    }
}

/// Computes total energy, centroid and physical covariance.
///
/// Fails with [`Error::EmptyImage`] when no pixel carries energy.
pub fn compute_moments(gray: &Buffer2<f32>, scale: PixelScale) -> Result<CovarianceResult> {
    let raw: RawMoments = accumulate_rows(gray, |y, row| {
        let fy = y as f64;
        let mut acc = RawMoments::default();
        for (x, &value) in row.iter().enumerate() {
            if !carries_energy(value) {
                continue;
            }
            let v = value as f64;
            acc.m00 += v;
            acc.m10 += v * x as f64;
            acc.m01 += v * fy;
        }
        acc
    });

    if raw.m00 <= 0.0 {
        return Err(Error::EmptyImage);
    }

    let cx = raw.m10 / raw.m00;
    let cy = raw.m01 / raw.m00;

    let central: CentralMoments = accumulate_rows(gray, |y, row| {
        let dy = (y as f64 - cy) * scale.sy;
        let mut acc = CentralMoments::default();
        for (x, &value) in row.iter().enumerate() {
            if !carries_energy(value) {
                continue;
            }
            let v = value as f64;
            let dx = (x as f64 - cx) * scale.sx;
            acc.xx += v * dx * dx;
            acc.yy += v * dy * dy;
            acc.xy += v * dx * dy;
        }
        acc
    });

    Ok(CovarianceResult {
        total_energy: raw.m00,
        centroid: (cx, cy),
        cov_xx: central.xx / raw.m00,
        cov_yy: central.yy / raw.m00,
        cov_xy: central.xy / raw.m00,
    })
}

/// Zero, negative and non-finite samples carry no energy.
#[inline]
pub(crate) fn carries_energy(value: f32) -> bool {
    value > 0.0 && value.is_finite()
}

/// Sums a per-row accumulator over the grid, splitting rows across rayon
/// workers for large images.
fn accumulate_rows<A, F>(gray: &Buffer2<f32>, row_fn: F) -> A
where
    A: Add<Output = A> + Default + Send,
    F: Fn(usize, &[f32]) -> A + Sync + Send,
{
    let width = gray.width();
    if width == 0 {
        return A::default();
    }

    if gray.len() < PARALLEL_THRESHOLD {
        gray.pixels()
            .chunks_exact(width)
            .enumerate()
            .fold(A::default(), |acc, (y, row)| acc + row_fn(y, row))
    } else {
        gray.pixels()
            .par_chunks_exact(width)
            .enumerate()
            .map(|(y, row)| row_fn(y, row))
            .reduce(A::default, |a, b| a + b)
    }
}
