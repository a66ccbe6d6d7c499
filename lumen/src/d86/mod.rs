//! D86 energy-containment analysis.
//!
//! Fits the ellipse (or circle) that holds a given percentage of the image
//! energy around its intensity-weighted centroid:
//! 1. Weighted centroid and physical covariance ([`compute_moments`])
//! 2. Principal axes of the covariance ([`eigen_symmetric_2x2`])
//! 3. Scale factor gamma reaching the target energy ([`ContainmentProfile::find_gamma`])
//! 4. Semi-axes `gamma·sqrt(λ)` and shape classification

mod containment;
mod eigen;
mod moments;


pub use containment::{
    ContainmentProfile, GammaSearch, ProjectedSample, BISECTION_ITERATIONS, MAX_GAMMA,
};
pub use eigen::{eigen_symmetric_2x2, EigenResult};
pub use moments::{compute_moments, CovarianceResult, PixelScale};

use common::{Buffer2, FloatExt};
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::overlay::Overlay;

/// Relative semi-axis difference below which the fit is reported as a circle.
pub const CIRCLE_TOLERANCE: f64 = 0.05;

/// Relative pixel semi-axis difference below which the outline is drawn as a circle.
const PIXEL_CIRCLE_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Shape {
    Circle,
    Ellipse,
}

impl Shape {
    /// Classifies semi-axes `a >= b`.
    pub fn classify(a: f64, b: f64) -> Self {
        let max = a.max(b);
        if max <= 0.0 {
            return Shape::Circle;
        }
        if (a - b).abs() / max < CIRCLE_TOLERANCE {
            Shape::Circle
        } else {
            Shape::Ellipse
        }
    }
}

/// Result of a D86 analysis.
///
/// Axis lengths are full lengths (twice the semi-axis). Physical values use the
/// `hx`/`hy` units of the config, `_px` values are in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct D86Result {
    pub gamma: f64,
    pub shape: Shape,
    pub major_axis: f64,
    pub minor_axis: f64,
    pub major_axis_px: f64,
    pub minor_axis_px: f64,
    /// Principal-axis angle of the physical ellipse, degrees in `[0, 180)`.
    pub angle_deg: f64,
    /// Major-axis angle of the ellipse as drawn in pixel space, degrees in `[0, 180)`.
    pub angle_px_deg: f64,
    pub center_px: (f64, f64),
    pub total_energy: f64,
    /// Fraction of total energy inside the reported ellipse.
    pub enclosed_fraction: f64,
    pub covariance: CovarianceResult,
    pub eigen: EigenResult,
}

impl D86Result {
    /// Drawing directives: centroid marker plus the fitted outline in pixel space.
    ///
    /// The outline is a circle only when the pixel semi-axes coincide; under
    /// anisotropic scale a physical circle is drawn as an ellipse.
    pub fn overlay(&self) -> Vec<Overlay> {
        let (x, y) = self.center_px;
        let semi_major = self.major_axis_px / 2.0;
        let semi_minor = self.minor_axis_px / 2.0;

        let outline = if semi_major.relative_eq(semi_minor, PIXEL_CIRCLE_EPS) {
            Overlay::Circle {
                x,
                y,
                radius: semi_major,
            }
        } else {
            Overlay::Ellipse {
                x,
                y,
                semi_major,
                semi_minor,
                angle_deg: self.angle_px_deg,
            }
        };

        vec![Overlay::Marker { x, y }, outline]
    }
}

/// Runs the D86 analysis on an intensity grid.
///
/// `config` must already be validated.
pub fn analyze_d86(gray: &Buffer2<f32>, config: &AnalysisConfig) -> Result<D86Result> {
    let scale = PixelScale::new(config.hx, config.hy, gray.width(), gray.height());

    let moments = compute_moments(gray, scale)?;
    tracing::debug!(
        total_energy = moments.total_energy,
        cx = moments.centroid.0,
        cy = moments.centroid.1,
        cov_xx = moments.cov_xx,
        cov_yy = moments.cov_yy,
        cov_xy = moments.cov_xy,
        "Computed weighted moments"
    );

    let eigen = eigen_symmetric_2x2(moments.cov_xx, moments.cov_xy, moments.cov_yy);
    tracing::debug!(
        lambda1 = eigen.lambda1,
        lambda2 = eigen.lambda2,
        theta_rad = eigen.theta_rad,
        "Principal axes"
    );

    let profile = ContainmentProfile::from_image(gray, &moments, &eigen, scale);
    let search = profile.find_gamma(config.energy_fraction())?;
    let gamma = search.gamma;

    let a_real = gamma * eigen.lambda1.sqrt();
    let b_real = gamma * eigen.lambda2.sqrt();
    let shape = Shape::classify(a_real, b_real);

    // The pixel-space ellipse is the same quadric seen through S⁻¹Σ S⁻¹.
    let pixel_eigen = eigen_symmetric_2x2(
        moments.cov_xx / (scale.sx * scale.sx),
        moments.cov_xy / (scale.sx * scale.sy),
        moments.cov_yy / (scale.sy * scale.sy),
    );
    let a_px = gamma * pixel_eigen.lambda1.sqrt();
    let b_px = gamma * pixel_eigen.lambda2.sqrt();

    let result = D86Result {
        gamma,
        shape,
        major_axis: 2.0 * a_real.max(b_real),
        minor_axis: 2.0 * a_real.min(b_real),
        major_axis_px: 2.0 * a_px.max(b_px),
        minor_axis_px: 2.0 * a_px.min(b_px),
        angle_deg: eigen.theta_rad.to_degrees().rem_euclid(180.0),
        angle_px_deg: pixel_eigen.theta_rad.to_degrees().rem_euclid(180.0),
        center_px: moments.centroid,
        total_energy: moments.total_energy,
        enclosed_fraction: search.enclosed_energy / profile.total_energy(),
        covariance: moments,
        eigen,
    };

    tracing::info!(
        shape = ?result.shape,
        gamma,
        major_axis = result.major_axis,
        minor_axis = result.minor_axis,
        angle_deg = result.angle_deg,
        "D86 analysis complete"
    );

    Ok(result)
}
