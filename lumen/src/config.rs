//! Analysis configuration.
//!
//! [`AnalysisConfig`] is the validated, immutable parameter set consumed by both
//! pipelines. [`RawConfig`] is the form-style input a UI or CLI collects; its
//! [`RawConfig::resolve`] replaces unusable entries with defaults.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

pub const DEFAULT_SCALE: f64 = 1.0;
pub const DEFAULT_ENERGY_RATIO: f64 = 86.0;
pub const DEFAULT_MIN_AREA: usize = 5;
pub const DEFAULT_BLUR_KERNEL: usize = 0;

// ============================================================================
// Threshold mode
// ============================================================================

/// How the segmenter turns grayscale into a binary mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ThresholdMode {
    /// Automatic threshold that minimizes intra-class intensity variance.
    #[default]
    Otsu,
    /// Fixed binary threshold at 127.
    Fixed,
    /// Caller-supplied threshold.
    Custom(u8),
}

impl FromStr for ThresholdMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "otsu" => Ok(ThresholdMode::Otsu),
            "binary" | "fixed" => Ok(ThresholdMode::Fixed),
            _ => s
                .parse::<u8>()
                .map(ThresholdMode::Custom)
                .map_err(|_| {
                    Error::invalid_config(
                        "threshold_mode",
                        format!("expected 'otsu', 'binary' or an integer in 0..=255, got '{s}'"),
                    )
                }),
        }
    }
}

impl fmt::Display for ThresholdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdMode::Otsu => write!(f, "otsu"),
            ThresholdMode::Fixed => write!(f, "binary"),
            ThresholdMode::Custom(value) => write!(f, "{value}"),
        }
    }
}

// ============================================================================
// AnalysisConfig
// ============================================================================

/// Parameters for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisConfig {
    // -- D86 --
    /// Physical extent of the image along x (image width maps to `hx` units).
    pub hx: f64,
    /// Physical extent of the image along y.
    pub hy: f64,
    /// Percentage of total energy the ellipse must contain, in `(0, 100]`.
    pub energy_ratio: f64,

    // -- Point counting --
    /// Minimum component area in pixels (inclusive).
    pub min_area: usize,
    /// Gaussian blur kernel size; 0 disables blurring, even sizes are bumped to odd.
    pub blur_kernel: usize,
    pub threshold_mode: ThresholdMode,
    /// Invert the mask, for dark dots on a light background.
    pub invert: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            hx: DEFAULT_SCALE,
            hy: DEFAULT_SCALE,
            energy_ratio: DEFAULT_ENERGY_RATIO,
            min_area: DEFAULT_MIN_AREA,
            blur_kernel: DEFAULT_BLUR_KERNEL,
            threshold_mode: ThresholdMode::Otsu,
            invert: false,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_valid_scale(self.hx) {
            return Err(Error::invalid_config(
                "hx",
                format!("must be a finite positive number, got {}", self.hx),
            ));
        }
        if !is_valid_scale(self.hy) {
            return Err(Error::invalid_config(
                "hy",
                format!("must be a finite positive number, got {}", self.hy),
            ));
        }
        if !is_valid_energy_ratio(self.energy_ratio) {
            return Err(Error::invalid_config(
                "energy_ratio",
                format!("must be in (0, 100], got {}", self.energy_ratio),
            ));
        }
        Ok(())
    }

    /// Target energy fraction in `(0, 1]`.
    pub fn energy_fraction(&self) -> f64 {
        self.energy_ratio / 100.0
    }

    /// Odd blur kernel size, or `None` when blurring is disabled.
    pub fn effective_blur_kernel(&self) -> Option<usize> {
        match self.blur_kernel {
            0 => None,
            k if k % 2 == 0 => Some(k + 1),
            k => Some(k),
        }
    }
}

fn is_valid_scale(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn is_valid_energy_ratio(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= 100.0
}

// ============================================================================
// RawConfig
// ============================================================================

/// Unvalidated configuration as typed into a form or passed on a command line.
///
/// Missing, unparseable or out-of-range entries fall back to the defaults of
/// [`AnalysisConfig`], so the resolved config always validates.
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
    pub hx: Option<String>,
    pub hy: Option<String>,
    pub energy_ratio: Option<String>,
    pub min_area: Option<String>,
    pub blur_kernel: Option<String>,
    pub threshold_mode: Option<String>,
    pub invert: bool,
}

impl RawConfig {
    pub fn resolve(&self) -> AnalysisConfig {
        let defaults = AnalysisConfig::default();

        let threshold_mode = match self.threshold_mode.as_deref() {
            None => defaults.threshold_mode,
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::warn!(%err, "Falling back to default threshold mode");
                defaults.threshold_mode
            }),
        };

        AnalysisConfig {
            hx: resolve_f64("hx", self.hx.as_deref(), defaults.hx, is_valid_scale),
            hy: resolve_f64("hy", self.hy.as_deref(), defaults.hy, is_valid_scale),
            energy_ratio: resolve_f64(
                "energy_ratio",
                self.energy_ratio.as_deref(),
                defaults.energy_ratio,
                is_valid_energy_ratio,
            ),
            min_area: resolve_count("min_area", self.min_area.as_deref(), defaults.min_area),
            blur_kernel: resolve_count(
                "blur_kernel",
                self.blur_kernel.as_deref(),
                defaults.blur_kernel,
            ),
            threshold_mode,
            invert: self.invert,
        }
    }
}

fn resolve_f64(field: &str, raw: Option<&str>, default: f64, accept: fn(f64) -> bool) -> f64 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if accept(value) => value,
        _ => {
            tracing::warn!(field, raw, default, "Invalid value, using default");
            default
        }
    }
}

/// Parses a non-negative count. Fractional input is floored.
fn resolve_count(field: &str, raw: Option<&str>, default: usize) -> usize {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value.floor() as usize,
        _ => {
            tracing::warn!(field, raw, default, "Invalid value, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(f: impl FnOnce(&mut RawConfig)) -> RawConfig {
        let mut config = RawConfig::default();
        f(&mut config);
        config
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.energy_fraction(), 0.86);
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        let config = AnalysisConfig {
            hx: 0.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { field: "hx", .. }));

        let config = AnalysisConfig {
            hy: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { field: "hy", .. })
        ));
    }

    #[test]
    fn test_validate_energy_ratio_bounds() {
        for ratio in [0.0, -5.0, 100.5, f64::INFINITY] {
            let config = AnalysisConfig {
                energy_ratio: ratio,
                ..Default::default()
            };
            assert!(
                config.validate().is_err(),
                "energy_ratio {} should be rejected",
                ratio
            );
        }
        let config = AnalysisConfig {
            energy_ratio: 100.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_effective_blur_kernel_is_odd() {
        let kernel = |k| {
            AnalysisConfig {
                blur_kernel: k,
                ..Default::default()
            }
            .effective_blur_kernel()
        };
        assert_eq!(kernel(0), None);
        assert_eq!(kernel(1), Some(1));
        assert_eq!(kernel(4), Some(5));
        assert_eq!(kernel(7), Some(7));
    }

    #[test]
    fn test_threshold_mode_parsing() {
        assert_eq!("otsu".parse::<ThresholdMode>().unwrap(), ThresholdMode::Otsu);
        assert_eq!("Binary".parse::<ThresholdMode>().unwrap(), ThresholdMode::Fixed);
        assert_eq!(" 42 ".parse::<ThresholdMode>().unwrap(), ThresholdMode::Custom(42));
        assert!("256".parse::<ThresholdMode>().is_err());
        assert!("bright".parse::<ThresholdMode>().is_err());
    }

    #[test]
    fn test_resolve_keeps_valid_values() {
        let config = raw(|c| {
            c.hx = Some("100".into());
            c.hy = Some("50.5".into());
            c.energy_ratio = Some("90".into());
            c.min_area = Some("12".into());
            c.blur_kernel = Some("3".into());
            c.threshold_mode = Some("200".into());
            c.invert = true;
        })
        .resolve();

        assert_eq!(config.hx, 100.0);
        assert_eq!(config.hy, 50.5);
        assert_eq!(config.energy_ratio, 90.0);
        assert_eq!(config.min_area, 12);
        assert_eq!(config.blur_kernel, 3);
        assert_eq!(config.threshold_mode, ThresholdMode::Custom(200));
        assert!(config.invert);
    }

    #[test]
    fn test_resolve_defaults_unusable_values() {
        let config = raw(|c| {
            c.hx = Some("abc".into());
            c.hy = Some("-3".into());
            c.energy_ratio = Some("150".into());
            c.min_area = Some("lots".into());
            c.blur_kernel = Some("-1".into());
            c.threshold_mode = Some("sometimes".into());
        })
        .resolve();

        assert_eq!(config, AnalysisConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_floors_fractional_counts() {
        let config = raw(|c| {
            c.min_area = Some("7.9".into());
            c.blur_kernel = Some("4.2".into());
        })
        .resolve();
        assert_eq!(config.min_area, 7);
        assert_eq!(config.blur_kernel, 4);
        assert_eq!(config.effective_blur_kernel(), Some(5));
    }
}
