//! Single entry point running one analysis on one image.

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::counting::{count_points, CountResult};
use crate::d86::{analyze_d86, D86Result};
use crate::error::Result;
use crate::image::{to_grayscale, to_grayscale_u8, ImageBuffer};
use crate::labeling::connected_components;
use crate::overlay::Overlay;
use crate::segmentation::segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Analysis {
    D86,
    PointCount,
}

impl std::fmt::Display for Analysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Analysis::D86 => write!(f, "d86"),
            Analysis::PointCount => write!(f, "point_count"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "analysis", rename_all = "snake_case")]
pub enum AnalysisResult {
    D86(D86Result),
    PointCount(CountResult),
}

/// Result record plus drawing directives for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub result: AnalysisResult,
    pub overlay: Vec<Overlay>,
}

/// Validates `config` and runs the selected analysis on `image`.
///
/// Either fully succeeds or returns the first error; nothing is cached
/// between calls.
pub fn analyze(
    image: &ImageBuffer<'_>,
    config: &AnalysisConfig,
    analysis: Analysis,
) -> Result<AnalysisReport> {
    config.validate()?;

    tracing::debug!(
        %analysis,
        width = image.width(),
        height = image.height(),
        format = ?image.format(),
        "Starting analysis"
    );

    let report = match analysis {
        Analysis::D86 => {
            let result = analyze_d86(&to_grayscale(image), config)?;
            AnalysisReport {
                overlay: result.overlay(),
                result: AnalysisResult::D86(result),
            }
        }
        Analysis::PointCount => {
            let segmentation = segment(&to_grayscale_u8(image), config);
            let components = connected_components(&segmentation.mask);
            let result = count_points(components, config.min_area);
            AnalysisReport {
                overlay: result.overlay(),
                result: AnalysisResult::PointCount(result),
            }
        }
    };

    Ok(report)
}
