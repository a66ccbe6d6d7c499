//! Raster image analysis: D86 energy-containment ellipses and bright-dot counting.
//!
//! Both analyses are pure functions of an [`ImageBuffer`] and an
//! [`AnalysisConfig`]; [`analyze`] runs one of them and returns the result
//! record together with [`Overlay`] drawing directives.

pub mod config;
pub mod counting;
pub mod d86;
pub mod error;
pub mod image;
pub mod labeling;
pub mod overlay;
pub mod pipeline;
pub mod segmentation;

pub use config::{AnalysisConfig, RawConfig, ThresholdMode};
pub use counting::{count_points, CountResult};
pub use d86::{analyze_d86, D86Result, Shape};
pub use error::{Error, ErrorKind, Result};
pub use image::{to_grayscale, to_grayscale_u8, ImageBuffer, PixelFormat};
pub use labeling::{connected_components, BoundingBox, ConnectedComponent, LabelMap};
pub use overlay::Overlay;
pub use pipeline::{analyze, Analysis, AnalysisReport, AnalysisResult};
pub use segmentation::{segment, Segmentation};
