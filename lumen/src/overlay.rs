//! Drawing directives for an external renderer.
//!
//! Coordinates are in image pixels with the origin at the top-left pixel
//! center; angles are degrees clockwise from the +x axis (y points down).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Overlay {
    Marker {
        x: f64,
        y: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
    },
    Ellipse {
        x: f64,
        y: f64,
        semi_major: f64,
        semi_minor: f64,
        angle_deg: f64,
    },
    /// `(x, y)` is the top-left pixel; `width` and `height` are pixel counts.
    Rect {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}
