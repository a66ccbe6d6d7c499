//! Bright-dot counting over labeled components.

use serde::Serialize;

use crate::labeling::ConnectedComponent;
use crate::overlay::Overlay;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountResult {
    /// Number of components with `area >= min_area`.
    pub count: usize,
    /// Surviving components, ordered by label.
    pub regions: Vec<ConnectedComponent>,
    /// Components dropped by the area filter.
    pub rejected: usize,
}

impl CountResult {
    /// One bounding rectangle per counted region.
    pub fn overlay(&self) -> Vec<Overlay> {
        self.regions
            .iter()
            .map(|region| Overlay::Rect {
                x: region.bbox.x,
                y: region.bbox.y,
                width: region.bbox.width,
                height: region.bbox.height,
            })
            .collect()
    }
}

/// Keeps components whose area is at least `min_area`.
pub fn count_points(components: Vec<ConnectedComponent>, min_area: usize) -> CountResult {
    let total = components.len();
    let regions: Vec<ConnectedComponent> = components
        .into_iter()
        .filter(|c| c.area >= min_area)
        .collect();

    let result = CountResult {
        count: regions.len(),
        rejected: total - regions.len(),
        regions,
    };

    tracing::info!(
        count = result.count,
        rejected = result.rejected,
        min_area,
        "Point count complete"
    );

    result
}
