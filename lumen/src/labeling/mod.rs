//! Connected component labeling with 8-connectivity.
//!
//! Two-pass union-find:
//! 1. Forward scan assigning provisional labels, merging labels of touching
//!    neighbors (left, top-left, top, top-right)
//! 2. Resolve every provisional label to its root and compact roots to `1..=n`
//!
//! Label 0 is background.

#[cfg(test)]
mod tests;

use common::{BitBuffer2, Buffer2};
use rayon::prelude::*;
use serde::Serialize;

/// Pixel count above which the relabel pass runs on rayon.
const PARALLEL_RELABEL_THRESHOLD: usize = 1 << 20;

/// Axis-aligned pixel rectangle `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// One foreground region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConnectedComponent {
    /// Label in the [`LabelMap`], `>= 1`. Numbering carries no meaning.
    pub label: u32,
    /// Pixel count.
    pub area: usize,
    pub bbox: BoundingBox,
    /// Mean pixel coordinate.
    pub centroid: (f64, f64),
}

/// Per-pixel labels of a binary mask.
#[derive(Debug, Clone)]
pub struct LabelMap {
    labels: Buffer2<u32>,
    num_labels: usize,
}

impl LabelMap {
    pub fn from_mask(mask: &BitBuffer2) -> Self {
        let width = mask.width();
        let height = mask.height();

        let mut labels = Buffer2::new_filled(width, height, 0u32);
        let mut parent: Vec<u32> = Vec::new();
        assign_provisional_labels(mask, &mut labels, &mut parent);

        if parent.is_empty() {
            return Self {
                labels,
                num_labels: 0,
            };
        }

        // Compact roots to consecutive labels in scan order.
        let mut root_to_final = vec![0u32; parent.len() + 1];
        let mut num_labels = 0u32;
        let mut label_map = vec![0u32; parent.len() + 1];
        for label in 1..=parent.len() as u32 {
            let root = find(&mut parent, label);
            if root_to_final[root as usize] == 0 {
                num_labels += 1;
                root_to_final[root as usize] = num_labels;
            }
            label_map[label as usize] = root_to_final[root as usize];
        }

        let relabel = |label: &mut u32| {
            if *label != 0 {
                *label = label_map[*label as usize];
            }
        };
        if labels.len() > PARALLEL_RELABEL_THRESHOLD {
            labels.pixels_mut().par_iter_mut().for_each(relabel);
        } else {
            labels.pixels_mut().iter_mut().for_each(relabel);
        }

        Self {
            labels,
            num_labels: num_labels as usize,
        }
    }

    #[inline]
    pub fn labels(&self) -> &Buffer2<u32> {
        &self.labels
    }

    /// Number of foreground components (labels run `1..=num_labels`).
    #[inline]
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    /// Area, bounding box and centroid of every component, ordered by label.
    pub fn components(&self) -> Vec<ConnectedComponent> {
        #[derive(Clone, Copy)]
        struct Accumulator {
            area: usize,
            x_min: usize,
            x_max: usize,
            y_min: usize,
            y_max: usize,
            sum_x: f64,
            sum_y: f64,
        }

        let mut acc = vec![
            Accumulator {
                area: 0,
                x_min: usize::MAX,
                x_max: 0,
                y_min: usize::MAX,
                y_max: 0,
                sum_x: 0.0,
                sum_y: 0.0,
            };
            self.num_labels
        ];

        let width = self.labels.width();
        for (idx, &label) in self.labels.iter().enumerate() {
            if label == 0 {
                continue;
            }
            let (x, y) = (idx % width, idx / width);
            let a = &mut acc[(label - 1) as usize];
            a.area += 1;
            a.x_min = a.x_min.min(x);
            a.x_max = a.x_max.max(x);
            a.y_min = a.y_min.min(y);
            a.y_max = a.y_max.max(y);
            a.sum_x += x as f64;
            a.sum_y += y as f64;
        }

        acc.iter()
            .enumerate()
            .map(|(i, a)| ConnectedComponent {
                label: i as u32 + 1,
                area: a.area,
                bbox: BoundingBox {
                    x: a.x_min,
                    y: a.y_min,
                    width: a.x_max - a.x_min + 1,
                    height: a.y_max - a.y_min + 1,
                },
                centroid: (a.sum_x / a.area as f64, a.sum_y / a.area as f64),
            })
            .collect()
    }
}

/// Labels a mask and returns its components.
pub fn connected_components(mask: &BitBuffer2) -> Vec<ConnectedComponent> {
    let label_map = LabelMap::from_mask(mask);
    let components = label_map.components();
    tracing::debug!(components = components.len(), "Labeled connected components");
    components
}

/// First pass: assign provisional labels, recording merges in `parent`.
///
/// `parent[l - 1]` holds the parent of provisional label `l`.
fn assign_provisional_labels(mask: &BitBuffer2, labels: &mut Buffer2<u32>, parent: &mut Vec<u32>) {
    let width = mask.width();
    let height = mask.height();
    let mut next_label = 1u32;

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if !mask.get(idx) {
                continue;
            }

            // Already-visited 8-neighbors in raster order.
            let mut neighbors = [0u32; 4];
            if x > 0 {
                neighbors[0] = labels[idx - 1];
            }
            if y > 0 {
                let up = idx - width;
                if x > 0 {
                    neighbors[1] = labels[up - 1];
                }
                neighbors[2] = labels[up];
                if x + 1 < width {
                    neighbors[3] = labels[up + 1];
                }
            }

            let min_label = neighbors.iter().copied().filter(|&l| l != 0).min();
            labels[idx] = match min_label {
                None => {
                    parent.push(next_label);
                    next_label += 1;
                    next_label - 1
                }
                Some(min_label) => {
                    for &l in neighbors.iter().filter(|&&l| l != 0 && l != min_label) {
                        union(parent, min_label, l);
                    }
                    min_label
                }
            };
        }
    }
}

/// Find root of a label with path compression.
fn find(parent: &mut [u32], label: u32) -> u32 {
    let mut root = label;
    while parent[(root - 1) as usize] != root {
        root = parent[(root - 1) as usize];
    }

    let mut current = label;
    while current != root {
        let next = parent[(current - 1) as usize];
        parent[(current - 1) as usize] = root;
        current = next;
    }
    root
}

/// Union two labels, keeping the smaller root.
fn union(parent: &mut [u32], a: u32, b: u32) {
    let root_a = find(parent, a);
    let root_b = find(parent, b);
    if root_a < root_b {
        parent[(root_b - 1) as usize] = root_a;
    } else if root_b < root_a {
        parent[(root_a - 1) as usize] = root_b;
    }
}
