//! Tests for connected component labeling.

use super::*;

/// Builds a mask from rows of `#` (foreground) and `.` (background).
fn mask_from_ascii(rows: &[&str]) -> BitBuffer2 {
    let height = rows.len();
    let width = rows[0].len();
    BitBuffer2::from_fn(width, height, |x, y| rows[y].as_bytes()[x] == b'#')
}

fn sorted_areas(components: &[ConnectedComponent]) -> Vec<usize> {
    let mut areas: Vec<usize> = components.iter().map(|c| c.area).collect();
    areas.sort_unstable();
    areas
}

#[test]
fn test_empty_mask_has_no_components() {
    let mask = BitBuffer2::new_filled(10, 10, false);
    let label_map = LabelMap::from_mask(&mask);
    assert_eq!(label_map.num_labels(), 0);
    assert!(label_map.components().is_empty());
}

#[test]
fn test_full_mask_is_one_component() {
    let mask = BitBuffer2::new_filled(7, 5, true);
    let components = connected_components(&mask);
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].area, 35);
    assert_eq!(
        components[0].bbox,
        BoundingBox {
            x: 0,
            y: 0,
            width: 7,
            height: 5
        }
    );
    assert_eq!(components[0].centroid, (3.0, 2.0));
}

#[test]
fn test_diagonal_neighbors_are_connected() {
    let mask = mask_from_ascii(&[
        "#....", //
        ".#...", //
        "..#..", //
        "...#.", //
    ]);
    let components = connected_components(&mask);
    assert_eq!(components.len(), 1, "8-connectivity joins diagonal pixels");
    assert_eq!(components[0].area, 4);
}

#[test]
fn test_anti_diagonal_merges_via_top_right() {
    let mask = mask_from_ascii(&[
        "...#", //
        "..#.", //
        ".#..", //
        "#...", //
    ]);
    assert_eq!(connected_components(&mask).len(), 1);
}

#[test]
fn test_u_shape_merges_provisional_labels() {
    let mask = mask_from_ascii(&[
        "#...#", //
        "#...#", //
        "#####", //
    ]);
    let label_map = LabelMap::from_mask(&mask);
    assert_eq!(label_map.num_labels(), 1);

    let labels = label_map.labels();
    assert_eq!(labels[(0, 0)], labels[(4, 0)]);
    assert_eq!(labels[(1, 0)], 0, "background keeps label 0");
}

#[test]
fn test_separate_blobs_with_stats() {
    let mask = mask_from_ascii(&[
        "##.....", //
        "##...#.", //
        ".....#.", //
        "#....#.", //
    ]);
    let components = connected_components(&mask);
    assert_eq!(components.len(), 3);
    assert_eq!(sorted_areas(&components), vec![1, 3, 4]);

    let column = components.iter().find(|c| c.area == 3).unwrap();
    assert_eq!(
        column.bbox,
        BoundingBox {
            x: 5,
            y: 1,
            width: 1,
            height: 3
        }
    );
    assert_eq!(column.centroid, (5.0, 2.0));

    let labels: Vec<u32> = components.iter().map(|c| c.label).collect();
    assert_eq!(labels, vec![1, 2, 3]);
}

#[test]
fn test_spiral_needs_transitive_merges() {
    let mask = mask_from_ascii(&[
        "#######", //
        "......#", //
        "#####.#", //
        "#...#.#", //
        "#.#.#.#", //
        "#.#...#", //
        "#.#####", //
    ]);
    let components = connected_components(&mask);
    assert_eq!(components.len(), 2);
    assert_eq!(sorted_areas(&components), vec![11, 19]);
}

#[test]
fn test_labels_cover_every_foreground_pixel() {
    let mut seed = 12345u64;
    let mask = BitBuffer2::from_fn(97, 61, |_, _| {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed % 3 == 0
    });

    let label_map = LabelMap::from_mask(&mask);
    let total_area: usize = label_map.components().iter().map(|c| c.area).sum();
    assert_eq!(total_area, mask.count_ones());

    for (idx, &label) in label_map.labels().iter().enumerate() {
        assert_eq!(label != 0, mask.get(idx));
        assert!(label as usize <= label_map.num_labels());
    }
}
