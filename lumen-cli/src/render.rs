//! Draws overlay directives onto an RGB image.

use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_cross_mut, draw_hollow_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;
use lumen::Overlay;

const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const RED: Rgb<u8> = Rgb([255, 50, 50]);
const CYAN: Rgb<u8> = Rgb([0, 255, 255]);

/// Segments used to approximate a rotated ellipse.
const ELLIPSE_SEGMENTS: usize = 128;

pub fn draw_overlay(image: &mut RgbImage, overlay: &[Overlay]) {
    for item in overlay {
        match *item {
            Overlay::Marker { x, y } => {
                draw_cross_mut(image, RED, x.round() as i32, y.round() as i32);
            }
            Overlay::Circle { x, y, radius } => {
                draw_hollow_circle_mut(
                    image,
                    (x.round() as i32, y.round() as i32),
                    radius.round().max(1.0) as i32,
                    GREEN,
                );
            }
            Overlay::Ellipse {
                x,
                y,
                semi_major,
                semi_minor,
                angle_deg,
            } => draw_rotated_ellipse(image, (x, y), semi_major, semi_minor, angle_deg),
            Overlay::Rect {
                x,
                y,
                width,
                height,
            } => {
                let rect = Rect::at(x as i32, y as i32).of_size(width as u32, height as u32);
                draw_hollow_rect_mut(image, rect, CYAN);
            }
        }
    }
}

/// Polyline approximation; `angle_deg` rotates the major axis clockwise from +x (y down).
fn draw_rotated_ellipse(
    image: &mut RgbImage,
    center: (f64, f64),
    semi_major: f64,
    semi_minor: f64,
    angle_deg: f64,
) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let point = |t: f64| {
        let (st, ct) = t.sin_cos();
        let u = semi_major * ct;
        let v = semi_minor * st;
        (
            (center.0 + u * cos - v * sin) as f32,
            (center.1 + u * sin + v * cos) as f32,
        )
    };

    let step = std::f64::consts::TAU / ELLIPSE_SEGMENTS as f64;
    let mut previous = point(0.0);
    for i in 1..=ELLIPSE_SEGMENTS {
        let next = point(i as f64 * step);
        draw_line_segment_mut(image, previous, next, GREEN);
        previous = next;
    }
}
