//! Separable Gaussian blur for 8-bit grayscale.
//!
//! Rows are convolved first, then columns, each in parallel over row chunks.
//! Borders are mirrored without repeating the edge pixel (reflect-101).

use common::Buffer2;
use rayon::prelude::*;

/// Rows handed to one rayon task.
const ROWS_PER_CHUNK: usize = 8;

/// Gaussian sigma implied by a kernel size when none is given explicitly.
#[inline]
pub fn sigma_for_kernel_size(size: usize) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Largest useful kernel for a `width`×`height` image: its radius reaches every
/// pixel from every other pixel.
#[inline]
pub fn max_kernel_size(width: usize, height: usize) -> usize {
    width.max(height).saturating_mul(2).saturating_add(1)
}

/// Normalized 1D Gaussian kernel of odd length `size`.
pub fn gaussian_kernel_1d(size: usize) -> Vec<f32> {
    assert!(size % 2 == 1, "Kernel size must be odd, got {}", size);

    let sigma = sigma_for_kernel_size(size);
    let radius = (size / 2) as f32;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - radius;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Blurs `gray` with a `size`×`size` Gaussian. `size` must be odd.
///
/// Sizes above [`max_kernel_size`] are clamped to it.
pub fn gaussian_blur(gray: &Buffer2<u8>, size: usize) -> Buffer2<u8> {
    let width = gray.width();
    let height = gray.height();
    if size <= 1 || gray.is_empty() {
        return gray.clone();
    }
    let size = size.min(max_kernel_size(width, height));

    let kernel = gaussian_kernel_1d(size);
    let radius = (size / 2) as isize;

    let mut temp = vec![0.0f32; width * height];
    temp.par_chunks_mut(width * ROWS_PER_CHUNK)
        .enumerate()
        .for_each(|(chunk_idx, out_chunk)| {
            let y0 = chunk_idx * ROWS_PER_CHUNK;
            for (local_y, out_row) in out_chunk.chunks_exact_mut(width).enumerate() {
                let in_row = gray.row(y0 + local_y);
                for (x, out) in out_row.iter_mut().enumerate() {
                    *out = kernel
                        .iter()
                        .enumerate()
                        .map(|(k, &w)| {
                            let sx = reflect_101(x as isize + k as isize - radius, width);
                            w * in_row[sx] as f32
                        })
                        .sum();
                }
            }
        });

    let mut output = vec![0u8; width * height];
    output
        .par_chunks_mut(width * ROWS_PER_CHUNK)
        .enumerate()
        .for_each(|(chunk_idx, out_chunk)| {
            let y0 = chunk_idx * ROWS_PER_CHUNK;
            for (local_y, out_row) in out_chunk.chunks_exact_mut(width).enumerate() {
                let y = (y0 + local_y) as isize;
                for (x, out) in out_row.iter_mut().enumerate() {
                    let value: f32 = kernel
                        .iter()
                        .enumerate()
                        .map(|(k, &w)| {
                            let sy = reflect_101(y + k as isize - radius, height);
                            w * temp[sy * width + x]
                        })
                        .sum();
                    *out = value.round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    Buffer2::new(width, height, output)
}

/// Mirrors an out-of-range index back into `0..len` without repeating the edge.
#[inline]
fn reflect_101(idx: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let wrapped = idx.rem_euclid(period);
    if wrapped >= len as isize {
        (period - wrapped) as usize
    } else {
        wrapped as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_normalized_and_symmetric() {
        for size in [1, 3, 5, 9, 15] {
            let kernel = gaussian_kernel_1d(size);
            assert_eq!(kernel.len(), size);
            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6, "kernel sum {} for size {}", sum, size);
            for i in 0..size / 2 {
                assert!((kernel[i] - kernel[size - 1 - i]).abs() < 1e-7);
            }
        }
    }

    #[test]
    fn test_sigma_for_kernel_size() {
        assert!((sigma_for_kernel_size(3) - 0.8).abs() < 1e-6);
        assert!((sigma_for_kernel_size(5) - 1.1).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "Kernel size must be odd")]
    fn test_even_kernel_panics() {
        gaussian_kernel_1d(4);
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 5), 3);
        assert_eq!(reflect_101(-7, 2), 1);
        assert_eq!(reflect_101(4, 1), 0);
    }

    #[test]
    fn test_blur_preserves_constant_image() {
        let gray = Buffer2::new_filled(13, 9, 77u8);
        let blurred = gaussian_blur(&gray, 5);
        assert!(blurred.iter().all(|&v| v == 77));
    }

    #[test]
    fn test_blur_spreads_impulse() {
        let mut gray = Buffer2::new_filled(21, 21, 0u8);
        gray[(10, 10)] = 255;
        let blurred = gaussian_blur(&gray, 5);

        assert!(blurred[(10, 10)] < 255);
        assert!(blurred[(11, 10)] > 0);
        assert_eq!(blurred[(11, 10)], blurred[(9, 10)]);
        assert_eq!(blurred[(10, 11)], blurred[(10, 9)]);
        assert_eq!(blurred[(0, 0)], 0);
    }

    #[test]
    fn test_blur_kernel_larger_than_image() {
        let gray = Buffer2::new(3, 2, vec![0u8, 100, 200, 50, 150, 250]);
        let blurred = gaussian_blur(&gray, 9);
        assert_eq!(blurred.width(), 3);
        assert_eq!(blurred.height(), 2);
    }

    #[test]
    fn test_max_kernel_size() {
        assert_eq!(max_kernel_size(4, 3), 9);
        assert_eq!(max_kernel_size(1, 1), 3);
        assert_eq!(max_kernel_size(usize::MAX, 1), usize::MAX);
    }

    #[test]
    fn test_blur_huge_kernel_is_clamped() {
        let gray = Buffer2::new(3, 2, vec![0u8, 100, 200, 50, 150, 250]);
        let clamped = gaussian_blur(&gray, usize::MAX);
        assert_eq!(clamped, gaussian_blur(&gray, max_kernel_size(3, 2)));
    }

    #[test]
    fn test_blur_size_one_is_identity() {
        let gray = Buffer2::new(3, 1, vec![1u8, 2, 3]);
        assert_eq!(gaussian_blur(&gray, 1), gray);
    }
}
