//! Grayscale to binary mask: optional blur, global threshold, optional inversion.

mod blur;
mod threshold;


pub use blur::{gaussian_blur, gaussian_kernel_1d, max_kernel_size, sigma_for_kernel_size};
pub use threshold::{histogram, otsu_threshold, threshold_level, threshold_mask, FIXED_THRESHOLD};

use common::{BitBuffer2, Buffer2};

use crate::config::AnalysisConfig;

#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Foreground pixels, same dimensions as the input.
    pub mask: BitBuffer2,
    /// Level actually applied (pixels `> threshold` before any inversion).
    pub threshold: u8,
}

/// Segments an 8-bit grayscale image according to `config`.
pub fn segment(gray: &Buffer2<u8>, config: &AnalysisConfig) -> Segmentation {
    let blur_kernel = config
        .effective_blur_kernel()
        .map(|size| size.min(max_kernel_size(gray.width(), gray.height())));

    let blurred;
    let source = match blur_kernel {
        Some(size) => {
            blurred = gaussian_blur(gray, size);
            &blurred
        }
        None => gray,
    };

    let threshold = threshold_level(source, config.threshold_mode);
    let mut mask = threshold_mask(source, threshold);
    if config.invert {
        mask.invert();
    }

    tracing::debug!(
        blur = ?blur_kernel,
        mode = %config.threshold_mode,
        threshold,
        invert = config.invert,
        foreground = mask.count_ones(),
        "Segmented image"
    );

    Segmentation { mask, threshold }
}
