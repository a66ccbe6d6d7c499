//! Global thresholding into bit-packed masks.

use common::{BitBuffer2, Buffer2};

use crate::config::ThresholdMode;

/// Threshold used by [`ThresholdMode::Fixed`].
pub const FIXED_THRESHOLD: u8 = 127;

/// 256-bin intensity histogram.
pub fn histogram(gray: &Buffer2<u8>) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for &v in gray.iter() {
        hist[v as usize] += 1;
    }
    hist
}

/// Otsu's threshold: the level maximizing between-class variance.
///
/// Pixels strictly above the returned level form the foreground. Returns 0 for
/// single-valued images, where no split exists.
pub fn otsu_threshold(gray: &Buffer2<u8>) -> u8 {
    let hist = histogram(gray);
    let total = gray.len() as f64;
    if total == 0.0 {
        return 0;
    }

    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(value, &count)| value as f64 * count as f64)
        .sum();

    let mut sum_background = 0.0;
    let mut weight_background = 0.0;
    let mut max_variance = 0.0;
    let mut threshold = 0u8;

    for (value, &count) in hist.iter().enumerate() {
        weight_background += count as f64;
        if weight_background == 0.0 {
            continue;
        }
        let weight_foreground = total - weight_background;
        if weight_foreground == 0.0 {
            break;
        }

        sum_background += value as f64 * count as f64;
        let mean_background = sum_background / weight_background;
        let mean_foreground = (sum_total - sum_background) / weight_foreground;
        let diff = mean_background - mean_foreground;
        let variance = weight_background * weight_foreground * diff * diff;

        if variance > max_variance {
            max_variance = variance;
            threshold = value as u8;
        }
    }

    threshold
}

/// Resolves the threshold level a mode applies to `gray`.
pub fn threshold_level(gray: &Buffer2<u8>, mode: ThresholdMode) -> u8 {
    match mode {
        ThresholdMode::Otsu => otsu_threshold(gray),
        ThresholdMode::Fixed => FIXED_THRESHOLD,
        ThresholdMode::Custom(level) => level,
    }
}

/// Marks pixels strictly above `level`.
pub fn threshold_mask(gray: &Buffer2<u8>, level: u8) -> BitBuffer2 {
    let mut mask = BitBuffer2::new_filled(gray.width(), gray.height(), false);
    for (idx, &v) in gray.iter().enumerate() {
        if v > level {
            mask.set(idx, true);
        }
    }
    mask
}
