//! Borrowed input images and grayscale conversion.

use common::Buffer2;
use serde::Serialize;

use crate::error::{Error, Result};

/// Luma weights (ITU-R BT.601).
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PixelFormat {
    Gray8,
    Rgb8,
    /// Alpha is ignored by every analysis.
    Rgba8,
}

impl PixelFormat {
    pub const fn channel_count(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Read-only view of a caller-owned, tightly packed 8-bit image.
#[derive(Debug, Clone, Copy)]
pub struct ImageBuffer<'a> {
    width: usize,
    height: usize,
    format: PixelFormat,
    bytes: &'a [u8],
}

impl<'a> ImageBuffer<'a> {
    pub fn new(width: usize, height: usize, format: PixelFormat, bytes: &'a [u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage(format!(
                "dimensions must be non-zero, got {width}x{height}"
            )));
        }

        let expected = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(format.channel_count()))
            .ok_or_else(|| {
                Error::InvalidImage(format!(
                    "dimensions {width}x{height} {format:?} overflow the addressable size"
                ))
            })?;
        if bytes.len() != expected {
            return Err(Error::InvalidImage(format!(
                "bytes length {} does not match expected size {} for {}x{} {:?}",
                bytes.len(),
                expected,
                width,
                height,
                format
            )));
        }

        Ok(Self {
            width,
            height,
            format,
            bytes,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// Converts an image to floating-point intensity in `[0, 255]`.
pub fn to_grayscale(image: &ImageBuffer<'_>) -> Buffer2<f32> {
    let channels = image.format.channel_count();
    let pixels = match image.format {
        PixelFormat::Gray8 => image.bytes.iter().map(|&v| v as f32).collect(),
        PixelFormat::Rgb8 | PixelFormat::Rgba8 => image
            .bytes
            .chunks_exact(channels)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect(),
    };

    Buffer2::new(image.width, image.height, pixels)
}

/// Converts an image to rounded 8-bit intensity.
///
/// Grayscale input is returned unchanged, so the conversion is idempotent.
pub fn to_grayscale_u8(image: &ImageBuffer<'_>) -> Buffer2<u8> {
    match image.format {
        PixelFormat::Gray8 => Buffer2::new(image.width, image.height, image.bytes.to_vec()),
        PixelFormat::Rgb8 | PixelFormat::Rgba8 => {
            to_grayscale(image).map(|&v| v.round().clamp(0.0, 255.0) as u8)
        }
    }
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> f32 {
    LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_mismatched_length() {
        let bytes = vec![0u8; 11];
        let err = ImageBuffer::new(2, 2, PixelFormat::Rgb8, &bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_rejects_overflowing_dimensions() {
        let bytes = vec![0u8; 16];
        let err = ImageBuffer::new(usize::MAX, 2, PixelFormat::Rgba8, &bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));

        let err = ImageBuffer::new(usize::MAX / 2, 1, PixelFormat::Rgb8, &bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let bytes: Vec<u8> = Vec::new();
        assert!(ImageBuffer::new(0, 4, PixelFormat::Gray8, &bytes).is_err());
    }

    #[test]
    fn test_luma_of_primaries() {
        let bytes = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let image = ImageBuffer::new(4, 1, PixelFormat::Rgb8, &bytes).unwrap();
        let gray = to_grayscale(&image);

        let expected = [0.299 * 255.0, 0.587 * 255.0, 0.114 * 255.0, 255.0];
        for (got, want) in gray.iter().zip(expected) {
            assert!((got - want).abs() < 1e-3, "got {}, want {}", got, want);
        }
    }

    #[test]
    fn test_rgba_ignores_alpha() {
        let rgba = [10, 20, 30, 0, 10, 20, 30, 255];
        let image = ImageBuffer::new(2, 1, PixelFormat::Rgba8, &rgba).unwrap();
        let gray = to_grayscale(&image);
        assert_eq!(gray.pixels()[0], gray.pixels()[1]);
    }

    #[test]
    fn test_grayscale_u8_is_idempotent() {
        let rgb = [200, 100, 50, 0, 0, 0, 1, 2, 3];
        let image = ImageBuffer::new(3, 1, PixelFormat::Rgb8, &rgb).unwrap();
        let once = to_grayscale_u8(&image);

        let gray_image = ImageBuffer::new(3, 1, PixelFormat::Gray8, once.pixels()).unwrap();
        let twice = to_grayscale_u8(&gray_image);
        assert_eq!(once, twice);
        // 0.299*200 + 0.587*100 + 0.114*50 = 124.2
        assert_eq!(once.pixels()[0], 124);
    }
}
