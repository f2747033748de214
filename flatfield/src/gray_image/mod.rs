//! Single-channel image types.
//!
//! [`Image`] holds floating-point intensity samples (conceptually 0-255) and is
//! the type every calibration frame uses. [`CorrectedImage`] holds the final
//! 8-bit display/export samples.

mod error;
pub mod io;


use std::fmt;

use common::Buffer2;

pub use error::ImageLoadError;

/// Image dimensions: width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageDimensions {
    pub width: usize,
    pub height: usize,
}

impl ImageDimensions {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

impl fmt::Display for ImageDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Convert a floating-point sample to 8-bit intensity.
///
/// Clamps to 0-255 and truncates the fraction. NaN maps to 0.
#[inline]
pub fn intensity_u8(value: f32) -> u8 {
    if value <= 0.0 {
        0
    } else if value >= 255.0 {
        255
    } else {
        value as u8
    }
}

/// Grayscale image with f32 samples, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub data: Buffer2<f32>,
}

impl Image {
    pub fn new(width: usize, height: usize, pixels: Vec<f32>) -> Self {
        Self {
            data: Buffer2::new(width, height, pixels),
        }
    }

    pub fn new_filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            data: Buffer2::new_filled(width, height, value),
        }
    }

    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.data.width(), self.data.height())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.height()
    }

    #[inline]
    pub fn pixels(&self) -> &[f32] {
        self.data.pixels()
    }

    /// Reduce to 8-bit intensity levels, kept as f32 samples.
    pub fn to_intensity(&self) -> Image {
        Image {
            data: self.data.map(|&v| intensity_u8(v) as f32),
        }
    }

    /// Quantize to an 8-bit image with [`intensity_u8`].
    pub fn to_u8(&self) -> CorrectedImage {
        CorrectedImage {
            data: self.data.map(|&v| intensity_u8(v)),
        }
    }
}

/// 8-bit grayscale image ready for display or export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectedImage {
    pub data: Buffer2<u8>,
}

impl CorrectedImage {
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Self {
        Self {
            data: Buffer2::new(width, height, pixels),
        }
    }

    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.data.width(), self.data.height())
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        self.data.pixels()
    }
}
