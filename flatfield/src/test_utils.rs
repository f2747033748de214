//! Shared helpers for unit tests.

use crate::Image;

/// Diagonal ramp spanning roughly 0-255 with fractional samples.
pub fn gradient_image(width: usize, height: usize) -> Image {
    let span = (width + height).max(2) as f32 - 1.0;
    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x + y) as f32 * 255.0 / span + 0.3))
        .collect();
    Image::new(width, height, pixels)
}

/// Image from a closure over pixel coordinates.
pub fn image_from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> f32) -> Image {
    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| f(x, y))
        .collect();
    Image::new(width, height, pixels)
}
