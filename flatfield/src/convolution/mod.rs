//! Separable Gaussian blur.
//!
//! Rows are convolved first, then columns, which is O(n×k) instead of
//! O(n×k²) for a direct 2D kernel. Borders use reflect mode
//! (`d c b a | a b c d | d c b a`), so kernels wider than the image are fine.


use rayon::prelude::*;

use crate::Image;

/// Kernel radius in units of sigma.
pub const DEFAULT_TRUNCATE: f32 = 4.0;

/// Rows handed to a rayon task at once.
const ROWS_PER_CHUNK: usize = 8;

/// Compute a normalized 1D Gaussian kernel.
///
/// Radius is `round(truncate * sigma)`; length is `2 * radius + 1`. A radius of
/// zero yields the identity kernel `[1.0]`. Weights are evaluated in f64 so a
/// tiny sigma cannot underflow the exponent's denominator.
pub fn gaussian_kernel_1d(sigma: f32, truncate: f32) -> Vec<f32> {
    assert!(sigma > 0.0, "Sigma must be positive");

    let radius = (truncate * sigma + 0.5) as usize;
    if radius == 0 {
        return vec![1.0];
    }

    let sigma = sigma as f64;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let weights: Vec<f64> = (0..2 * radius + 1)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f64 = weights.iter().sum();
    weights.iter().map(|&w| (w / sum) as f32).collect()
}

/// Map an out-of-range index back into `0..len` by reflecting about the edges.
#[inline]
fn reflect_index(i: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let i = i.rem_euclid(period);
    if i >= len {
        (period - 1 - i) as usize
    } else {
        i as usize
    }
}

/// Blur an image with a Gaussian of the given sigma.
///
/// Output has the same dimensions as the input. A constant image is returned
/// unchanged up to rounding.
pub fn gaussian_blur(image: &Image, sigma: f32) -> Image {
    if image.data.is_empty() {
        return image.clone();
    }

    let width = image.width();
    let height = image.height();
    let kernel = gaussian_kernel_1d(sigma, DEFAULT_TRUNCATE);

    let mut temp = vec![0.0f32; width * height];
    convolve_rows(image.pixels(), &mut temp, width, &kernel);

    let mut output = vec![0.0f32; width * height];
    convolve_cols(&temp, &mut output, width, height, &kernel);

    Image::new(width, height, output)
}

fn convolve_rows(input: &[f32], output: &mut [f32], width: usize, kernel: &[f32]) {
    let radius = kernel.len() / 2;

    // Source column for every (x, k) pair, shared by all rows.
    let taps: Vec<usize> = (0..width)
        .flat_map(|x| {
            (0..kernel.len())
                .map(move |k| reflect_index(x as isize + k as isize - radius as isize, width))
        })
        .collect();

    output
        .par_chunks_mut(width * ROWS_PER_CHUNK)
        .enumerate()
        .for_each(|(chunk_idx, out_chunk)| {
            let y_start = chunk_idx * ROWS_PER_CHUNK;

            for (local_y, out_row) in out_chunk.chunks_mut(width).enumerate() {
                let y = y_start + local_y;
                let in_row = &input[y * width..(y + 1) * width];

                for (x, out) in out_row.iter_mut().enumerate() {
                    let row_taps = &taps[x * kernel.len()..(x + 1) * kernel.len()];
                    *out = row_taps
                        .iter()
                        .zip(kernel)
                        .map(|(&sx, &kval)| in_row[sx] * kval)
                        .sum();
                }
            }
        });
}

fn convolve_cols(input: &[f32], output: &mut [f32], width: usize, height: usize, kernel: &[f32]) {
    let radius = kernel.len() / 2;

    output
        .par_chunks_mut(width * ROWS_PER_CHUNK)
        .enumerate()
        .for_each(|(chunk_idx, out_chunk)| {
            let y_start = chunk_idx * ROWS_PER_CHUNK;

            for (local_y, out_row) in out_chunk.chunks_mut(width).enumerate() {
                let y = y_start + local_y;
                out_row.fill(0.0);

                for (k, &kval) in kernel.iter().enumerate() {
                    let sy = reflect_index(y as isize + k as isize - radius as isize, height);
                    let in_row = &input[sy * width..(sy + 1) * width];
                    for (out, &v) in out_row.iter_mut().zip(in_row) {
                        *out += v * kval;
                    }
                }
            }
        });
}
