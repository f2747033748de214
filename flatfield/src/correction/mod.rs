//! Dark/flat-field correction.
//!
//! Computes
//!
//! ```text
//! C = (R - D) * mean(F - D) / (F - D)
//! ```
//!
//! and normalizes the result to 8 bits for display and export. Sensor elements
//! where `F == D` have no defined gain: they are marked NaN, and every
//! non-finite result is later replaced by 0, so they render black instead of
//! failing the frame.
//!
//! Every stage is a pure function over its inputs; [`correct`] chains them.


use rayon::prelude::*;

use crate::{CorrectedImage, Error, Image, ImageDimensions, InputKind, Result};

/// Require that all three correction inputs are present.
pub fn check_inputs<'a>(
    raw: Option<&'a Image>,
    dark: Option<&'a Image>,
    flat: Option<&'a Image>,
) -> Result<(&'a Image, &'a Image, &'a Image)> {
    let raw = raw.ok_or(Error::MissingInput(InputKind::Raw))?;
    let dark = dark.ok_or(Error::MissingInput(InputKind::Dark))?;
    let flat = flat.ok_or(Error::MissingInput(InputKind::Flat))?;
    Ok((raw, dark, flat))
}

/// Require that dark and flat have the raw image's dimensions.
pub fn check_dimensions(raw: &Image, dark: &Image, flat: &Image) -> Result<ImageDimensions> {
    let expected = raw.dimensions();
    for (input, image) in [(InputKind::Dark, dark), (InputKind::Flat, flat)] {
        let found = image.dimensions();
        if found != expected {
            return Err(Error::DimensionMismatch {
                input,
                expected,
                found,
            });
        }
    }
    Ok(expected)
}

/// Flat-field correct `raw` and normalize it to 8 bits.
///
/// Fails only with [`Error::DimensionMismatch`]; numerically degenerate
/// samples become 0 in the output.
pub fn correct(raw: &Image, dark: &Image, flat: &Image) -> Result<CorrectedImage> {
    let dimensions = check_dimensions(raw, dark, flat)?;

    let gain = gain_map(dark, flat);
    let mut corrected = apply_gain(raw, dark, &gain);
    let replaced = sanitize_non_finite(&mut corrected);
    let output = normalize_to_u8(&corrected);

    log::debug!(
        "Corrected {} image ({} degenerate samples set to 0)",
        dimensions,
        replaced
    );

    Ok(output)
}

/// Mean of `flat - dark`, accumulated in f64.
pub fn mean_difference(dark: &Image, flat: &Image) -> f32 {
    assert!(
        dark.data.same_size(&flat.data),
        "Dark/flat dimensions mismatch: {} vs {}",
        dark.dimensions(),
        flat.dimensions()
    );
    if flat.data.is_empty() {
        return 0.0;
    }

    let sum: f64 = flat
        .data
        .par_iter()
        .zip(dark.data.par_iter())
        .map(|(&f, &d)| (f - d) as f64)
        .sum();
    (sum / flat.data.len() as f64) as f32
}

/// Per-sample gain `G = mean(F - D) / (F - D)`.
///
/// Samples where `F - D == 0` are NaN.
pub fn gain_map(dark: &Image, flat: &Image) -> Image {
    let mean = mean_difference(dark, flat);

    let pixels: Vec<f32> = flat
        .data
        .par_iter()
        .zip(dark.data.par_iter())
        .map(|(&f, &d)| {
            let denominator = f - d;
            if denominator == 0.0 {
                f32::NAN
            } else {
                mean / denominator
            }
        })
        .collect();

    Image::new(flat.width(), flat.height(), pixels)
}

/// Raw correction `C = (R - D) * G`. NaN gain propagates.
pub fn apply_gain(raw: &Image, dark: &Image, gain: &Image) -> Image {
    assert!(
        raw.data.same_size(&dark.data) && raw.data.same_size(&gain.data),
        "Raw/dark/gain dimensions mismatch: {} vs {} vs {}",
        raw.dimensions(),
        dark.dimensions(),
        gain.dimensions()
    );

    let pixels: Vec<f32> = raw
        .data
        .par_iter()
        .zip(dark.data.par_iter())
        .zip(gain.data.par_iter())
        .map(|((&r, &d), &g)| (r - d) * g)
        .collect();

    Image::new(raw.width(), raw.height(), pixels)
}

/// Replace NaN, +inf and -inf with 0.0. Returns the number of replaced samples.
pub fn sanitize_non_finite(image: &mut Image) -> usize {
    image
        .data
        .par_iter_mut()
        .map(|v| {
            if v.is_finite() {
                0
            } else {
                *v = 0.0;
                1
            }
        })
        .sum()
}

/// Stretch to 0-255 and truncate to u8.
///
/// Subtracts the global minimum, divides by the resulting maximum when it is
/// nonzero, then scales by 255. A constant image becomes all zeros. Expects
/// finite samples (see [`sanitize_non_finite`]).
pub fn normalize_to_u8(image: &Image) -> CorrectedImage {
    let min = image
        .data
        .par_iter()
        .copied()
        .reduce(|| f32::INFINITY, f32::min);

    let max = image
        .data
        .par_iter()
        .map(|&v| v - min)
        .reduce(|| f32::NEG_INFINITY, f32::max);

    // Uniform input: skip the division instead of producing 0/0.
    let divide = max != 0.0;

    let pixels: Vec<u8> = image
        .data
        .par_iter()
        .map(|&v| {
            let shifted = v - min;
            let unit = if divide { shifted / max } else { shifted };
            (unit * 255.0) as u8
        })
        .collect();

    CorrectedImage::new(image.width(), image.height(), pixels)
}
