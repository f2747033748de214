//! Synthetic dark and flat fields derived from a raw exposure.
//!
//! Used when no real calibration frames are available. The dark field is the
//! raw image dimmed to a fraction of its intensity; the flat field is a
//! uniform, slightly noisy illumination pattern smoothed by a Gaussian blur.


use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::convolution::gaussian_blur;
use crate::{Error, Image, ImageDimensions, Result};

/// Fraction of raw intensity kept in the synthetic dark field.
pub const DEFAULT_DARK_SCALE: f32 = 0.25;
/// Base level of the synthetic flat field.
pub const DEFAULT_FLAT_BRIGHTNESS: f32 = 255.0;
/// Standard deviation of the per-pixel flat-field noise.
pub const DEFAULT_NOISE_STDDEV: f32 = 5.0;
/// Sigma of the Gaussian blur applied to the flat field.
pub const DEFAULT_SMOOTHING_SIGMA: f32 = 5.0;
/// Largest accepted blur sigma. Bounds the kernel at 801 taps.
pub const MAX_SMOOTHING_SIGMA: f32 = 100.0;

/// Parameters for synthetic dark/flat generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticFieldConfig {
    /// Multiplier applied to the raw intensity for the dark field.
    pub dark_scale: f32,
    /// Flat-field level before noise, 0-255.
    pub brightness: f32,
    /// Standard deviation of the Gaussian noise. 0 disables noise.
    pub noise_stddev: f32,
    /// Sigma of the smoothing blur, at most [`MAX_SMOOTHING_SIGMA`]. 0 disables
    /// smoothing.
    pub smoothing_sigma: f32,
    /// Random seed for reproducibility (None for random).
    pub seed: Option<u64>,
}

impl Default for SyntheticFieldConfig {
    fn default() -> Self {
        Self {
            dark_scale: DEFAULT_DARK_SCALE,
            brightness: DEFAULT_FLAT_BRIGHTNESS,
            noise_stddev: DEFAULT_NOISE_STDDEV,
            smoothing_sigma: DEFAULT_SMOOTHING_SIGMA,
            seed: None,
        }
    }
}

impl SyntheticFieldConfig {
    /// Default parameters with a fixed noise seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        non_negative("dark_scale", self.dark_scale)?;
        non_negative("noise_stddev", self.noise_stddev)?;
        non_negative("smoothing_sigma", self.smoothing_sigma)?;
        if self.smoothing_sigma > MAX_SMOOTHING_SIGMA {
            return Err(Error::InvalidParameter {
                name: "smoothing_sigma",
                value: self.smoothing_sigma,
            });
        }
        if !self.brightness.is_finite() {
            return Err(Error::InvalidParameter {
                name: "brightness",
                value: self.brightness,
            });
        }
        Ok(())
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}

/// Simulate a dark field by dimming the raw image.
///
/// The raw image is first reduced to 8-bit intensity levels, then every sample
/// is multiplied by `scale`. Deterministic.
pub fn generate_dark(raw: &Image, scale: f32) -> Image {
    let mut dark = raw.to_intensity();
    for v in dark.data.iter_mut() {
        *v *= scale;
    }
    dark
}

/// Uniform `brightness` field with additive Gaussian noise, clipped to 0-255.
///
/// This is the flat field before smoothing.
pub fn noisy_flat(dimensions: ImageDimensions, config: &SyntheticFieldConfig) -> Result<Image> {
    config.validate()?;

    let mut flat = Image::new_filled(dimensions.width, dimensions.height, config.brightness);

    if config.noise_stddev > 0.0 {
        let noise = Normal::new(0.0f32, config.noise_stddev).map_err(|_| {
            Error::InvalidParameter {
                name: "noise_stddev",
                value: config.noise_stddev,
            }
        })?;

        let mut rng: ChaCha8Rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        for v in flat.data.iter_mut() {
            *v += noise.sample(&mut rng);
        }
    }

    for v in flat.data.iter_mut() {
        *v = v.clamp(0.0, 255.0);
    }

    Ok(flat)
}

/// Simulate a flat field with the same dimensions as `raw`.
///
/// Fills with `brightness`, adds N(0, `noise_stddev`) noise per sample, clips
/// to 0-255 and blurs with `smoothing_sigma`. Only the shape of `raw` is used.
/// Unseeded configs draw from OS entropy and are not reproducible.
pub fn generate_flat(raw: &Image, config: &SyntheticFieldConfig) -> Result<Image> {
    let flat = noisy_flat(raw.dimensions(), config)?;

    if config.smoothing_sigma > 0.0 {
        Ok(gaussian_blur(&flat, config.smoothing_sigma))
    } else {
        Ok(flat)
    }
}

/// Generate both synthetic calibration frames, returned as `(dark, flat)`.
pub fn generate_fields(raw: &Image, config: &SyntheticFieldConfig) -> Result<(Image, Image)> {
    config.validate()?;

    let dark = generate_dark(raw, config.dark_scale);
    let flat = generate_flat(raw, config)?;

    log::info!(
        "Generated synthetic dark (scale {}) and flat (brightness {}, noise {}, sigma {}) for {} image",
        config.dark_scale,
        config.brightness,
        config.noise_stddev,
        config.smoothing_sigma,
        raw.dimensions()
    );

    Ok((dark, flat))
}
