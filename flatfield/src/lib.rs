//! Flatfield - dark/flat-field correction for grayscale images.
//!
//! Given a raw exposure `R`, a dark-field bias frame `D` and a flat-field
//! illumination frame `F`, computes the corrected image
//! `C = (R - D) * mean(F - D) / (F - D)` and normalizes it to 8 bits.
//! When no calibration frames are available, plausible ones can be
//! synthesized from the raw image.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use flatfield::{correct, generate_fields, load_image, SyntheticFieldConfig};
//!
//! let raw = load_image("raw.png")?;
//! let (dark, flat) = generate_fields(&raw, &SyntheticFieldConfig::default())?;
//! let corrected = correct(&raw, &dark, &flat)?;
//! ```

pub mod config;
pub(crate) mod convolution;
pub mod correction;
mod error;
mod gray_image;
pub mod session;
pub mod synthetic;

#[cfg(test)]
pub(crate) mod test_utils;

// ============================================================================
// Core image types
// ============================================================================

pub use gray_image::io::{load_image, save_corrected, save_image};
pub use gray_image::{CorrectedImage, Image, ImageDimensions, ImageLoadError};

// ============================================================================
// Errors
// ============================================================================

pub use error::{Error, InputKind, Result};

// ============================================================================
// Correction
// ============================================================================

pub use correction::{check_inputs, correct};

// ============================================================================
// Synthetic calibration frames
// ============================================================================

pub use synthetic::{generate_dark, generate_fields, generate_flat, SyntheticFieldConfig};

// ============================================================================
// Application surface
// ============================================================================

pub use config::Config;
pub use session::CorrectionSession;
