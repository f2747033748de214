use thiserror::Error;

use crate::gray_image::{ImageDimensions, ImageLoadError};

/// Role an image plays in the correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum InputKind {
    #[strum(to_string = "raw")]
    Raw,
    #[strum(to_string = "dark field")]
    Dark,
    #[strum(to_string = "flat field")]
    Flat,
    #[strum(to_string = "corrected")]
    Corrected,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("The {input} image is {found} but the raw image is {expected}")]
    DimensionMismatch {
        input: InputKind,
        expected: ImageDimensions,
        found: ImageDimensions,
    },

    #[error("The {0} image is missing")]
    MissingInput(InputKind),

    #[error("Invalid value for '{name}': {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error(transparent)]
    Io(#[from] ImageLoadError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
